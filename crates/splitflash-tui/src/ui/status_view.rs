use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span, Text};
use splitflash_app::{Model, Panel, Phase};
use splitflash_core::builder::BuildStep;
use splitflash_core::flasher::FlashStep;
use splitflash_core::format::format_date;

use crate::theme;
use crate::ui::firmware_tree::panel_title;
use crate::ui::spinner;
use crate::ui::text::{check_line, label_value_line, progress_bar, wrapped_paragraph};

pub(crate) fn render(frame: &mut Frame<'_>, area: Rect, model: &Model) {
    let bar_width = area.width.saturating_sub(12);
    let text = match model.phase() {
        Phase::Idle | Phase::FactoryResetPending => idle_lines(model),
        Phase::Building => building_lines(model, bar_width),
        Phase::WaitingDevice => waiting_lines(model),
        Phase::Flashing => flashing_lines(model),
        Phase::Complete => complete_lines(model),
    };

    let block = theme::panel(panel_title(Panel::Status), model.panel() == Panel::Status);
    frame.render_widget(wrapped_paragraph(Text::from(text)).block(block), area);
}

fn idle_lines(model: &Model) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("SELECT FIRMWARE", theme::accent())),
        Line::from(""),
        Line::from("Choose a build to flash"),
        Line::from("or press B to build new"),
    ];

    if let Some(build) = model.selected() {
        lines.push(Line::from(""));
        lines.push(label_value_line("Selected", format_date(&build.date)));
    }
    lines
}

fn building_lines(model: &Model, bar_width: u16) -> Vec<Line<'static>> {
    let progress = model.build_progress();
    let current = progress.step();

    let mut lines = vec![
        Line::from(""),
        busy_heading(model, "BUILDING FIRMWARE", theme::accent()),
        Line::from(""),
        Line::from(progress_bar(progress.percent(), bar_width)),
        Line::from(""),
        label_value_line("Step", current.label()),
        Line::from(""),
    ];

    lines.extend(BuildStep::SCHEDULE.iter().map(|step| {
        let style = if *step < current {
            theme::success_prompt()
        } else if *step == current {
            theme::accent()
        } else {
            theme::secondary_text()
        };
        check_line(*step <= current, step.label(), style)
    }));
    lines
}

fn waiting_lines(model: &Model) -> Vec<Line<'static>> {
    let target = model
        .pending_step()
        .map_or_else(|| "device".to_string(), |step| step.to_string());

    vec![
        Line::from(""),
        busy_heading(model, "WAITING FOR DEVICE", theme::warning_prompt()),
        Line::from(""),
        Line::from(format!("Connect {target}")),
        Line::from("Double-tap reset"),
        Line::from(""),
        Line::from(Span::styled(
            format!("Polling {}...", model.volume_path().display()),
            theme::secondary_text(),
        )),
    ]
}

fn flashing_lines(model: &Model) -> Vec<Line<'static>> {
    let Some(step) = model.pending_step() else {
        return vec![busy_heading(model, "FLASHING", theme::accent())];
    };

    let mut lines = vec![
        Line::from(""),
        busy_heading(model, &format!("FLASHING {step}"), theme::accent()),
        Line::from(""),
        label_value_line("Copying", step.firmware_name()),
        Line::from(""),
    ];
    lines.extend(sequence_of(step).into_iter().map(|half| {
        let done = model.completed_steps().contains(&half);
        let style = if done {
            theme::success_prompt()
        } else if half == step {
            theme::accent()
        } else {
            theme::secondary_text()
        };
        check_line(done || half == step, format!("Flash {}", half.label()), style)
    }));
    lines
}

fn complete_lines(model: &Model) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("✓ FLASH COMPLETE", theme::success_prompt())),
        Line::from(""),
    ];

    lines.extend(model.completed_steps().iter().map(|step| {
        Line::from(Span::styled(
            format!("  ✓  {step} flashed"),
            theme::success_prompt(),
        ))
    }));

    let seconds = model
        .elapsed()
        .map_or(0, |elapsed| elapsed.as_secs_f64().round() as u64);
    lines.push(Line::from(""));
    lines.push(Line::from(format!("  Duration: {seconds}s")));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Test both halves to verify.",
        theme::secondary_text(),
    )));
    lines
}

fn busy_heading(model: &Model, title: &str, style: Style) -> Line<'static> {
    Line::from(Span::styled(
        format!("{} {title}", spinner::frame(model.spinner())),
        style,
    ))
}

fn sequence_of(step: FlashStep) -> [FlashStep; 2] {
    if step.is_reset() {
        [FlashStep::ResetLeft, FlashStep::ResetRight]
    } else {
        [FlashStep::Left, FlashStep::Right]
    }
}
