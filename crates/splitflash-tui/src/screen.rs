use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::Paragraph;
use splitflash_app::{Model, Panel, Phase};

use crate::theme;
use crate::ui::firmware_tree::{self, panel_title};
use crate::ui::text::{compact_hint, key_hint_height, key_hint_paragraph, wrapped_paragraph};
use crate::ui::{confirm, help, status_view};

const MIN_WIDTH: u16 = 60;
const MIN_HEIGHT: u16 = 16;
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Draws the whole screen for `model`: header, three panels, key footer and
/// whichever overlay is open.
pub(crate) fn render(frame: &mut Frame<'_>, model: &Model) {
    let area = frame.area();
    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        render_too_small(frame, area);
        return;
    }

    let hint = footer_hint(model, area.width);
    let footer_height = key_hint_height(area.width, hint);
    let [header, body, footer] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(footer_height),
        ])
        .areas(area);

    render_header(frame, header, model);

    let [firmware, status, log] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(40),
            Constraint::Percentage(30),
        ])
        .areas(body);
    firmware_tree::render(frame, firmware, model);
    status_view::render(frame, status, model);
    render_log(frame, log, model);

    frame.render_widget(key_hint_paragraph(hint).block(theme::key_block()), footer);

    if let Some(choice) = model.dialog_choice() {
        confirm::render_factory_reset(frame, choice);
    } else if model.show_help() {
        help::render_help(frame);
    }
}

fn render_header(frame: &mut Frame<'_>, area: Rect, model: &Model) {
    let block = theme::chrome(Line::default());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let status = model.header_status();
    let right = Line::from(vec![
        Span::raw("NICENANO "),
        Span::styled(status.to_string(), theme::device_status(status)),
        Span::styled(format!("  v{VERSION}"), theme::secondary_text()),
    ]);
    let right_width = u16::try_from(right.width()).unwrap_or(u16::MAX);

    let [left_area, right_area] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(right_width)])
        .areas(inner);

    frame.render_widget(
        Paragraph::new(Span::styled("⌨  CORNE FLASH UTILITY", theme::accent())),
        left_area,
    );
    frame.render_widget(Paragraph::new(right).alignment(Alignment::Right), right_area);
}

fn render_log(frame: &mut Frame<'_>, area: Rect, model: &Model) {
    let block = theme::panel(panel_title(Panel::Log), model.panel() == Panel::Log);
    let capacity = usize::from(block.inner(area).height);

    let entries = model.log().entries();
    let skip = entries.len().saturating_sub(capacity);
    let lines: Vec<Line<'static>> = entries
        .skip(skip)
        .map(|entry| {
            Line::from(vec![
                Span::styled(format!("{} ", entry.clock()), theme::secondary_text()),
                Span::styled(entry.message.clone(), theme::log_level(entry.level)),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
}

fn footer_hint(model: &Model, width: u16) -> &'static str {
    if model.show_help() {
        return "? or Esc: close help";
    }

    match model.phase() {
        Phase::Idle => compact_hint(
            width,
            "↑/↓ Navigate    Enter Select    b Build    f Flash    r Factory Reset    q Quit    ? Help",
            "↑/↓ Move    Enter Select    b Build    f Flash    r Reset    q Quit    ? Help",
            "j/k | Enter | b | f | r | q | ?",
        ),
        Phase::FactoryResetPending => "←/→ Choose    Enter Confirm    Esc Cancel",
        Phase::Building => "Building...",
        Phase::WaitingDevice => compact_hint(
            width,
            "Waiting for device... Double-tap reset button    Esc Cancel",
            "Double-tap reset button    Esc Cancel",
            "Esc Cancel",
        ),
        Phase::Flashing => "Flashing... Do not disconnect device",
        Phase::Complete => "Enter Continue    q Quit",
    }
}

fn render_too_small(frame: &mut Frame<'_>, area: Rect) {
    let message = format!(
        "Terminal too small ({}x{}). Need at least {MIN_WIDTH}x{MIN_HEIGHT}.",
        area.width, area.height
    );
    frame.render_widget(
        wrapped_paragraph(Span::styled(message, theme::warning_prompt()))
            .alignment(Alignment::Center),
        area,
    );
}

#[cfg(test)]
mod tests {
    use splitflash_app::{Key, Msg};
    use splitflash_core::device::{DeviceStatus, StatusChange};

    use crate::test_support::{complete_build, model_with, render_model};

    #[test]
    fn header_shows_title_status_and_version() {
        let model = model_with(Vec::new());
        let rendered = render_model(&model, 120, 30);

        assert!(rendered.contains("CORNE FLASH UTILITY"));
        assert!(rendered.contains("NICENANO Disconnected"));
        assert!(rendered.contains(&format!("v{}", env!("CARGO_PKG_VERSION"))));
    }

    #[test]
    fn header_follows_device_status() {
        let mut model = model_with(vec![complete_build("20240115")]);
        model.update(Msg::PollFinished(Some(StatusChange::observed(
            DeviceStatus::Connected,
        ))));
        assert!(render_model(&model, 120, 30).contains("NICENANO Connected"));

        model.update(Msg::PollFinished(Some(StatusChange::observed(
            DeviceStatus::Disconnected,
        ))));
        model.update(Msg::Key(Key::Char('f')));
        assert!(render_model(&model, 120, 30).contains("NICENANO Waiting..."));
    }

    #[test]
    fn log_panel_shows_latest_entries() {
        let model = model_with(vec![complete_build("20240115")]);
        let rendered = render_model(&model, 120, 30);

        assert!(rendered.contains("App started"));
        assert!(rendered.contains("Found 1 builds"));
    }

    #[test]
    fn footer_hint_tracks_phase() {
        let mut model = model_with(vec![complete_build("20240115")]);
        assert!(render_model(&model, 120, 30).contains("r Factory Reset"));

        model.update(Msg::Key(Key::Char('f')));
        let rendered = render_model(&model, 120, 30);
        assert!(rendered.contains("Esc Cancel"));
        assert!(!rendered.contains("r Factory Reset"));
    }

    #[test]
    fn help_overlay_opens_in_idle() {
        let mut model = model_with(Vec::new());
        model.update(Msg::Key(Key::Char('?')));

        let rendered = render_model(&model, 120, 40);
        assert!(rendered.contains("KEYBINDINGS"));
        assert!(rendered.contains("? or Esc: close help"));
    }

    #[test]
    fn factory_reset_dialog_overlays_panels() {
        let mut model = model_with(vec![crate::test_support::build(
            "20240115",
            &["corne_left.uf2", "corne_right.uf2", "settings_reset.uf2"],
        )]);
        model.update(Msg::Key(Key::Char('r')));

        let rendered = render_model(&model, 120, 40);
        assert!(rendered.contains("FACTORY RESET"));
        assert!(rendered.contains("[ Cancel ]"));
    }

    #[test]
    fn tiny_terminal_asks_for_more_room() {
        let model = model_with(Vec::new());
        let rendered = render_model(&model, 40, 10);
        assert!(rendered.contains("Terminal too small"));
    }
}
