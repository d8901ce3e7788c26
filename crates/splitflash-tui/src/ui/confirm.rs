use ratatui::Frame;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span, Text};
use splitflash_app::DialogChoice;

use crate::theme;
use crate::ui::modal::{ModalSpec, render_modal};

const CONFIRM_LABEL: &str = "Yes, proceed";
const CANCEL_LABEL: &str = "Cancel";

/// Factory-reset confirmation. `choice` is the highlighted button.
pub(crate) fn render_factory_reset(frame: &mut Frame<'_>, choice: DialogChoice) {
    let mut lines = vec![
        Line::from("This will:"),
        Line::from("• Clear all Bluetooth bonds"),
        Line::from("• Reset keyboard settings"),
        Line::from("• Require re-pairing"),
        Line::from(""),
        Line::from(Span::styled(
            "Have you unpaired from all Bluetooth devices?",
            theme::warning_prompt(),
        )),
        Line::from(""),
    ];
    lines.push(button_row(choice));

    render_modal(
        frame,
        ModalSpec {
            title: "⚠  FACTORY RESET",
            title_style: Some(theme::warning_prompt()),
            body: Text::from(lines),
            key_hint: Some("←/h Yes    →/l Cancel    Enter Choose    Esc Close"),
            width_pct: 60,
            height_pct: 50,
        },
    );
}

fn button_row(choice: DialogChoice) -> Line<'static> {
    let (confirm, cancel) = match choice {
        DialogChoice::Confirm => (theme::table_highlight(Color::Red), Style::default()),
        DialogChoice::Cancel => (Style::default(), theme::table_highlight(Color::Cyan)),
    };

    Line::from(vec![
        Span::styled(format!("[ {CONFIRM_LABEL} ]"), confirm),
        Span::raw("   "),
        Span::styled(format!("[ {CANCEL_LABEL} ]"), cancel),
    ])
}
