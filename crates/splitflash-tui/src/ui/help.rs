use ratatui::Frame;
use ratatui::text::{Line, Span, Text};

use crate::theme;
use crate::ui::modal::{ModalSpec, render_modal};
use crate::ui::text::focus_line;

const SECTIONS: [(&str, &[(&str, &str)]); 3] = [
    (
        "Navigation",
        &[
            ("↑ / k", "Move up"),
            ("↓ / j", "Move down"),
            ("Tab", "Switch panel"),
            ("1 / 2 / 3", "Jump to panel"),
        ],
    ),
    (
        "Actions",
        &[
            ("Enter", "Select / Confirm"),
            ("b", "Build new firmware"),
            ("f", "Flash selected firmware"),
            ("r", "Factory reset"),
        ],
    ),
    (
        "General",
        &[("?", "Toggle this help"), ("Esc", "Cancel / Back"), ("q", "Quit")],
    ),
];

pub(crate) fn render_help(frame: &mut Frame<'_>) {
    let mut lines = Vec::new();
    for (index, (section, bindings)) in SECTIONS.iter().enumerate() {
        if index > 0 {
            lines.push(Line::from(""));
        }
        lines.push(focus_line(*section));
        lines.extend(bindings.iter().map(|(keys, action)| {
            Line::from(vec![
                Span::styled(format!("  {keys:<11}"), theme::accent()),
                Span::raw(*action),
            ])
        }));
    }

    render_modal(
        frame,
        ModalSpec {
            title: "KEYBINDINGS",
            title_style: Some(theme::accent()),
            body: Text::from(lines),
            key_hint: Some("? or Esc: close"),
            width_pct: 50,
            height_pct: 70,
        },
    );
}
