use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Borders};
use splitflash_app::LogLevel;
use splitflash_core::device::DeviceStatus;

pub(crate) fn chrome<'a>(title: impl Into<Line<'a>>) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(title)
}

pub(crate) fn panel<'a>(title: impl Into<Line<'a>>, active: bool) -> Block<'a> {
    let block = chrome(title);
    if active {
        block.border_style(Style::default().fg(Color::Magenta))
    } else {
        block.border_style(Style::default().fg(Color::DarkGray))
    }
}

pub(crate) fn key_block() -> Block<'static> {
    chrome("Keys")
}

pub(crate) fn table_highlight(color: Color) -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(color)
        .add_modifier(Modifier::BOLD)
}

pub(crate) fn focus_prompt() -> Style {
    Style::default()
        .fg(Color::Blue)
        .add_modifier(Modifier::BOLD)
}

pub(crate) fn accent() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

pub(crate) fn success_prompt() -> Style {
    Style::default()
        .fg(Color::Green)
        .add_modifier(Modifier::BOLD)
}

pub(crate) fn warning_prompt() -> Style {
    Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

pub(crate) fn error_prompt() -> Style {
    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
}

pub(crate) fn secondary_text() -> Style {
    Style::default().fg(Color::Gray).add_modifier(Modifier::DIM)
}

pub(crate) fn device_status(status: DeviceStatus) -> Style {
    match status {
        DeviceStatus::Connected => success_prompt(),
        DeviceStatus::Waiting => warning_prompt(),
        DeviceStatus::Disconnected => secondary_text(),
    }
}

pub(crate) fn log_level(level: LogLevel) -> Style {
    match level {
        LogLevel::Info => Style::default(),
        LogLevel::Success => success_prompt(),
        LogLevel::Warning => warning_prompt(),
        LogLevel::Error => error_prompt(),
    }
}
