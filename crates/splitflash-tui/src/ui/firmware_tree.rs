use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, ScrollbarOrientation};
use splitflash_app::{Model, Panel};
use splitflash_core::firmware::Build;
use splitflash_core::format::{format_date, format_size};
use tui_tree_widget::{Scrollbar as TreeScrollbar, Tree, TreeItem, TreeState};

use crate::theme;
use crate::ui::text::wrapped_paragraph;

/// Build list with the selected build expanded to its `.uf2` files.
pub(crate) fn render(frame: &mut Frame<'_>, area: Rect, model: &Model) {
    let block = theme::panel(
        panel_title(Panel::Firmware),
        model.panel() == Panel::Firmware,
    );

    if model.builds().is_empty() {
        frame.render_widget(
            wrapped_paragraph(Span::styled("No firmware found", theme::secondary_text()))
                .block(block),
            area,
        );
        return;
    }

    let selected = model.selected();
    let items = match tree_items(model.builds(), selected) {
        Ok(items) => items,
        Err(_) => {
            frame.render_widget(fallback_list(model).block(block), area);
            return;
        }
    };

    let tree = match Tree::new(&items) {
        Ok(tree) => tree,
        Err(_) => {
            frame.render_widget(fallback_list(model).block(block), area);
            return;
        }
    };
    let tree = tree
        .block(block)
        .experimental_scrollbar(Some(
            TreeScrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(None)
                .end_symbol(None),
        ))
        .highlight_style(theme::table_highlight(Color::Magenta))
        .highlight_symbol("▸ ");

    let mut state = TreeState::default();
    if let Some(build) = selected {
        state.open(vec![build.date.clone()]);
        state.select(vec![build.date.clone()]);
    }
    frame.render_stateful_widget(tree, area, &mut state);
}

pub(crate) fn panel_title(panel: Panel) -> Line<'static> {
    let index = Panel::ALL
        .iter()
        .position(|candidate| *candidate == panel)
        .map_or(0, |position| position + 1);
    Line::from(format!(" {index} {} ", panel.title()))
}

fn tree_items(
    builds: &[Build],
    selected: Option<&Build>,
) -> std::io::Result<Vec<TreeItem<'static, String>>> {
    builds
        .iter()
        .map(|build| {
            let label = build_label(build);
            if selected.is_some_and(|current| current.date == build.date) {
                let children = build
                    .files
                    .iter()
                    .map(|file| {
                        TreeItem::new_leaf(
                            file.name.clone(),
                            Line::from(vec![
                                Span::raw(file.name.clone()),
                                Span::styled(
                                    format!("  {}", format_size(file.size)),
                                    theme::secondary_text(),
                                ),
                            ]),
                        )
                    })
                    .collect();
                TreeItem::new(build.date.clone(), label, children)
            } else {
                Ok(TreeItem::new_leaf(build.date.clone(), label))
            }
        })
        .collect()
}

fn build_label(build: &Build) -> Line<'static> {
    let mut spans = vec![Span::raw(format_date(&build.date))];
    if build.is_complete() {
        spans.push(Span::styled(" ✓", theme::success_prompt()));
    }
    Line::from(spans)
}

fn fallback_list(model: &Model) -> Paragraph<'static> {
    let lines: Vec<Line<'static>> = model
        .builds()
        .iter()
        .enumerate()
        .map(|(index, build)| {
            let marker = if model.selected_index() == Some(index) {
                "▸ "
            } else {
                "  "
            };
            let mut line = build_label(build);
            line.spans.insert(0, Span::raw(marker));
            line
        })
        .collect();
    wrapped_paragraph(lines)
}
