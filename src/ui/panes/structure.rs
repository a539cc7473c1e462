//! Structure pane: one scene's rendered lines, indented and colored by kind

use crate::render::{LineKind, RenderedLine};
use crate::ui::app::RenderedScene;
use crate::ui::theme::DEFAULT_THEME;
use crate::walker::{ELLIPSIS, ERROR_TEXT};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

/// Scroll state for the structure pane
#[derive(Debug, Default)]
pub struct StructureScrollState {
    pub offset: usize,
}

/// Render the structure pane
pub fn render_structure_pane(
    frame: &mut Frame,
    area: Rect,
    scene: &RenderedScene,
    scroll_state: &mut StructureScrollState,
) {
    let block = Block::default()
        .title(format!(" {} | {} ", scene.name, scene.description))
        .borders(Borders::ALL)
        .border_style(
            Style::default()
                .fg(DEFAULT_THEME.border_focused)
                .add_modifier(Modifier::BOLD),
        );

    let all_items: Vec<ListItem> = if scene.lines.is_empty() {
        vec![ListItem::new("(nothing to show)").style(Style::default().fg(DEFAULT_THEME.comment))]
    } else {
        scene
            .lines
            .iter()
            .map(|line| ListItem::new(format_line_styled(line)))
            .collect()
    };

    // Clamp the user's scroll position to the content
    let total_items = all_items.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize; // Account for borders, min 1
    if total_items > visible_height {
        let max_scroll = total_items - visible_height;
        scroll_state.offset = scroll_state.offset.min(max_scroll);
    } else {
        scroll_state.offset = 0;
    }

    let visible_items: Vec<ListItem> = all_items
        .into_iter()
        .skip(scroll_state.offset)
        .take(visible_height)
        .collect();

    let list = List::new(visible_items).block(block);
    frame.render_widget(list, area);
}

/// Format a rendered line with styled spans
pub(crate) fn format_line_styled(line: &RenderedLine) -> Line<'static> {
    let mut spans = vec![
        Span::raw("  ".repeat(line.depth)),
        Span::styled(
            line.label.clone(),
            Style::default().fg(DEFAULT_THEME.type_name),
        ),
        Span::styled(" = ", Style::default().fg(DEFAULT_THEME.comment)),
    ];

    let value_style = match line.kind {
        LineKind::Summary => Style::default()
            .fg(DEFAULT_THEME.function)
            .add_modifier(Modifier::BOLD),
        LineKind::Scalar => Style::default().fg(DEFAULT_THEME.number),
        LineKind::Placeholder => placeholder_style(line),
    };
    spans.push(Span::styled(line.text.clone(), value_style));

    Line::from(spans)
}

fn placeholder_style(line: &RenderedLine) -> Style {
    if line.label == "error" || line.text == ERROR_TEXT {
        Style::default().fg(DEFAULT_THEME.error)
    } else if line.label == "circular" {
        Style::default()
            .fg(DEFAULT_THEME.secondary)
            .add_modifier(Modifier::ITALIC)
    } else if line.text == ELLIPSIS {
        Style::default()
            .fg(DEFAULT_THEME.comment)
            .add_modifier(Modifier::DIM)
    } else {
        Style::default().fg(DEFAULT_THEME.comment)
    }
}
