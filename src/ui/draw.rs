use anyhow::Result;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::{Frame, Terminal};
// Use Popup from tui-widgets to render modals
use tui_widgets::popup::Popup;

use crate::config::RgbColor;

use super::app::{App, ListRow, SearchFocus};
use super::edit::{DialogField, DialogMode};

const SEARCH_HELP_INPUT: &str = "Type to filter  Esc: focus list  Enter: open";
const LIST_HELP: &str = "j/k: nav  Enter: view  e: edit  x: delete  /: search  q: quit";
const DIALOG_VIEW_HELP: &str = "e: edit  Esc: close";
const DIALOG_EDIT_HELP: &str = "Tab: next field  Enter: update  Esc: dismiss";
const CONFIRM_HELP: &str = "Y/Enter: confirm  N/Esc: cancel";

pub fn render<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    terminal.draw(|frame| draw_frame(frame, app))?;
    Ok(())
}

fn draw_frame(frame: &mut Frame<'_>, app: &mut App) {
    let size = frame.area();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(size);

    draw_search(frame, layout[0], app);
    draw_list(frame, layout[1], app);
    draw_footer(frame, layout[2], app);
    draw_dialog(frame, size, app);
    draw_confirm_modal(frame, size, app);
}

fn draw_search(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let active = matches!(app.search_focus, SearchFocus::Input) && app.dialog.is_none();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app, active));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let label = "SEARCH: ";
    let value = app.search_input.value();
    let value_style = if active {
        Style::default()
    } else {
        header_text_style(app)
    };
    let line = Line::from(vec![
        Span::styled(label, header_text_style(app)),
        Span::styled(value.to_string(), value_style),
    ]);
    frame.render_widget(Paragraph::new(line), inner);

    if active {
        let column = Span::raw(label).width() + app.search_input.visual_cursor();
        let x = inner.x.saturating_add(column as u16);
        frame.set_cursor_position((x, inner.y));
    }
}

fn draw_list(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let items: Vec<ListItem> = if app.rows.is_empty() {
        vec![ListItem::new(Line::from("No contacts"))]
    } else {
        app.rows.iter().map(|row| build_list_item(row, app)).collect()
    };

    let mut state = ListState::default();
    if let Some(selected) = app.selected_row {
        state.select(Some(selected));
    }

    let list = List::new(items)
        .highlight_style(selection_style(app))
        .highlight_symbol(" ")
        .repeat_highlight_symbol(false);

    frame.render_stateful_widget(list, area, &mut state);
}

fn build_list_item(row: &ListRow, app: &App) -> ListItem<'static> {
    if !row.selectable() {
        return ListItem::new(Line::from(row.text.clone())).style(section_title_style(app));
    }

    let mut spans = vec![Span::raw(format!("  {}", row.text))];
    if let Some(detail) = &row.detail {
        spans.push(Span::styled(
            format!("  {}", detail),
            Style::default().add_modifier(Modifier::DIM),
        ));
    }
    ListItem::new(Line::from(spans))
}

fn draw_dialog(frame: &mut Frame<'_>, area: Rect, app: &mut App) {
    let Some(dialog) = app.dialog.as_ref() else {
        return;
    };

    let editing = dialog.mode() == DialogMode::Editing;
    let label_width = DialogField::ALL
        .iter()
        .map(|f| f.label().len() + 1)
        .max()
        .unwrap_or(0);

    let mut lines: Vec<Line> = Vec::new();
    let mut cursor: Option<(usize, usize)> = None;
    for field in DialogField::ALL {
        let focused = editing && field == dialog.field();
        let label = format!("{:width$} ", format!("{}:", field.label()), width = label_width);
        let value = dialog.field_value(field).to_string();
        let (label_style, value_style) = if focused {
            (selection_style(app), selection_style(app))
        } else {
            (header_text_style(app), Style::default())
        };
        if focused {
            let column = Span::raw(&label).width() + dialog.visual_cursor();
            cursor = Some((lines.len(), column));
        }
        lines.push(Line::from(vec![
            Span::styled(label, label_style),
            Span::styled(value, value_style),
        ]));
    }
    lines.push(Line::from("".to_string()));
    lines.push(Line::from(if editing {
        DIALOG_EDIT_HELP.to_string()
    } else {
        DIALOG_VIEW_HELP.to_string()
    }));

    let title_line = Line::from(Span::styled("CONTACT DETAILS", header_text_style(app)));
    let popup = Popup::new(Text::from(lines))
        .title(title_line)
        .border_style(border_style(app, true));

    frame.render_stateful_widget_ref(popup, area, &mut app.modal_popup);

    if let Some((line_idx, column)) = cursor {
        if let Some(popup_area) = app.modal_popup.area() {
            let inner = Block::default().borders(Borders::ALL).inner(*popup_area);
            let x = inner.x.saturating_add(column as u16);
            let y = inner.y.saturating_add(line_idx as u16);
            frame.set_cursor_position((x, y));
        }
    }
}

fn draw_confirm_modal(frame: &mut Frame<'_>, area: Rect, app: &mut App) {
    let Some(modal) = app.confirm_modal.as_ref() else {
        return;
    };

    let lines = vec![
        Line::from(modal.message.clone()),
        Line::from("".to_string()),
        Line::from(CONFIRM_HELP.to_string()),
    ];

    let title_line = Line::from(Span::styled(modal.title.clone(), header_text_style(app)));
    let popup = Popup::new(Text::from(lines))
        .title(title_line)
        .border_style(border_style(app, true));

    frame.render_stateful_widget_ref(popup, area, &mut app.modal_popup);
}

fn draw_footer(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let message: String = if app.confirm_modal.is_some() {
        CONFIRM_HELP.to_string()
    } else if let Some(dialog) = app.dialog.as_ref() {
        if dialog.mode() == DialogMode::Editing {
            DIALOG_EDIT_HELP.to_string()
        } else {
            DIALOG_VIEW_HELP.to_string()
        }
    } else {
        match app.search_focus {
            SearchFocus::Input => SEARCH_HELP_INPUT.to_string(),
            SearchFocus::List => app.status.clone().unwrap_or_else(|| LIST_HELP.to_string()),
        }
    };

    let colors = app.ui_colors();
    let style = Style::default()
        .fg(color(colors.status_fg))
        .bg(color(colors.status_bg));

    let background = Block::default().style(Style::default().bg(color(colors.status_bg)));
    frame.render_widget(background, area);

    frame.render_widget(Paragraph::new(message).style(style), area);
}

fn selection_style(app: &App) -> Style {
    let colors = app.ui_colors();
    Style::default()
        .fg(color(colors.selection_fg))
        .bg(color(colors.selection_bg))
}

fn border_style(app: &App, _active: bool) -> Style {
    let colors = app.ui_colors();
    Style::default().fg(color(colors.border))
}

fn header_text_style(app: &App) -> Style {
    let colors = app.ui_colors();
    Style::default().fg(color(colors.section_title))
}

fn section_title_style(app: &App) -> Style {
    header_text_style(app).add_modifier(Modifier::BOLD)
}

fn color(rgb: RgbColor) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}
