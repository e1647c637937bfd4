//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).  This makes it easy to change the
//! visual layout without touching business logic.
//!
//! ## For contributors
//!
//! * The layout is a two-row split: a scrollable list on top and a one-line
//!   status bar at the bottom.
//! * Each [`ContentVariant`] has its own row template in [`body_lines`]; the
//!   match is exhaustive on purpose.
//! * [`ratatui`] is the TUI framework; see its docs for widget details.

use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::App;
use crate::engine::LoadKind;
use crate::source::{ContentVariant, Item};

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let [main_area, status_area] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_feed_list(app, frame, main_area);
    draw_status_bar(app, frame, status_area);
}

/// Human-friendly age of a post, e.g. `5m ago`.
pub fn time_ago(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = now.signed_duration_since(created_at);
    if age.num_minutes() < 1 {
        "just now".into()
    } else if age.num_hours() < 1 {
        format!("{}m ago", age.num_minutes())
    } else if age.num_days() < 1 {
        format!("{}h ago", age.num_hours())
    } else {
        format!("{}d ago", age.num_days())
    }
}

/// The lines under the author header, one template per variant.
fn body_lines(body: &ContentVariant) -> Vec<Line<'_>> {
    match body {
        ContentVariant::Text { text } => text
            .lines()
            .map(|l| Line::from(Span::styled(l, Style::default().fg(Color::White))))
            .collect(),
        ContentVariant::Image { image_ref, caption } => vec![
            Line::from(vec![
                Span::styled("[image] ", Style::default().fg(Color::Magenta)),
                Span::styled(image_ref.as_str(), Style::default().fg(Color::DarkGray)),
            ]),
            caption_line(caption),
        ],
        ContentVariant::Video {
            thumbnail_ref: _,
            video_ref,
            caption,
        } => vec![
            Line::from(vec![
                Span::styled("[▶ video] ", Style::default().fg(Color::Red)),
                Span::styled(video_ref.as_str(), Style::default().fg(Color::DarkGray)),
            ]),
            caption_line(caption),
        ],
    }
}

fn caption_line(caption: &str) -> Line<'_> {
    Line::from(Span::styled(
        caption,
        Style::default().add_modifier(Modifier::ITALIC),
    ))
}

fn item_row(item: &Item, now: DateTime<Utc>) -> ListItem<'_> {
    let mut lines = vec![Line::from(vec![
        Span::styled(
            item.author.display_name.as_str(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            time_ago(item.created_at, now),
            Style::default().fg(Color::DarkGray),
        ),
    ])];
    lines.extend(body_lines(&item.body));
    lines.push(Line::raw(""));
    ListItem::new(lines)
}

/// Render the scrollable feed item list.
fn draw_feed_list(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .title(format!(" {} ", app.source_name))
        .borders(Borders::ALL);

    if app.items.is_empty() {
        let message = match app.loading {
            Some(_) => "Loading…",
            None if !app.has_more => "Nothing here.",
            None => "Press r to load the feed.",
        };
        frame.render_widget(Paragraph::new(message).block(block), area);
        return;
    }

    let now = Utc::now();
    let mut rows: Vec<ListItem> = app.items.iter().map(|item| item_row(item, now)).collect();

    // Footer rows sit after the last item and are never selected.
    if app.loading == Some(LoadKind::More) {
        rows.push(ListItem::new(Span::styled(
            "⟳ loading more…",
            Style::default().fg(Color::Yellow),
        )));
    } else if !app.has_more {
        rows.push(ListItem::new(Span::styled(
            "— end of feed —",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let list = List::new(rows)
        .block(block)
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let status = Paragraph::new(Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(&app.status, Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(
            format!("{} items", app.items.len()),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  q: quit  ↑/↓: scroll  r: refresh  m: more  c: cancel"),
    ]));
    frame.render_widget(status, area);
}
