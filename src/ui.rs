use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use time_humanize::{Accuracy, HumanTime, Tense};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::{category::Category, log::LogEntry, App, InputMode};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;

/// How many completed entries the bottom panel shows
pub const RECENT_ENTRIES: usize = 5;

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const SLEEP_FRAMES: [&str; 6] = ["·  ", "·· ", "···", " ··", "  ·", "   "];

// Ticks per animation frame (ticks arrive every TICK_RATE_MS)
const FRAME_TICKS: u64 = 2;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints(
                [
                    Constraint::Length(2),
                    Constraint::Length(Category::ALL.len() as u16 + 2),
                    Constraint::Min(RECENT_ENTRIES as u16 + 2),
                ]
                .as_ref(),
            )
            .split(area);

        let status = match self.mode {
            InputMode::Comment => self.comment_editor_line(bold_style, dim_style),
            InputMode::Select => match self.tracker.active() {
                Some(session) => {
                    let frame = SPINNER_FRAMES
                        [(self.tick / FRAME_TICKS) as usize % SPINNER_FRAMES.len()];
                    let mut spans = vec![
                        Span::raw("Working on "),
                        Span::styled(session.category.to_string(), green_bold_style),
                        Span::raw(" "),
                        Span::styled(frame, green_bold_style),
                        Span::styled(
                            format!("  {}", humanize(elapsed_since(session.start))),
                            dim_style,
                        ),
                    ];
                    if let Some(comment) = &session.comment {
                        spans.push(Span::styled(format!("  ({})", comment), italic_style));
                    }
                    Line::from(spans)
                }
                None => {
                    let frame =
                        SLEEP_FRAMES[(self.tick / FRAME_TICKS) as usize % SLEEP_FRAMES.len()];
                    Line::from(vec![
                        Span::styled("Sleeping ", dim_style),
                        Span::styled(frame, dim_style),
                    ])
                }
            },
        };

        Paragraph::new(status)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[0], buf);

        let task_lines: Vec<Line> = Category::ALL
            .iter()
            .map(|category| {
                let active = self
                    .tracker
                    .active()
                    .is_some_and(|session| session.category == *category);
                let style = if active {
                    green_bold_style
                } else {
                    Style::default().fg(Color::White)
                };
                Line::from(Span::styled(
                    format!("{}. {}", category.index(), category),
                    style,
                ))
            })
            .collect();

        Paragraph::new(task_lines)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Tasks"))
            .render(chunks[1], buf);

        let max_line_width = (chunks[2].width.saturating_sub(2)) as usize;
        let entry_lines: Vec<Line> = self
            .time_log
            .recent(RECENT_ENTRIES)
            .iter()
            .map(|entry| Line::from(clip_to_width(&format_entry(entry), max_line_width)))
            .collect();

        if !entry_lines.is_empty() {
            Paragraph::new(entry_lines)
                .block(Block::default().borders(Borders::ALL).title("Recent"))
                .render(chunks[2], buf);
        }
    }
}

impl App {
    fn comment_editor_line(&self, bold_style: Style, dim_style: Style) -> Line {
        // Comment mode implies an open session; the fallback label is never
        // shown in practice
        let category = self
            .tracker
            .active()
            .map(|session| session.category)
            .unwrap_or(Category::ALL[0]);

        let draft: &str = &self.comment_draft;
        if draft.is_empty() {
            Line::from(vec![
                Span::styled(format!("Comment for {}: ", category), bold_style),
                Span::styled("type a note, enter to apply, esc to cancel", dim_style),
            ])
        } else {
            Line::from(vec![
                Span::styled(format!("Comment for {}: ", category), bold_style),
                Span::raw(draft.to_string()),
                Span::styled("█", dim_style),
            ])
        }
    }
}

fn elapsed_since(start: chrono::DateTime<chrono::Local>) -> std::time::Duration {
    (chrono::Local::now() - start).to_std().unwrap_or_default()
}

fn humanize(duration: std::time::Duration) -> String {
    HumanTime::from(duration).to_text_en(Accuracy::Rough, Tense::Present)
}

/// One display line per completed entry, newest first in the panel
fn format_entry(entry: &LogEntry) -> String {
    let duration = (entry.end - entry.start).to_std().unwrap_or_default();
    let mut line = format!(
        "{} - {} - {} ({})",
        entry.start.format("%Y-%m-%d %H:%M"),
        entry.end.format("%Y-%m-%d %H:%M"),
        entry.category,
        humanize(duration)
    );
    if let Some(comment) = &entry.comment {
        line.push_str(&format!(" [{}]", comment));
    }
    line
}

/// Clips `text` to `max_width` terminal columns, appending an ellipsis when
/// anything was cut. Width is measured per display column, not per char, so
/// wide glyphs in comments do not overflow the panel.
fn clip_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }

    let budget = max_width.saturating_sub(1);
    let mut out = String::new();
    let mut used = 0;

    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        out.push(c);
        used += w;
    }

    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::TimeLog;
    use chrono::TimeZone;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{backend::TestBackend, Terminal};
    use tempfile::{tempdir, TempDir};

    fn test_app() -> (App, TempDir) {
        let dir = tempdir().unwrap();
        let time_log = TimeLog::load(dir.path().join("log.json")).unwrap();
        (App::new(time_log), dir)
    }

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn render_to_string(app: &App) -> String {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| f.render_widget(app, f.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_idle_screen_shows_sleeping_and_task_list() {
        let (app, _dir) = test_app();

        let content = render_to_string(&app);

        assert!(content.contains("Sleeping"));
        assert!(content.contains("1. DEVELOPMENT"));
        assert!(content.contains("4. RESEARCH"));
    }

    #[test]
    fn test_tracking_screen_names_the_active_task() {
        let (mut app, _dir) = test_app();
        app.on_key(key('2'));

        let content = render_to_string(&app);

        assert!(content.contains("Working on"));
        assert!(content.contains("MEETING"));
        assert!(!content.contains("Sleeping"));
    }

    #[test]
    fn test_tracking_screen_shows_the_session_comment() {
        let (mut app, _dir) = test_app();
        app.on_key(key('1'));
        app.tracker
            .set_comment(Some("pairing".to_string()))
            .unwrap();

        let content = render_to_string(&app);

        assert!(content.contains("(pairing)"));
    }

    #[test]
    fn test_comment_mode_renders_the_editor() {
        let (mut app, _dir) = test_app();
        app.on_key(key('1'));
        app.on_key(key('c'));

        let content = render_to_string(&app);
        assert!(content.contains("Comment for DEVELOPMENT"));

        for c in "notes".chars() {
            app.on_key(key(c));
        }
        let content = render_to_string(&app);
        assert!(content.contains("notes"));
    }

    #[test]
    fn test_recent_panel_lists_completed_entries() {
        let (mut app, _dir) = test_app();
        app.on_key(key('1'));
        app.on_key(key('1'));

        let content = render_to_string(&app);

        assert!(content.contains("Recent"));
        assert!(content.contains("DEVELOPMENT"));
    }

    #[test]
    fn test_recent_panel_is_hidden_while_log_is_empty() {
        let (app, _dir) = test_app();

        let content = render_to_string(&app);

        assert!(!content.contains("Recent"));
    }

    #[test]
    fn test_spinner_advances_with_ticks() {
        let (mut app, _dir) = test_app();
        app.on_key(key('1'));

        let before = render_to_string(&app);
        for _ in 0..FRAME_TICKS {
            app.on_tick();
        }
        let after = render_to_string(&app);

        assert_ne!(before, after);
    }

    #[test]
    fn test_format_entry_includes_both_timestamps_and_label() {
        let entry = LogEntry {
            start: chrono::Local.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
            end: chrono::Local.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap(),
            category: Category::Research,
            comment: None,
        };

        let line = format_entry(&entry);

        assert!(line.starts_with("2024-03-01 09:00 - 2024-03-01 09:30 - RESEARCH"));
        assert!(line.contains("minutes"));
    }

    #[test]
    fn test_format_entry_appends_comment() {
        let entry = LogEntry {
            start: chrono::Local.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
            end: chrono::Local.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap(),
            category: Category::Meeting,
            comment: Some("retro".to_string()),
        };

        assert!(format_entry(&entry).ends_with("[retro]"));
    }

    #[test]
    fn test_clip_to_width_passes_short_text_through() {
        assert_eq!(clip_to_width("short", 10), "short");
        assert_eq!(clip_to_width("exact", 5), "exact");
    }

    #[test]
    fn test_clip_to_width_cuts_and_marks_long_text() {
        let clipped = clip_to_width("abcdefghij", 6);
        assert_eq!(clipped, "abcde…");
        assert_eq!(clipped.width(), 6);
    }

    #[test]
    fn test_clip_to_width_counts_display_columns_for_wide_glyphs() {
        // Each CJK glyph occupies two columns
        let clipped = clip_to_width("日本語テスト", 5);
        assert_eq!(clipped, "日本…");
        assert_eq!(clipped.width(), 5);
    }
}
