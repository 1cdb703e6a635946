pub mod digits;
pub mod screen;

use chrono::{DateTime, Local};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Paragraph, Widget},
};

use crate::{config::SetupDraft, cue::CuePlayer, session::Snapshot, App};

pub const ACCENT: Color = Color::Rgb(249, 115, 22);
pub const CRITICAL: Color = Color::Rgb(239, 68, 68);

const HORIZONTAL_MARGIN: u16 = 5;

/// Seconds at or below which the round screen switches to the big timer
pub const URGENT_SECS: u32 = 10;
/// Seconds at or below which the timer turns red
pub const CRITICAL_SECS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Calm,
    Urgent,
    Critical,
}

impl Urgency {
    pub fn of(remaining_secs: u32) -> Self {
        if remaining_secs <= CRITICAL_SECS {
            Urgency::Critical
        } else if remaining_secs <= URGENT_SECS {
            Urgency::Urgent
        } else {
            Urgency::Calm
        }
    }

    pub fn color(self) -> Color {
        match self {
            Urgency::Calm | Urgency::Urgent => ACCENT,
            Urgency::Critical => CRITICAL,
        }
    }
}

/// `m:ss`
pub fn format_time(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Everything a screen may look at. Borrowed for one frame.
pub struct View<'a> {
    pub snapshot: &'a Snapshot,
    pub draft: &'a SetupDraft,
    pub finished_at: Option<DateTime<Local>>,
}

impl<P: CuePlayer> Widget for &App<P> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let snapshot = self.session.snapshot();
        let view = View {
            snapshot: &snapshot,
            draft: &self.draft,
            finished_at: self.finished_at,
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(area);

        screen::current_screen(snapshot.phase()).render(&view, chunks[0], buf);

        let footer = Paragraph::new(Span::styled(
            "Made with ❤ by Cork Devs",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center);
        footer.render(chunks[1], buf);
    }
}
