use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Gauge, Paragraph, Widget, Wrap},
};

use crate::{
    config::{BREAK_SECS_MENU, ROUND_MINUTES_MENU},
    session::Phase,
    ui::{digits, format_time, Urgency, View, ACCENT},
};

/// A UI Screen boundary: one per session phase
pub trait Screen {
    fn render(&self, view: &View, area: Rect, buf: &mut Buffer);
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim() -> Style {
    Style::default().fg(Color::DarkGray)
}

fn legend(text: &str, area: Rect, buf: &mut Buffer) {
    Paragraph::new(Span::styled(
        text.to_owned(),
        dim().add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(area, buf);
}

/// Vertically centres a block of `height` rows inside `area`
fn centered(area: Rect, height: u16) -> Rect {
    let height = height.min(area.height);
    Rect {
        y: area.y + (area.height - height) / 2,
        height,
        ..area
    }
}

fn menu_line<'a>(label: &'a str, options: &[u32], selected: u32, unit: &str) -> Line<'a> {
    let mut spans = vec![Span::styled(format!("{label:<24}"), dim())];
    for &opt in options {
        let text = format!(" {opt}{unit} ");
        if opt == selected {
            spans.push(Span::styled(
                text,
                bold().fg(Color::Black).bg(ACCENT),
            ));
        } else {
            spans.push(Span::styled(text, Style::default().fg(Color::Gray)));
        }
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

pub struct SetupScreen;

impl Screen for SetupScreen {
    fn render(&self, view: &View, area: Rect, buf: &mut Buffer) {
        let draft = view.draft;
        let config = draft.to_config();

        let block = centered(area, 14);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // title
                Constraint::Length(1), // subtitle
                Constraint::Length(2),
                Constraint::Length(1), // rounds
                Constraint::Length(1),
                Constraint::Length(1), // minutes
                Constraint::Length(1),
                Constraint::Length(1), // break
                Constraint::Length(2),
                Constraint::Length(1), // estimate
                Constraint::Length(1),
                Constraint::Length(1), // legend
            ])
            .split(block);

        Paragraph::new(Span::styled("DEV ROULETTE", bold().fg(ACCENT)))
            .alignment(Alignment::Center)
            .render(chunks[0], buf);
        Paragraph::new(Span::styled("speed networking for developers", dim()))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);

        let rounds = Line::from(vec![
            Span::styled(format!("{:<24}", "Rounds"), dim()),
            Span::styled("◀ ", Style::default().fg(ACCENT)),
            Span::styled(format!("{:>2}", draft.rounds), bold()),
            Span::styled(" ▶", Style::default().fg(ACCENT)),
        ]);
        Paragraph::new(rounds)
            .alignment(Alignment::Center)
            .render(chunks[3], buf);

        Paragraph::new(menu_line(
            "Minutes per round",
            &ROUND_MINUTES_MENU,
            draft.round_minutes,
            "",
        ))
        .alignment(Alignment::Center)
        .render(chunks[5], buf);

        Paragraph::new(menu_line(
            "Break between rounds",
            &BREAK_SECS_MENU,
            draft.break_secs,
            "s",
        ))
        .alignment(Alignment::Center)
        .render(chunks[7], buf);

        Paragraph::new(Span::styled(
            format!("Total time: ~{} min", config.estimated_total_minutes()),
            dim(),
        ))
        .alignment(Alignment::Center)
        .render(chunks[9], buf);

        legend(
            "(↑/↓) rounds  (←/→) minutes  ([/]) break  (enter) start event  (o) cork devs  (q)uit",
            chunks[11],
            buf,
        );
    }
}

pub struct RoundScreen;

impl RoundScreen {
    fn progress_dots(current: u32, total: u32) -> Line<'static> {
        let spans = (1..=total)
            .map(|i| {
                if i < current {
                    Span::styled("●", Style::default().fg(ACCENT))
                } else if i == current {
                    Span::styled("●", bold().fg(Color::LightYellow))
                } else {
                    Span::styled("○", dim())
                }
            })
            .interleave_shortest(std::iter::repeat(Span::raw(" ")).take(total.saturating_sub(1) as usize))
            .collect::<Vec<_>>();
        Line::from(spans)
    }
}

impl Screen for RoundScreen {
    fn render(&self, view: &View, area: Rect, buf: &mut Buffer) {
        let snap = view.snapshot;
        let state = &snap.state;
        let total = snap.total_rounds();
        let urgency = Urgency::of(state.time_remaining_secs);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .vertical_margin(1)
            .constraints([
                Constraint::Length(1), // round indicator
                Constraint::Length(1), // dots
                Constraint::Min(1),    // body
                Constraint::Length(1), // legend
            ])
            .split(area);

        Paragraph::new(Span::styled(
            format!("Round {} of {}", state.current_round, total),
            dim(),
        ))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);
        Paragraph::new(Self::progress_dots(state.current_round, total))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);

        let body = chunks[2];
        let paused_line = if state.paused {
            Line::from(Span::styled(
                "PAUSED",
                bold().fg(Color::Yellow).add_modifier(Modifier::SLOW_BLINK),
            ))
        } else {
            Line::default()
        };

        if urgency == Urgency::Calm {
            let block = centered(body, 10);
            let parts = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(1), // heading
                    Constraint::Length(4), // prompt
                    Constraint::Length(1),
                    Constraint::Length(1), // time
                    Constraint::Length(1), // gauge
                    Constraint::Length(1),
                    Constraint::Length(1), // paused
                ])
                .split(block);

            Paragraph::new(Span::styled("TALK ABOUT THIS", bold().fg(ACCENT)))
                .alignment(Alignment::Center)
                .render(parts[0], buf);

            let prompt = snap.active_prompt().unwrap_or("Introduce yourself!");
            Paragraph::new(Span::styled(prompt.to_owned(), bold().fg(Color::White)))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .render(parts[1], buf);

            Paragraph::new(Span::styled(format_time(state.time_remaining_secs), dim()))
                .alignment(Alignment::Center)
                .render(parts[3], buf);

            let gauge_area = Rect {
                x: parts[4].x + parts[4].width / 4,
                width: parts[4].width / 2,
                ..parts[4]
            };
            Gauge::default()
                .gauge_style(Style::default().fg(ACCENT).bg(Color::Black))
                .ratio(snap.round_progress().clamp(0.0, 1.0))
                .label("")
                .render(gauge_area, buf);

            Paragraph::new(paused_line)
                .alignment(Alignment::Center)
                .render(parts[6], buf);
        } else {
            let lines = digits::big_lines(&state.time_remaining_secs.to_string());
            let style = bold().fg(urgency.color());
            let block = centered(body, digits::big_height() + 2);

            let mut text: Vec<Line> = if (digits::big_width(&lines) as u16) <= block.width {
                lines
                    .into_iter()
                    .map(|l| Line::from(Span::styled(l, style)))
                    .collect()
            } else {
                vec![Line::from(Span::styled(
                    format_time(state.time_remaining_secs),
                    style,
                ))]
            };
            text.push(Line::default());
            text.push(paused_line);

            Paragraph::new(text)
                .alignment(Alignment::Center)
                .render(block, buf);
        }

        legend(
            "(space) pause/resume  (s)kip round  (x) end event  (q)uit",
            chunks[3],
            buf,
        );
    }
}

pub struct SwitchScreen;

impl Screen for SwitchScreen {
    fn render(&self, view: &View, area: Rect, buf: &mut Buffer) {
        let snap = view.snapshot;
        let text = vec![
            Line::from(Span::styled("SWITCH!", bold().fg(ACCENT))),
            Line::default(),
            Line::from(Span::styled("MOVE TO YOUR NEXT CONVERSATION", dim())),
            Line::default(),
            Line::from(Span::styled(
                format!(
                    "Next: Round {} of {}",
                    snap.state.current_round + 1,
                    snap.total_rounds()
                ),
                Style::default().fg(Color::Gray),
            )),
        ];
        let height = text.len() as u16;
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .render(centered(area, height), buf);

        let legend_area = Rect {
            y: area.y + area.height.saturating_sub(1),
            height: 1.min(area.height),
            ..area
        };
        legend("(x) end event  (q)uit", legend_area, buf);
    }
}

pub struct DoneScreen;

impl Screen for DoneScreen {
    fn render(&self, view: &View, area: Rect, buf: &mut Buffer) {
        let mut text = vec![
            Line::from(Span::styled("That's a wrap!", bold().fg(ACCENT))),
            Line::default(),
            Line::from(Span::styled(
                format!("{} rounds completed", view.snapshot.total_rounds()),
                Style::default().fg(Color::Gray),
            )),
            Line::from(Span::styled("Now go ship something together", dim())),
        ];
        if let Some(at) = view.finished_at {
            text.push(Line::from(Span::styled(
                format!("Finished at {}", at.format("%H:%M")),
                dim(),
            )));
        }
        text.push(Line::default());
        text.push(Line::from(Span::styled(
            "(enter) start new event  (o) cork devs  (q)uit",
            dim().add_modifier(Modifier::ITALIC),
        )));

        let height = text.len() as u16;
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .render(centered(area, height), buf);
    }
}

/// Helper to construct the screen for the current phase
pub fn current_screen(phase: Phase) -> Box<dyn Screen> {
    match phase {
        Phase::Setup => Box::new(SetupScreen),
        Phase::Round => Box::new(RoundScreen),
        Phase::Switch => Box::new(SwitchScreen),
        Phase::Done => Box::new(DoneScreen),
    }
}
