use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use webbrowser::Browser;

use crate::config::SetupDraft;
use crate::cue::CuePlayer;
use crate::runtime::AppEvent;
use crate::session::{Phase, Session};

pub const ORGANISER_URL: &str = "http://www.meetup.com/corkdevs";

/// What the event loop should do after an event was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// A user action armed a new timer; the clock cadence restarts from now.
    Realign,
    Quit,
}

#[derive(Debug)]
pub struct App<P: CuePlayer = Box<dyn CuePlayer>> {
    pub draft: SetupDraft,
    pub session: Session<P>,
    pub finished_at: Option<DateTime<Local>>,
}

impl<P: CuePlayer> App<P> {
    pub fn new(draft: SetupDraft, session: Session<P>) -> Self {
        Self {
            draft,
            session,
            finished_at: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    pub fn handle_event(&mut self, event: AppEvent) -> Flow {
        match event {
            AppEvent::Pulse => {
                self.on_pulse();
                Flow::Continue
            }
            AppEvent::Resize => Flow::Continue,
            AppEvent::Key(key) => self.on_key(key),
        }
    }

    pub fn on_pulse(&mut self) {
        let before = self.session.phase();
        self.session.pulse();
        if before != Phase::Done && self.session.phase() == Phase::Done {
            self.finished_at = Some(Local::now());
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Flow {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Flow::Quit;
        }

        // every key press is a user gesture
        self.session.unlock_cues();

        let timer_before = self.session.timer_token();
        let phase_before = self.session.phase();

        match (phase_before, key.code) {
            (_, KeyCode::Char('q')) => return Flow::Quit,
            (Phase::Setup | Phase::Done, KeyCode::Esc) => return Flow::Quit,
            (Phase::Setup | Phase::Done, KeyCode::Char('o')) => open_organiser_page(),

            (Phase::Setup, KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('+')) => {
                self.draft.increment_rounds()
            }
            (Phase::Setup, KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('-')) => {
                self.draft.decrement_rounds()
            }
            (Phase::Setup, KeyCode::Right | KeyCode::Char('l')) => self.draft.next_round_minutes(),
            (Phase::Setup, KeyCode::Left | KeyCode::Char('h')) => self.draft.prev_round_minutes(),
            (Phase::Setup, KeyCode::Char(']')) => self.draft.next_break_secs(),
            (Phase::Setup, KeyCode::Char('[')) => self.draft.prev_break_secs(),
            (Phase::Setup, KeyCode::Enter | KeyCode::Char(' ')) => self.start(),

            (Phase::Round, KeyCode::Char(' ') | KeyCode::Char('p')) => {
                if self.session.state().paused {
                    self.session.resume();
                } else {
                    self.session.pause();
                }
            }
            (Phase::Round, KeyCode::Char('s') | KeyCode::Char('n')) => self.session.skip(),

            (Phase::Done, KeyCode::Enter | KeyCode::Char('r')) => self.restart(),
            (Phase::Round | Phase::Switch | Phase::Done, KeyCode::Char('x')) => self.restart(),
            _ => {}
        }

        match self.session.timer_token() {
            Some(token) if Some(token) != timer_before => Flow::Realign,
            _ => Flow::Continue,
        }
    }

    fn start(&mut self) {
        let config = self.draft.to_config();
        match self.session.start(config) {
            Ok(()) => self.finished_at = None,
            Err(err) => tracing::warn!(%err, "could not start session"),
        }
    }

    fn restart(&mut self) {
        self.session.restart();
        self.finished_at = None;
    }
}

fn open_organiser_page() {
    if Browser::is_available() {
        if let Err(err) = webbrowser::open(ORGANISER_URL) {
            tracing::warn!(%err, "failed to open browser");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::cue::{Cue, RecordingCuePlayer};
    use crate::prompts::builtin_catalog;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn app_with(settings: Settings) -> App<RecordingCuePlayer> {
        let session = Session::with_rng(
            RecordingCuePlayer::new(),
            builtin_catalog(),
            StdRng::seed_from_u64(9),
        );
        App::new(SetupDraft::from_settings(&settings), session)
    }

    fn app() -> App<RecordingCuePlayer> {
        app_with(Settings::default())
    }

    fn press(app: &mut App<RecordingCuePlayer>, code: KeyCode) -> Flow {
        app.on_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn setup_keys_edit_draft() {
        let mut app = app();
        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Char(']'));
        assert_eq!(app.draft.rounds, 8);
        assert_eq!(app.draft.round_minutes, 7);
        assert_eq!(app.draft.break_secs, 45);
        assert_eq!(app.phase(), Phase::Setup);
    }

    #[test]
    fn enter_starts_session_and_realigns_clock() {
        let mut app = app();
        assert_eq!(press(&mut app, KeyCode::Enter), Flow::Realign);
        assert_eq!(app.phase(), Phase::Round);
        assert_eq!(app.session.state().time_remaining_secs, 300);
        assert_eq!(app.session.cue_player().unlocks, 1);
        assert_eq!(app.session.cue_player().played, vec![Cue::StartSignal]);
    }

    #[test]
    fn space_toggles_pause() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        assert_eq!(press(&mut app, KeyCode::Char(' ')), Flow::Continue);
        assert!(app.session.state().paused);
        assert_eq!(press(&mut app, KeyCode::Char(' ')), Flow::Realign);
        assert!(!app.session.state().paused);
    }

    #[test]
    fn skip_key_moves_to_switch() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        assert_eq!(press(&mut app, KeyCode::Char('s')), Flow::Realign);
        assert_eq!(app.phase(), Phase::Switch);
    }

    #[test]
    fn pulses_finish_session_and_stamp_time() {
        let mut app = app_with(Settings {
            rounds: 1,
            round_minutes: 1,
            ..Settings::default()
        });
        press(&mut app, KeyCode::Enter);
        for _ in 0..60 {
            app.handle_event(AppEvent::Pulse);
        }
        assert_eq!(app.phase(), Phase::Done);
        assert!(app.finished_at.is_some());

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.phase(), Phase::Setup);
        assert!(app.finished_at.is_none());
        assert_eq!(app.draft.rounds, 1);
    }

    #[test]
    fn restart_key_ends_event_from_switch() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(press(&mut app, KeyCode::Char('x')), Flow::Continue);
        assert_eq!(app.phase(), Phase::Setup);
        assert!(app.session.timer_token().is_none());
    }

    #[test]
    fn esc_only_quits_outside_a_running_event() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        assert_eq!(press(&mut app, KeyCode::Esc), Flow::Continue);
        assert_eq!(press(&mut app, KeyCode::Char('q')), Flow::Quit);

        let mut idle = self::app();
        assert_eq!(press(&mut idle, KeyCode::Esc), Flow::Quit);
    }

    #[test]
    fn ctrl_c_always_quits() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        let flow = app.on_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(flow, Flow::Quit);
    }

    #[test]
    fn round_keys_are_ignored_in_setup() {
        let mut app = app();
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Char('p'));
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.phase(), Phase::Setup);
        assert!(app.session.cue_player().played.is_empty());
    }
}
