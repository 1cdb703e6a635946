//! The session state machine: Setup → Round ⇄ Switch → Done.
//!
//! All transitions happen either from a user action (`start`, `pause`,
//! `resume`, `skip`, `restart`) or from [`Session::pulse`], the one-second
//! clock. At most one timer is live at a time (the countdown while a round
//! runs unpaused, the break while switching) and its token is kept in
//! `self.timer`; anything that fires with a different token is stale and is
//! dropped.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::config::SessionConfig;
use crate::cue::CuePlayer;
use crate::error::StartError;
use crate::prompts;
use crate::timer::{TimerKind, TimerToken, Timers};

/// Remaining seconds that get a countdown tick
pub const TICK_WINDOW_SECS: std::ops::RangeInclusive<u32> = 1..=5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
pub enum Phase {
    #[default]
    Setup,
    Round,
    Switch,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionState {
    pub phase: Phase,
    pub current_round: u32,
    pub time_remaining_secs: u32,
    pub paused: bool,
    pub prompt_sequence: Vec<String>,
}

impl SessionState {
    /// Prompt for the current round. With fewer prompts than rounds the
    /// sequence wraps around.
    pub fn active_prompt(&self) -> Option<&str> {
        if self.prompt_sequence.is_empty() || self.current_round == 0 {
            return None;
        }
        let idx = (self.current_round as usize - 1) % self.prompt_sequence.len();
        Some(self.prompt_sequence[idx].as_str())
    }
}

/// Read-only copy of the session handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    pub state: SessionState,
    pub config: Option<SessionConfig>,
}

impl Snapshot {
    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn total_rounds(&self) -> u32 {
        self.config.map_or(0, |c| c.rounds)
    }

    pub fn active_prompt(&self) -> Option<&str> {
        self.state.active_prompt()
    }

    /// Fraction of the current round already spent, in [0, 1]
    pub fn round_progress(&self) -> f64 {
        match self.config {
            Some(cfg) if cfg.round_duration_secs > 0 => {
                let spent = cfg
                    .round_duration_secs
                    .saturating_sub(self.state.time_remaining_secs);
                f64::from(spent) / f64::from(cfg.round_duration_secs)
            }
            _ => 0.0,
        }
    }
}

pub struct Session<P: CuePlayer> {
    cues: P,
    catalog: Vec<String>,
    rng: StdRng,
    config: Option<SessionConfig>,
    state: SessionState,
    timers: Timers,
    timer: Option<TimerToken>,
    last_tick: Option<(u32, u32)>,
}

impl<P: CuePlayer> Session<P> {
    pub fn new(cues: P, catalog: Vec<String>) -> Self {
        Self::with_rng(cues, catalog, StdRng::from_entropy())
    }

    /// Fixed randomness for reproducible prompt order
    pub fn with_rng(cues: P, catalog: Vec<String>, rng: StdRng) -> Self {
        Self {
            cues,
            catalog,
            rng,
            config: None,
            state: SessionState::default(),
            timers: Timers::new(),
            timer: None,
            last_tick: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn config(&self) -> Option<&SessionConfig> {
        self.config.as_ref()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state.clone(),
            config: self.config,
        }
    }

    pub fn active_prompt(&self) -> Option<&str> {
        self.state.active_prompt()
    }

    /// Token of the live timer, if any. Changes whenever a timer is armed.
    pub fn timer_token(&self) -> Option<TimerToken> {
        self.timer
    }

    pub fn cue_player(&self) -> &P {
        &self.cues
    }

    pub fn cue_player_mut(&mut self) -> &mut P {
        &mut self.cues
    }

    pub fn unlock_cues(&mut self) {
        self.cues.unlock();
    }

    /// Leaves Setup and starts round one. Either applies completely or, on
    /// error, leaves the session untouched.
    pub fn start(&mut self, config: SessionConfig) -> Result<(), StartError> {
        if self.state.phase != Phase::Setup {
            return Err(StartError::NotInSetup(self.state.phase));
        }
        config.validate()?;

        let prompt_sequence = prompts::select(&self.catalog, config.rounds as usize, &mut self.rng);
        if prompt_sequence.len() < config.rounds as usize {
            debug!(
                prompts = prompt_sequence.len(),
                rounds = config.rounds,
                "fewer prompts than rounds, prompts will repeat"
            );
        }

        self.clear_timers();
        self.config = Some(config);
        self.state = SessionState {
            phase: Phase::Round,
            current_round: 1,
            time_remaining_secs: config.round_duration_secs,
            paused: false,
            prompt_sequence,
        };
        self.last_tick = None;

        info!(
            rounds = config.rounds,
            round_secs = config.round_duration_secs,
            break_secs = config.break_duration_secs,
            "session started"
        );
        self.cues.play_start_signal();
        self.arm_countdown();
        Ok(())
    }

    pub fn pause(&mut self) {
        if self.state.phase != Phase::Round || self.state.paused {
            debug!(phase = %self.state.phase, paused = self.state.paused, "pause ignored");
            return;
        }
        self.clear_timers();
        self.state.paused = true;
        info!(
            round = self.state.current_round,
            remaining = self.state.time_remaining_secs,
            "round paused"
        );
    }

    pub fn resume(&mut self) {
        if self.state.phase != Phase::Round || !self.state.paused {
            debug!(phase = %self.state.phase, paused = self.state.paused, "resume ignored");
            return;
        }
        self.state.paused = false;
        info!(
            round = self.state.current_round,
            remaining = self.state.time_remaining_secs,
            "round resumed"
        );
        self.arm_countdown();
    }

    /// Ends the current round now, exactly as if its time had run out.
    pub fn skip(&mut self) {
        if self.state.phase != Phase::Round {
            debug!(phase = %self.state.phase, "skip ignored");
            return;
        }
        info!(
            round = self.state.current_round,
            remaining = self.state.time_remaining_secs,
            "round skipped"
        );
        self.end_round();
    }

    /// Back to Setup from anywhere. Pending timers are cancelled first.
    pub fn restart(&mut self) {
        self.clear_timers();
        self.config = None;
        self.state = SessionState::default();
        self.last_tick = None;
        info!("session reset to setup");
    }

    /// One second of clock time.
    pub fn pulse(&mut self) {
        for token in self.timers.pulse() {
            self.on_timer(token);
        }
    }

    fn on_timer(&mut self, token: TimerToken) {
        if self.timer != Some(token) {
            debug!(kind = %token.kind, generation = token.generation, "stale timer dropped");
            return;
        }
        match token.kind {
            TimerKind::Countdown => self.count_down(),
            TimerKind::Break => {
                self.timer = None;
                self.begin_next_round();
            }
        }
    }

    fn count_down(&mut self) {
        if self.state.phase != Phase::Round
            || self.state.paused
            || self.state.time_remaining_secs == 0
        {
            return;
        }

        self.state.time_remaining_secs -= 1;
        let remaining = self.state.time_remaining_secs;

        let boundary = (self.state.current_round, remaining);
        if TICK_WINDOW_SECS.contains(&remaining) && self.last_tick != Some(boundary) {
            self.last_tick = Some(boundary);
            self.cues.play_tick();
        }

        if remaining == 0 {
            self.end_round();
        }
    }

    fn end_round(&mut self) {
        let Some(config) = self.config else {
            return;
        };
        self.clear_timers();
        self.cues.play_end_signal();

        if self.state.current_round < config.rounds {
            self.state.phase = Phase::Switch;
            self.state.paused = false;
            let token = self
                .timers
                .once_after(TimerKind::Break, config.break_duration_secs);
            self.timer = Some(token);
            info!(
                finished = self.state.current_round,
                next = self.state.current_round + 1,
                "switching partners"
            );
        } else {
            self.state.phase = Phase::Done;
            self.state.paused = false;
            info!(rounds = config.rounds, "session complete");
        }
    }

    fn begin_next_round(&mut self) {
        let Some(config) = self.config else {
            return;
        };
        if self.state.phase != Phase::Switch {
            return;
        }
        self.state.current_round += 1;
        self.state.time_remaining_secs = config.round_duration_secs;
        self.state.paused = false;
        self.state.phase = Phase::Round;
        info!(round = self.state.current_round, "round started");
        self.arm_countdown();
    }

    fn arm_countdown(&mut self) {
        self.clear_timers();
        self.timer = Some(self.timers.every_pulse(TimerKind::Countdown));
    }

    fn clear_timers(&mut self) {
        self.timers.cancel_all();
        self.timer = None;
    }
}

impl<P: CuePlayer + std::fmt::Debug> std::fmt::Debug for Session<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("cues", &self.cues)
            .field("config", &self.config)
            .field("state", &self.state)
            .field("timer", &self.timer)
            .finish_non_exhaustive()
    }
}
