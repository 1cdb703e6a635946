//! Cancellable timers driven by a one-second pulse.
//!
//! Every armed timer gets a fresh [`TimerToken`]. Owners keep the token of
//! the timer they expect and compare it against whatever fires, so a timer
//! that was replaced or cancelled can never act on newer state even if it
//! was already collected for delivery.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum TimerKind {
    Countdown,
    Break,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken {
    pub kind: TimerKind,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Schedule {
    EveryPulse,
    Once { pulses_left: u32 },
}

#[derive(Debug, Clone)]
struct Armed {
    token: TimerToken,
    schedule: Schedule,
}

#[derive(Debug, Default, Clone)]
pub struct Timers {
    generation: u64,
    armed: Vec<Armed>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generation of the most recently armed timer
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Fires on every pulse until cancelled.
    pub fn every_pulse(&mut self, kind: TimerKind) -> TimerToken {
        self.arm(kind, Schedule::EveryPulse)
    }

    /// Fires once, on the `pulses`-th pulse from now. Zero behaves like one.
    pub fn once_after(&mut self, kind: TimerKind, pulses: u32) -> TimerToken {
        self.arm(
            kind,
            Schedule::Once {
                pulses_left: pulses.max(1),
            },
        )
    }

    fn arm(&mut self, kind: TimerKind, schedule: Schedule) -> TimerToken {
        self.generation += 1;
        let token = TimerToken {
            kind,
            generation: self.generation,
        };
        self.armed.push(Armed { token, schedule });
        token
    }

    /// Returns whether the token was still armed.
    pub fn cancel(&mut self, token: TimerToken) -> bool {
        let before = self.armed.len();
        self.armed.retain(|a| a.token != token);
        before != self.armed.len()
    }

    pub fn cancel_all(&mut self) {
        self.armed.clear();
    }

    pub fn is_armed(&self, token: TimerToken) -> bool {
        self.armed.iter().any(|a| a.token == token)
    }

    pub fn armed_count(&self) -> usize {
        self.armed.len()
    }

    /// Advances every timer by one pulse and returns those that fired, in
    /// the order they were armed. One-shot timers are disarmed as they fire.
    pub fn pulse(&mut self) -> Vec<TimerToken> {
        let mut fired = Vec::new();
        self.armed.retain_mut(|armed| match &mut armed.schedule {
            Schedule::EveryPulse => {
                fired.push(armed.token);
                true
            }
            Schedule::Once { pulses_left } => {
                *pulses_left -= 1;
                if *pulses_left == 0 {
                    fired.push(armed.token);
                    false
                } else {
                    true
                }
            }
        });
        fired
    }
}
