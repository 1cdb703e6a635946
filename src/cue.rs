//! Audio cues marking timer events.
//!
//! The session only ever talks to a [`CuePlayer`], whose methods cannot fail.
//! Real output goes through a [`CueBackend`] wrapped in [`GuardedCuePlayer`],
//! which logs backend failures and carries on: a broken speaker must never
//! stall the countdown.

use std::io::{self, Write};

use crate::error::CueError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Cue {
    /// Final-seconds countdown tick
    Tick,
    /// Round is over
    EndSignal,
    /// Event has started
    StartSignal,
}

pub trait CuePlayer {
    /// Called from every user gesture. Repeated calls are harmless.
    fn unlock(&mut self);

    fn play(&mut self, cue: Cue);

    fn play_tick(&mut self) {
        self.play(Cue::Tick);
    }

    fn play_end_signal(&mut self) {
        self.play(Cue::EndSignal);
    }

    fn play_start_signal(&mut self) {
        self.play(Cue::StartSignal);
    }
}

impl<P: CuePlayer + ?Sized> CuePlayer for Box<P> {
    fn unlock(&mut self) {
        (**self).unlock();
    }

    fn play(&mut self, cue: Cue) {
        (**self).play(cue);
    }
}

/// Fallible sound output
pub trait CueBackend {
    fn unlock(&mut self) -> Result<(), CueError>;
    fn emit(&mut self, cue: Cue) -> Result<(), CueError>;
    fn backend_name(&self) -> &'static str;
}

/// Adapts a [`CueBackend`] to the infallible [`CuePlayer`] interface.
///
/// Playing before an explicit unlock unlocks on the spot; if that fails the
/// cue is dropped.
#[derive(Debug)]
pub struct GuardedCuePlayer<B: CueBackend> {
    backend: B,
    unlocked: bool,
}

impl<B: CueBackend> GuardedCuePlayer<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            unlocked: false,
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn ensure_unlocked(&mut self) -> bool {
        if self.unlocked {
            return true;
        }
        match self.backend.unlock() {
            Ok(()) => {
                tracing::debug!(backend = self.backend.backend_name(), "cue output unlocked");
                self.unlocked = true;
            }
            Err(err) => {
                tracing::warn!(backend = self.backend.backend_name(), %err, "cue unlock failed");
            }
        }
        self.unlocked
    }
}

impl<B: CueBackend> CuePlayer for GuardedCuePlayer<B> {
    fn unlock(&mut self) {
        self.ensure_unlocked();
    }

    fn play(&mut self, cue: Cue) {
        if !self.ensure_unlocked() {
            return;
        }
        if let Err(err) = self.backend.emit(cue) {
            tracing::warn!(backend = self.backend.backend_name(), %cue, %err, "cue playback failed");
        }
    }
}

/// Rings the terminal bell: once for a tick, twice for the start signal,
/// three times for the end-of-round signal.
#[derive(Debug)]
pub struct TerminalBell<W: Write> {
    out: W,
}

impl TerminalBell<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalBell<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn bells(cue: Cue) -> &'static [u8] {
        match cue {
            Cue::Tick => b"\x07",
            Cue::StartSignal => b"\x07\x07",
            Cue::EndSignal => b"\x07\x07\x07",
        }
    }
}

impl<W: Write> CueBackend for TerminalBell<W> {
    fn unlock(&mut self) -> Result<(), CueError> {
        self.out.flush()?;
        Ok(())
    }

    fn emit(&mut self, cue: Cue) -> Result<(), CueError> {
        self.out.write_all(Self::bells(cue))?;
        self.out.flush()?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "terminal-bell"
    }
}

/// Backend for `--mute`
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl CueBackend for Silent {
    fn unlock(&mut self) -> Result<(), CueError> {
        Ok(())
    }

    fn emit(&mut self, _cue: Cue) -> Result<(), CueError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "silent"
    }
}

/// Remembers every cue it is asked to play. Used by tests and headless runs.
#[derive(Debug, Default, Clone)]
pub struct RecordingCuePlayer {
    pub played: Vec<Cue>,
    pub unlocks: usize,
}

impl RecordingCuePlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, cue: Cue) -> usize {
        self.played.iter().filter(|&&c| c == cue).count()
    }
}

impl CuePlayer for RecordingCuePlayer {
    fn unlock(&mut self) {
        self.unlocks += 1;
    }

    fn play(&mut self, cue: Cue) {
        self.played.push(cue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenSpeaker {
        unlock_fails: bool,
        emits: usize,
    }

    impl CueBackend for BrokenSpeaker {
        fn unlock(&mut self) -> Result<(), CueError> {
            if self.unlock_fails {
                Err(CueError::Unavailable("no device".into()))
            } else {
                Ok(())
            }
        }

        fn emit(&mut self, _cue: Cue) -> Result<(), CueError> {
            self.emits += 1;
            Err(CueError::Io(io::Error::new(io::ErrorKind::BrokenPipe, "gone")))
        }

        fn backend_name(&self) -> &'static str {
            "broken"
        }
    }

    #[test]
    fn bell_writes_one_two_three_bells() {
        let mut player = GuardedCuePlayer::new(TerminalBell::new(Vec::new()));
        player.unlock();
        player.play_tick();
        player.play_start_signal();
        player.play_end_signal();
        assert_eq!(player.backend().out, b"\x07\x07\x07\x07\x07\x07".to_vec());
    }

    #[test]
    fn play_before_unlock_unlocks_lazily() {
        let mut player = GuardedCuePlayer::new(TerminalBell::new(Vec::new()));
        assert!(!player.is_unlocked());
        player.play_tick();
        assert!(player.is_unlocked());
        assert_eq!(player.backend().out, b"\x07".to_vec());
    }

    #[test]
    fn unlock_is_idempotent() {
        let mut player = GuardedCuePlayer::new(Silent);
        player.unlock();
        player.unlock();
        assert!(player.is_unlocked());
    }

    #[test]
    fn emit_failures_are_swallowed() {
        let mut player = GuardedCuePlayer::new(BrokenSpeaker {
            unlock_fails: false,
            emits: 0,
        });
        player.play_end_signal();
        player.play_end_signal();
        assert_eq!(player.backend().emits, 2);
    }

    #[test]
    fn failed_unlock_drops_cues() {
        let mut player = GuardedCuePlayer::new(BrokenSpeaker {
            unlock_fails: true,
            emits: 0,
        });
        player.unlock();
        player.play_tick();
        assert!(!player.is_unlocked());
        assert_eq!(player.backend().emits, 0);
    }

    #[test]
    fn boxed_player_forwards() {
        let mut boxed: Box<dyn CuePlayer> = Box::new(RecordingCuePlayer::new());
        boxed.unlock();
        boxed.play_tick();
        boxed.play_end_signal();
    }

    #[test]
    fn recording_player_counts_cues() {
        let mut rec = RecordingCuePlayer::new();
        rec.play_tick();
        rec.play_tick();
        rec.play_end_signal();
        assert_eq!(rec.count(Cue::Tick), 2);
        assert_eq!(rec.count(Cue::EndSignal), 1);
        assert_eq!(rec.count(Cue::StartSignal), 0);
    }
}
