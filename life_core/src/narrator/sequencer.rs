//! Passage sequencer - plays composed passages one after another.
//!
//! Each passage fades in, holds for its display time, then fades out before
//! the next one starts. Time is fed in by the caller; leftover time from one
//! stage carries into the next, so a single large tick may cross several
//! stages or passages.

use life_rules::NarratorConfig;
use serde::Serialize;

use super::Passage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SequencerState {
    Idle,
    FadingIn,
    Holding,
    FadingOut,
    Done,
}

#[derive(Debug, Clone)]
pub struct PassageSequencer {
    passages: Vec<Passage>,
    index: usize,
    state: SequencerState,
    /// Seconds spent in the current state.
    elapsed: f32,
    fade_in: f32,
    fade_out: f32,
}

impl PassageSequencer {
    pub fn new(passages: Vec<Passage>, config: &NarratorConfig) -> Self {
        Self {
            passages,
            index: 0,
            state: SequencerState::Idle,
            elapsed: 0.0,
            fade_in: config.fade_in_seconds.max(0.0),
            fade_out: config.fade_out_seconds.max(0.0),
        }
    }

    /// Begin playback. An empty sequence finishes immediately.
    pub fn start(&mut self) {
        if self.state != SequencerState::Idle {
            return;
        }
        self.elapsed = 0.0;
        self.state = if self.passages.is_empty() {
            SequencerState::Done
        } else {
            SequencerState::FadingIn
        };
    }

    pub fn tick(&mut self, real_seconds: f32) {
        if !real_seconds.is_finite() {
            return;
        }
        let mut remaining = real_seconds.max(0.0);

        while remaining > 0.0 {
            let stage_length = match self.state {
                SequencerState::Idle | SequencerState::Done => break,
                SequencerState::FadingIn => self.fade_in,
                SequencerState::Holding => self
                    .passages
                    .get(self.index)
                    .map_or(0.0, |p| p.display_seconds.max(0.0)),
                SequencerState::FadingOut => self.fade_out,
            };

            let left = stage_length - self.elapsed;
            if remaining < left {
                self.elapsed += remaining;
                return;
            }
            remaining -= left.max(0.0);
            self.elapsed = 0.0;
            self.advance_state();
        }
    }

    fn advance_state(&mut self) {
        self.state = match self.state {
            SequencerState::FadingIn => SequencerState::Holding,
            SequencerState::Holding => SequencerState::FadingOut,
            SequencerState::FadingOut => {
                self.index += 1;
                if self.index < self.passages.len() {
                    SequencerState::FadingIn
                } else {
                    SequencerState::Done
                }
            }
            other => other,
        };
    }

    /// Passage currently on screen, if any.
    pub fn current(&self) -> Option<&Passage> {
        match self.state {
            SequencerState::FadingIn | SequencerState::Holding | SequencerState::FadingOut => {
                self.passages.get(self.index)
            }
            SequencerState::Idle | SequencerState::Done => None,
        }
    }

    /// Opacity of the current passage in `[0, 1]`.
    pub fn opacity(&self) -> f32 {
        match self.state {
            SequencerState::FadingIn if self.fade_in > 0.0 => {
                (self.elapsed / self.fade_in).min(1.0)
            }
            SequencerState::FadingIn | SequencerState::Holding => 1.0,
            SequencerState::FadingOut if self.fade_out > 0.0 => {
                (1.0 - self.elapsed / self.fade_out).max(0.0)
            }
            _ => 0.0,
        }
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == SequencerState::Done
    }

    /// Seconds the whole sequence takes to play.
    pub fn total_duration(&self) -> f32 {
        self.passages
            .iter()
            .map(|p| self.fade_in + p.display_seconds.max(0.0) + self.fade_out)
            .sum()
    }
}
