//! Wall-clock playback.
//!
//! The engine has no timers. A UI drives it by calling [`PlaybackClock::tick`]
//! at its frame cadence and feeding the returned time to
//! [`Session::advance_to`](crate::Session::advance_to).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use rotation_core::Millis;

use crate::error::{Result, RuntimeError};

/// How the cursor moves after an action is placed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickMode {
    /// Play until the slot is free again, then stop.
    #[default]
    RealTimeAutoPause,
    /// Keep playing until paused.
    RealTime,
    /// Jump straight to the next free moment.
    Manual,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaybackClock {
    tick_mode: TickMode,
    /// Combat milliseconds per wall-clock millisecond.
    time_scale: f64,
    running: bool,
    pause_at: Option<Millis>,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self {
            tick_mode: TickMode::default(),
            time_scale: 2.0,
            running: false,
            pause_at: None,
        }
    }
}

impl PlaybackClock {
    pub fn new(tick_mode: TickMode, time_scale: f64) -> Result<Self> {
        if !time_scale.is_finite() || time_scale <= 0.0 {
            return Err(RuntimeError::InvalidTimeScale(time_scale));
        }
        Ok(Self {
            tick_mode,
            time_scale,
            ..Self::default()
        })
    }

    pub fn tick_mode(&self) -> TickMode {
        self.tick_mode
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn play(&mut self) {
        self.running = true;
        self.pause_at = None;
    }

    pub fn pause(&mut self) {
        self.running = false;
        self.pause_at = None;
    }

    /// Reacts to a newly placed action.
    ///
    /// Returns a time to advance to immediately, which only manual mode does.
    pub fn after_action(&mut self, cursor: Millis, next_free: Millis) -> Option<Millis> {
        match self.tick_mode {
            TickMode::Manual => {
                self.running = false;
                (next_free > cursor).then_some(next_free)
            }
            TickMode::RealTimeAutoPause => {
                if next_free > cursor {
                    self.running = true;
                    self.pause_at = Some(next_free);
                }
                None
            }
            TickMode::RealTime => {
                self.running = true;
                None
            }
        }
    }

    /// Converts elapsed wall time into the time to advance to.
    ///
    /// Returns `None` while paused. Auto-pause stops exactly at the free
    /// moment even if the frame overshoots it.
    pub fn tick(&mut self, cursor: Millis, wall: Duration) -> Option<Millis> {
        if !self.running {
            return None;
        }
        let scaled = (wall.as_secs_f64() * 1000.0 * self.time_scale).round() as i64;
        let mut target = cursor + Millis(scaled);
        if let Some(pause_at) = self.pause_at {
            if target >= pause_at {
                target = pause_at;
                self.pause();
                tracing::trace!("Playback paused at {}", target);
            }
        }
        Some(target)
    }
}
