use std::time::Duration;

use crate::camera::Capture;
use crate::frame::{ChannelOrder, Frame};
use crate::state::AppState;

/// Host timer interval between preview ticks (~66 Hz).
pub const PREVIEW_INTERVAL: Duration = Duration::from_millis(15);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickState {
    Scheduled,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A frame was drawn; next tick armed.
    Rendered,
    /// Read miss; nothing drawn, next tick still armed.
    Skipped,
    /// The running flag was down. Terminal.
    Stopped,
}

/// Self-rescheduling preview tick. Once stopped it never runs again.
pub struct Preview {
    state: TickState,
    interval: Duration,
}

impl Default for Preview {
    fn default() -> Self {
        Self::new(PREVIEW_INTERVAL)
    }
}

impl Preview {
    pub fn new(interval: Duration) -> Self {
        Self {
            state: TickState::Scheduled,
            interval,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> TickState {
        self.state
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Delay until the next tick, or `None` once stopped.
    pub fn next_tick(&self) -> Option<Duration> {
        match self.state {
            TickState::Scheduled => Some(self.interval),
            TickState::Stopped => None,
        }
    }

    /// Runs one tick: reads a frame, converts it to display order and hands
    /// it to `render`.
    pub fn tick<R>(&mut self, app: &AppState, capture: &mut Capture, render: R) -> TickOutcome
    where
        R: FnOnce(&Frame),
    {
        if self.state == TickState::Stopped || !app.is_running() {
            self.state = TickState::Stopped;
            return TickOutcome::Stopped;
        }

        match capture.read_frame() {
            Ok(frame) => {
                render(&frame.to_order(ChannelOrder::Rgb));
                TickOutcome::Rendered
            }
            Err(e) => {
                log::debug!("Preview tick skipped: {}", e);
                TickOutcome::Skipped
            }
        }
    }
}
