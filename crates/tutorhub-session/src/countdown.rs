//! A cancellable second-by-second countdown.
//!
//! The countdown itself never sleeps; an owner advances it with
//! [`Countdown::tick`] and decides what a finished countdown means.

/// Result of advancing a countdown by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The countdown is not running; nothing changed.
    Idle,
    /// Still running with this many seconds left.
    Remaining(u32),
    /// Reached zero on this tick and stopped.
    Finished,
}

/// Countdown state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    start_at: u32,
    remaining: u32,
    running: bool,
}

impl Countdown {
    /// Creates a stopped countdown that starts from `start_at` seconds.
    #[must_use]
    pub const fn new(start_at: u32) -> Self {
        Self {
            start_at,
            remaining: start_at,
            running: false,
        }
    }

    /// (Re)starts from the configured value.
    pub fn start(&mut self) {
        self.remaining = self.start_at;
        self.running = self.start_at > 0;
    }

    /// Stops without resetting the remaining seconds.
    pub fn cancel(&mut self) {
        self.running = false;
    }

    /// Stops and resets to the configured value.
    pub fn reset(&mut self) {
        self.running = false;
        self.remaining = self.start_at;
    }

    /// Advances by one second.
    pub fn tick(&mut self) -> Tick {
        if !self.running {
            return Tick::Idle;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.running = false;
            Tick::Finished
        } else {
            Tick::Remaining(self.remaining)
        }
    }

    /// Seconds left.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Whether the countdown is running.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }
}
