//! Status message rotation
//!
//! While a generation is in flight the loading view cycles through
//! [`LOADING_MESSAGES`](crate::labels::LOADING_MESSAGES). [`StatusRotation`]
//! is the timer for that cycle. It is owned by
//! [`InteractionState::Loading`](crate::InteractionState::Loading), so it is
//! created on entering Loading and dropped on every exit; there is nothing
//! left to tick afterwards.

use std::time::Duration;

use tokio::time::Instant;

use crate::labels::LOADING_MESSAGES;

/// Time each status message stays on screen
pub const STATUS_ROTATION_INTERVAL: Duration = Duration::from_millis(2500);

/// Deadline-driven cycle over a fixed message list
#[derive(Debug)]
pub struct StatusRotation {
    messages: &'static [&'static str],
    index: usize,
    next_tick: Instant,
    interval: Duration,
}

impl StatusRotation {
    /// Start rotating through the loading messages at `now`
    #[must_use]
    pub fn start(now: Instant) -> Self {
        Self::with_messages(LOADING_MESSAGES, STATUS_ROTATION_INTERVAL, now)
    }

    /// Start rotating through a custom list
    ///
    /// An empty list never advances.
    #[must_use]
    pub fn with_messages(
        messages: &'static [&'static str],
        interval: Duration,
        now: Instant,
    ) -> Self {
        Self {
            messages,
            index: 0,
            next_tick: now + interval,
            interval,
        }
    }

    /// Current position in the list
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Current message
    #[must_use]
    pub fn message(&self) -> &'static str {
        self.messages.get(self.index).copied().unwrap_or("")
    }

    /// When the next advance is due
    #[must_use]
    pub fn next_tick(&self) -> Instant {
        self.next_tick
    }

    /// Advance for every interval that has elapsed by `now`
    ///
    /// Returns `true` if at least one interval elapsed.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.messages.is_empty() {
            return false;
        }
        let mut ticked = false;
        while now >= self.next_tick {
            self.index = (self.index + 1) % self.messages.len();
            self.next_tick += self.interval;
            ticked = true;
        }
        ticked
    }
}
