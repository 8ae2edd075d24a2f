use std::time::Instant;

/// What a clock advance asks the game to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClockTick {
    /// A new decay interval was entered.
    pub decay: bool,
    /// The round ran out during this advance.
    pub expired: bool,
}

/// Round timer started by the first connection.
#[derive(Debug, Clone)]
pub struct RoundClock {
    started_at: Option<Instant>,
    elapsed_secs: u64,
    active: bool,
    /// Index of the last decay interval that has fired (interval 0 never fires).
    last_decay_interval: u64,
    duration_secs: u64,
    decay_interval_secs: u64,
}

impl RoundClock {
    pub fn new(duration_secs: u64, decay_interval_secs: u64) -> Self {
        Self {
            started_at: None,
            elapsed_secs: 0,
            active: false,
            last_decay_interval: 0,
            duration_secs,
            decay_interval_secs: decay_interval_secs.max(1),
        }
    }

    /// Start the round. Only the first call has any effect; returns whether it did.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.started_at.is_some() {
            return false;
        }
        self.restart(now);
        true
    }

    /// Begin a fresh round at `now`.
    pub fn restart(&mut self, now: Instant) {
        self.started_at = Some(now);
        self.elapsed_secs = 0;
        self.active = true;
        self.last_decay_interval = 0;
    }

    /// Recompute elapsed time. Does nothing once the round is over.
    ///
    /// At most one decay is reported per call, however many intervals were skipped.
    pub fn advance(&mut self, now: Instant) -> ClockTick {
        let Some(started_at) = self.started_at else {
            return ClockTick::default();
        };
        if !self.active {
            return ClockTick::default();
        }

        self.elapsed_secs = now.saturating_duration_since(started_at).as_secs();

        let interval = self.elapsed_secs / self.decay_interval_secs;
        let decay = interval > self.last_decay_interval;
        if decay {
            self.last_decay_interval = interval;
        }

        let expired = self.elapsed_secs >= self.duration_secs;
        if expired {
            self.active = false;
        }

        ClockTick { decay, expired }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    #[inline]
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }
}
