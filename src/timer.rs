/// Milliseconds since boot
pub type Instant = fugit::TimerInstantU64<1000>;
pub type Duration = fugit::TimerDurationU64<1000>;

/// Anything that can tell the current time
pub trait Clock {
    fn now(&self) -> Instant;
}

/// A unit of work that only runs once its period has elapsed.
///
/// Nothing happens in the background: the task is advanced by calling
/// [`PeriodicTask::poll`] from the main loop, and the caller runs the
/// task body whenever `poll` reports that it fired.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PeriodicTask {
    period: Duration,
    repeat: bool,
    enabled: bool,
    last_fire: Instant,
}

impl PeriodicTask {
    /// A task that fires every `period` until stopped
    pub const fn repeating(period: Duration) -> PeriodicTask {
        Self::new(period, true)
    }

    /// A task that fires once, `period` after being started
    pub const fn one_shot(period: Duration) -> PeriodicTask {
        Self::new(period, false)
    }

    const fn new(period: Duration, repeat: bool) -> PeriodicTask {
        Self {
            period,
            repeat,
            enabled: false,
            last_fire: Instant::from_ticks(0),
        }
    }

    /// Enables the task and counts the period from `now`
    pub fn start(&mut self, now: Instant) {
        self.enabled = true;
        self.last_fire = now;
    }

    pub fn stop(&mut self) {
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Returns true if the task is due, in which case the body must run now.
    /// One-shot tasks disable themselves after firing.
    pub fn poll(&mut self, now: Instant) -> bool {
        if !self.enabled {
            return false;
        }

        // A clock that went backwards counts as no time elapsed
        let elapsed = now
            .checked_duration_since(self.last_fire)
            .unwrap_or(Duration::from_ticks(0));
        if elapsed < self.period {
            return false;
        }

        self.last_fire = now;
        if !self.repeat {
            self.enabled = false;
        }
        true
    }
}
