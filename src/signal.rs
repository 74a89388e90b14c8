/// The last event observed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Input {
    /// Nothing new. No transition listens for it.
    Init,
    Blocked,
    MonitorTH,
    Alarm,
    Light,
    Timeout5,
    Timeout3,
    Timeout6,
}

/// Single-slot mailbox between the tasks and the state machine.
/// Not a queue: the last write before a poll wins and earlier ones are lost.
#[derive(Debug)]
pub struct Signal {
    last: Input,
}

impl Signal {
    pub const fn new() -> Self {
        Self { last: Input::Init }
    }

    /// Last write wins
    pub fn raise(&mut self, input: Input) {
        if self.last != input {
            trace!("signal {} -> {}", self.last, input);
        }
        self.last = input;
    }

    pub fn last(&self) -> Input {
        self.last
    }

    /// Marks the stored event as consumed
    pub fn clear(&mut self) {
        self.last = Input::Init;
    }
}

impl Default for Signal {
    fn default() -> Self {
        Self::new()
    }
}
