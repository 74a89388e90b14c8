use crate::signal::Input;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    Init,
    Blocked,
    MonitorTemperatureHumidity,
    Alarm,
    MonitorLight,
}

impl State {
    pub fn name(&self) -> &'static str {
        match self {
            State::Init => "Init",
            State::Blocked => "Blocked",
            State::MonitorTemperatureHumidity => "MonitorTemperatureHumidity",
            State::Alarm => "Alarm",
            State::MonitorLight => "MonitorLight",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub from: State,
    pub on: Input,
    pub to: State,
}

const fn transition(from: State, on: Input, to: State) -> Transition {
    Transition { from, on, to }
}

/// Every transition the greenhouse can take. The machine picks the first row
/// whose source is the current state and whose input is the stored signal.
pub const TRANSITIONS: [Transition; 8] = [
    transition(State::Init, Input::Blocked, State::Blocked),
    transition(State::Init, Input::MonitorTH, State::MonitorTemperatureHumidity),
    transition(State::Blocked, Input::Timeout5, State::Init),
    transition(State::MonitorTemperatureHumidity, Input::Alarm, State::Alarm),
    transition(State::MonitorTemperatureHumidity, Input::Timeout5, State::MonitorLight),
    transition(State::Alarm, Input::Timeout6, State::MonitorTemperatureHumidity),
    transition(State::MonitorLight, Input::Alarm, State::Alarm),
    transition(State::MonitorLight, Input::Timeout3, State::MonitorTemperatureHumidity),
];

/// Holds the current state. Entry and exit actions belong to the owner,
/// which applies them around [`Machine::switch`].
#[derive(Debug)]
pub struct Machine {
    current: State,
}

impl Machine {
    pub const fn new() -> Self {
        Self {
            current: State::Init,
        }
    }

    pub fn state(&self) -> State {
        self.current
    }

    /// The transition the stored input selects, if any
    pub fn evaluate(&self, input: Input) -> Option<Transition> {
        TRANSITIONS
            .iter()
            .find(|t| t.from == self.current && t.on == input)
            .copied()
    }

    pub fn switch(&mut self, transition: &Transition) {
        debug_assert_eq!(transition.from, self.current);
        self.current = transition.to;
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}
