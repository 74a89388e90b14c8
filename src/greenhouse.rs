use embedded_hal::delay::DelayNs;

use crate::actuators::{Buzzer, Color, Indicator};
use crate::alarm::AlarmDriver;
use crate::climate::ClimateMonitor;
use crate::config::{Settings, POLL_INTERVAL_MS};
use crate::gate::AccessGate;
use crate::light::LightMonitor;
use crate::machine::{Machine, State, Transition};
use crate::rendering::{render_lines, Display};
use crate::sensors::{HumidityTemperatureProbe, Keypad, LightSensor};
use crate::signal::{Input, Signal};
use crate::timer::{Clock, Instant, PeriodicTask};

/// Every external device the greenhouse talks to
pub struct Devices<D, K, P, L, I, B> {
    pub display: D,
    pub keypad: K,
    pub probe: P,
    pub light: L,
    pub indicator: I,
    pub buzzer: B,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TaskId {
    Keypad,
    Climate,
    Light,
    Alarm,
    ClimateTimeout,
    LightTimeout,
    AlarmTimeout,
    LockoutTimeout,
}

struct Tasks {
    keypad: PeriodicTask,
    climate: PeriodicTask,
    light: PeriodicTask,
    alarm: PeriodicTask,
    climate_timeout: PeriodicTask,
    light_timeout: PeriodicTask,
    alarm_timeout: PeriodicTask,
    lockout_timeout: PeriodicTask,
}

impl Tasks {
    fn new(settings: &Settings) -> Self {
        Self {
            keypad: PeriodicTask::repeating(settings.keypad_period),
            climate: PeriodicTask::repeating(settings.monitor_period),
            light: PeriodicTask::repeating(settings.monitor_period),
            alarm: PeriodicTask::repeating(settings.monitor_period),
            climate_timeout: PeriodicTask::one_shot(settings.climate_timeout),
            light_timeout: PeriodicTask::one_shot(settings.light_timeout),
            alarm_timeout: PeriodicTask::one_shot(settings.alarm_timeout),
            lockout_timeout: PeriodicTask::one_shot(settings.lockout_timeout),
        }
    }

    fn get(&self, id: TaskId) -> &PeriodicTask {
        match id {
            TaskId::Keypad => &self.keypad,
            TaskId::Climate => &self.climate,
            TaskId::Light => &self.light,
            TaskId::Alarm => &self.alarm,
            TaskId::ClimateTimeout => &self.climate_timeout,
            TaskId::LightTimeout => &self.light_timeout,
            TaskId::AlarmTimeout => &self.alarm_timeout,
            TaskId::LockoutTimeout => &self.lockout_timeout,
        }
    }
}

/// The cooperative control loop. One [`Greenhouse::poll`] polls every
/// periodic task in a fixed order, then lets the state machine look at the
/// signal once.
pub struct Greenhouse<D, K, P, L, I, B> {
    devices: Devices<D, K, P, L, I, B>,
    settings: Settings,
    machine: Machine,
    signal: Signal,
    tasks: Tasks,
    gate: AccessGate,
    climate: ClimateMonitor,
    light: LightMonitor,
    alarm: AlarmDriver,
    started: bool,
}

impl<D, K, P, L, I, B> Greenhouse<D, K, P, L, I, B>
where
    D: Display,
    K: Keypad,
    P: HumidityTemperatureProbe,
    L: LightSensor,
    I: Indicator,
    B: Buzzer,
{
    pub fn new(settings: Settings, devices: Devices<D, K, P, L, I, B>) -> Self {
        Self {
            devices,
            machine: Machine::new(),
            signal: Signal::new(),
            tasks: Tasks::new(&settings),
            gate: AccessGate::new(&settings),
            climate: ClimateMonitor::new(&settings),
            light: LightMonitor::new(&settings),
            alarm: AlarmDriver::new(&settings),
            settings,
            started: false,
        }
    }

    /// Runs the entry action of the initial state. Called by the first
    /// [`poll`](Self::poll) if not done explicitly.
    pub fn start(&mut self, now: Instant) {
        if self.started {
            return;
        }
        self.started = true;
        info!("starting in {}", self.machine.state());
        self.enter(self.machine.state(), now);
    }

    /// One scheduler iteration. Returns the transition taken, if any.
    pub fn poll(&mut self, now: Instant) -> Option<Transition> {
        self.start(now);
        self.run_tasks(now);
        self.step_machine(now)
    }

    /// Polls forever, sleeping a little between iterations
    pub fn run<C: Clock, W: DelayNs>(&mut self, clock: &C, delay: &mut W) -> ! {
        loop {
            self.poll(clock.now());
            delay.delay_ms(POLL_INTERVAL_MS);
        }
    }

    /// Timeouts go first so that an alarm raised in the same iteration
    /// overwrites them.
    fn run_tasks(&mut self, now: Instant) {
        if self.tasks.climate_timeout.poll(now) {
            self.signal.raise(Input::Timeout5);
        }
        if self.tasks.light_timeout.poll(now) {
            self.signal.raise(Input::Timeout3);
        }
        if self.tasks.alarm_timeout.poll(now) {
            self.signal.raise(Input::Timeout6);
        }
        if self.tasks.lockout_timeout.poll(now) {
            self.signal.raise(Input::Timeout5);
        }

        let devices = &mut self.devices;
        if self.tasks.keypad.poll(now) {
            self.gate
                .step(now, &mut devices.keypad, &mut devices.display, &mut self.signal);
        }
        if self.tasks.climate.poll(now) {
            self.climate
                .tick(&mut devices.probe, &mut devices.display, &mut self.signal);
        }
        if self.tasks.light.poll(now) {
            self.light
                .tick(&mut devices.light, &mut devices.display, &mut self.signal);
        }
        if self.tasks.alarm.poll(now) {
            self.alarm.tick(&mut devices.display, &mut devices.buzzer);
        }
    }

    fn step_machine(&mut self, now: Instant) -> Option<Transition> {
        let input = self.signal.last();
        let transition = self.machine.evaluate(input)?;

        info!("{} -> {} on {}", transition.from, transition.to, input);
        self.exit(transition.from);
        self.machine.switch(&transition);
        self.signal.clear();
        self.enter(transition.to, now);
        Some(transition)
    }

    fn enter(&mut self, state: State, now: Instant) {
        debug!("enter {}", state);
        let devices = &mut self.devices;
        match state {
            State::Init => {
                self.gate.reset();
                devices.indicator.set_color(Color::OFF);
                self.gate.render_prompt(&mut devices.display);
                self.tasks.keypad.start(now);
            }
            State::Blocked => {
                let wait = crate::lcd_line!("Wait {}s", self.settings.lockout_timeout.to_secs());
                render_lines("System locked", &wait, &mut devices.display);
                devices.indicator.set_color(Color::AMBER);
                self.tasks.lockout_timeout.start(now);
            }
            State::MonitorTemperatureHumidity => {
                self.climate
                    .enter(&mut devices.display, &mut devices.indicator, &mut devices.buzzer);
                self.tasks.climate_timeout.start(now);
                self.tasks.climate.start(now);
            }
            State::Alarm => {
                self.alarm.enter(&mut devices.display, &mut devices.indicator);
                self.tasks.alarm_timeout.start(now);
                self.tasks.alarm.start(now);
            }
            State::MonitorLight => {
                self.light.enter(&mut devices.display);
                self.tasks.light_timeout.start(now);
                self.tasks.light.start(now);
            }
        }
    }

    /// Stops every task the state owns, timeouts included, so a stale
    /// timeout can never fire into a later visit.
    fn exit(&mut self, state: State) {
        debug!("exit {}", state);
        match state {
            State::Init => self.tasks.keypad.stop(),
            State::Blocked => self.tasks.lockout_timeout.stop(),
            State::MonitorTemperatureHumidity => {
                self.tasks.climate.stop();
                self.tasks.climate_timeout.stop();
            }
            State::Alarm => {
                self.tasks.alarm.stop();
                self.tasks.alarm_timeout.stop();
            }
            State::MonitorLight => {
                self.tasks.light.stop();
                self.tasks.light_timeout.stop();
            }
        }
    }

    pub fn state(&self) -> State {
        self.machine.state()
    }

    pub fn signal(&self) -> Input {
        self.signal.last()
    }

    pub fn is_task_enabled(&self, id: TaskId) -> bool {
        self.tasks.get(id).is_enabled()
    }

    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }

    pub fn climate(&self) -> &ClimateMonitor {
        &self.climate
    }

    pub fn light(&self) -> &LightMonitor {
        &self.light
    }

    pub fn devices(&self) -> &Devices<D, K, P, L, I, B> {
        &self.devices
    }

    pub fn devices_mut(&mut self) -> &mut Devices<D, K, P, L, I, B> {
        &mut self.devices
    }
}
