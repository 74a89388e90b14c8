//! Fake devices and a stepping harness for driving a whole greenhouse.
#![allow(dead_code)]

use std::collections::VecDeque;

use greenhouse_sentinel::actuators::{Buzzer, Color, Indicator};
use greenhouse_sentinel::config::{Settings, POLL_INTERVAL_MS};
use greenhouse_sentinel::rendering::{Display, COLUMNS, ROWS};
use greenhouse_sentinel::sensors::{
    celsius_to_fahrenheit, HumidityTemperatureProbe, Keypad, LightSensor,
};
use greenhouse_sentinel::timer::{Duration, Instant};
use greenhouse_sentinel::{Devices, Greenhouse, State};

pub struct Screen {
    cells: [[char; COLUMNS]; ROWS as usize],
    cursor: (usize, usize),
}

impl Screen {
    pub fn row(&self, row: usize) -> String {
        let text: String = self.cells[row].iter().collect();
        text.trim_end().to_string()
    }
}

impl Display for Screen {
    fn clear(&mut self) {
        self.cells = [[' '; COLUMNS]; ROWS as usize];
        self.cursor = (0, 0);
    }

    fn set_cursor(&mut self, col: u8, row: u8) {
        self.cursor = (col as usize, row as usize);
    }

    fn print(&mut self, text: &str) {
        let (mut col, row) = self.cursor;
        for c in text.chars() {
            assert!(col < COLUMNS && row < ROWS as usize, "write past the display: {text:?}");
            self.cells[row][col] = c;
            col += 1;
        }
        self.cursor = (col, row);
    }
}

#[derive(Default)]
pub struct Keys {
    queue: VecDeque<char>,
}

impl Keys {
    pub fn type_keys(&mut self, keys: &str) {
        self.queue.extend(keys.chars());
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl Keypad for Keys {
    fn get_key(&mut self) -> Option<char> {
        self.queue.pop_front()
    }
}

pub struct Probe {
    pub humidity: f32,
    pub temperature_c: f32,
}

impl HumidityTemperatureProbe for Probe {
    fn read_humidity(&mut self) -> f32 {
        self.humidity
    }

    fn read_temperature(&mut self, fahrenheit: bool) -> f32 {
        if fahrenheit {
            celsius_to_fahrenheit(self.temperature_c)
        } else {
            self.temperature_c
        }
    }
}

pub struct Light {
    pub raw: u16,
}

impl LightSensor for Light {
    fn read_raw(&mut self) -> u16 {
        self.raw
    }
}

#[derive(Default)]
pub struct Lamp {
    pub color: Option<Color>,
}

impl Indicator for Lamp {
    fn set_color(&mut self, color: Color) {
        self.color = Some(color);
    }
}

#[derive(Default)]
pub struct Beeper {
    pub tones: Vec<(u32, Duration)>,
    pub sounding: bool,
}

impl Buzzer for Beeper {
    fn sound_at(&mut self, frequency_hz: u32, duration: Duration) {
        self.tones.push((frequency_hz, duration));
        self.sounding = true;
    }

    fn silence(&mut self) {
        self.sounding = false;
    }
}

pub type Rig = Greenhouse<Screen, Keys, Probe, Light, Lamp, Beeper>;
pub type RigDevices = Devices<Screen, Keys, Probe, Light, Lamp, Beeper>;

pub const CREDENTIAL: &str = "1A2B";
pub const WRONG: &str = "0000";

/// Runs the greenhouse against a simulated millisecond clock, one poll per
/// main-loop interval.
pub struct Sim {
    pub greenhouse: Rig,
    now: u64,
}

impl Sim {
    pub fn new() -> Self {
        let devices = Devices {
            display: Screen {
                cells: [[' '; COLUMNS]; ROWS as usize],
                cursor: (0, 0),
            },
            keypad: Keys::default(),
            probe: Probe {
                humidity: 50.0,
                temperature_c: 22.0,
            },
            light: Light { raw: 500 },
            indicator: Lamp::default(),
            buzzer: Beeper::default(),
        };
        let mut greenhouse = Greenhouse::new(Settings::default(), devices);
        greenhouse.poll(Instant::from_ticks(0));
        Self { greenhouse, now: 0 }
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn state(&self) -> State {
        self.greenhouse.state()
    }

    pub fn devices(&mut self) -> &mut RigDevices {
        self.greenhouse.devices_mut()
    }

    pub fn advance(&mut self, ms: u64) {
        let end = self.now + ms;
        while self.now < end {
            self.step();
        }
    }

    /// Polls until `state` is reached. Returns the elapsed time, or `None`
    /// if it did not happen within `limit_ms`.
    pub fn advance_until(&mut self, state: State, limit_ms: u64) -> Option<u64> {
        let start = self.now;
        while self.now - start < limit_ms {
            self.step();
            if self.state() == state {
                return Some(self.now - start);
            }
        }
        None
    }

    pub fn set_climate(&mut self, temperature_c: f32, humidity: f32) {
        let probe = &mut self.devices().probe;
        probe.temperature_c = temperature_c;
        probe.humidity = humidity;
    }

    /// Types the right password and waits for monitoring to begin
    pub fn unlock(&mut self) {
        self.devices().keypad.type_keys(CREDENTIAL);
        assert!(
            self.advance_until(State::MonitorTemperatureHumidity, 2_000).is_some(),
            "password was not accepted"
        );
    }

    fn step(&mut self) {
        self.now += POLL_INTERVAL_MS as u64;
        self.greenhouse.poll(Instant::from_ticks(self.now));
    }
}
