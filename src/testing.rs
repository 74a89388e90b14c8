use std::collections::VecDeque;
use std::string::String;
use std::vec::Vec;

use crate::actuators::{Buzzer, Color, Indicator};
use crate::rendering::{Display, COLUMNS, ROWS};
use crate::sensors::{HumidityTemperatureProbe, Keypad, LightSensor};
use crate::timer::Duration;

/// Emulates a 16x2 character display
pub struct ScreenBuffer {
    cells: [[char; COLUMNS]; ROWS as usize],
    cursor: (usize, usize),
    pub clears: usize,
}

impl ScreenBuffer {
    pub fn new() -> Self {
        Self {
            cells: [[' '; COLUMNS]; ROWS as usize],
            cursor: (0, 0),
            clears: 0,
        }
    }

    /// Row contents without trailing blanks
    pub fn row(&self, row: usize) -> String {
        let text: String = self.cells[row].iter().collect();
        text.trim_end().into()
    }
}

impl Display for ScreenBuffer {
    fn clear(&mut self) {
        self.cells = [[' '; COLUMNS]; ROWS as usize];
        self.cursor = (0, 0);
        self.clears += 1;
    }

    fn set_cursor(&mut self, col: u8, row: u8) {
        self.cursor = (col as usize, row as usize);
    }

    fn print(&mut self, text: &str) {
        let (mut col, row) = self.cursor;
        for c in text.chars() {
            if col < COLUMNS && row < ROWS as usize {
                self.cells[row][col] = c;
            }
            col += 1;
        }
        self.cursor = (col, row);
    }
}

/// Hands out one queued key per call
#[derive(Default)]
pub struct ScriptedKeypad {
    keys: VecDeque<char>,
}

impl ScriptedKeypad {
    pub fn type_keys(&mut self, keys: &str) {
        self.keys.extend(keys.chars());
    }
}

impl Keypad for ScriptedKeypad {
    fn get_key(&mut self) -> Option<char> {
        self.keys.pop_front()
    }
}

pub struct FakeProbe {
    pub humidity: f32,
    pub temperature_c: f32,
}

impl Default for FakeProbe {
    fn default() -> Self {
        Self {
            humidity: 50.0,
            temperature_c: 22.0,
        }
    }
}

impl HumidityTemperatureProbe for FakeProbe {
    fn read_humidity(&mut self) -> f32 {
        self.humidity
    }

    fn read_temperature(&mut self, fahrenheit: bool) -> f32 {
        if fahrenheit {
            crate::sensors::celsius_to_fahrenheit(self.temperature_c)
        } else {
            self.temperature_c
        }
    }
}

pub struct FakeLight {
    pub raw: u16,
}

impl LightSensor for FakeLight {
    fn read_raw(&mut self) -> u16 {
        self.raw
    }
}

#[derive(Default)]
pub struct FakeIndicator {
    pub color: Option<Color>,
}

impl Indicator for FakeIndicator {
    fn set_color(&mut self, color: Color) {
        self.color = Some(color);
    }
}

#[derive(Default)]
pub struct FakeBuzzer {
    pub tones: Vec<(u32, Duration)>,
    pub sounding: bool,
}

impl Buzzer for FakeBuzzer {
    fn sound_at(&mut self, frequency_hz: u32, duration: Duration) {
        self.tones.push((frequency_hz, duration));
        self.sounding = true;
    }

    fn silence(&mut self) {
        self.sounding = false;
    }
}
