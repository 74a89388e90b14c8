use crate::actuators::{Buzzer, Color, Indicator};
use crate::config::Settings;
use crate::rendering::{render_lines, Display};
use crate::timer::Duration;

/// Keeps the alarm outputs asserted while the Alarm state is active
pub struct AlarmDriver {
    tone_hz: u32,
    tone: Duration,
}

impl AlarmDriver {
    pub fn new(settings: &Settings) -> Self {
        Self {
            tone_hz: settings.alarm_tone_hz,
            tone: settings.alarm_tone,
        }
    }

    pub fn enter<D: Display, I: Indicator>(&mut self, lcd: &mut D, indicator: &mut I) {
        lcd.clear();
        indicator.set_color(Color::RED);
    }

    pub fn tick<D: Display, B: Buzzer>(&mut self, lcd: &mut D, buzzer: &mut B) {
        render_lines("!! ALARM !!", "Check greenhouse", lcd);
        buzzer.sound_at(self.tone_hz, self.tone);
    }
}
