use crate::average::RollingAverage;
use crate::config::{Settings, LIGHT_WINDOW};
use crate::rendering::{render_lines, Display};
use crate::sensors::{estimate_lux, LightSensor};
use crate::signal::{Input, Signal};

/// Largest lux value that still fits on the screen
const LUX_DISPLAY_MAX: u32 = 9999;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightTick {
    Normal(u16),
    Alarm(u16),
}

/// Ambient light watch.
///
/// The alarm compares the instantaneous raw reading. The rolling average is
/// kept for the display only.
pub struct LightMonitor {
    limit: u16,
    average: RollingAverage<LIGHT_WINDOW>,
}

impl LightMonitor {
    pub fn new(settings: &Settings) -> Self {
        Self {
            limit: settings.light_limit,
            average: RollingAverage::new(),
        }
    }

    pub fn enter<D: Display>(&mut self, lcd: &mut D) {
        lcd.clear();
        self.average.reset();
    }

    pub fn tick<S, D>(&mut self, sensor: &mut S, lcd: &mut D, signal: &mut Signal) -> LightTick
    where
        S: LightSensor,
        D: Display,
    {
        let raw = sensor.read_raw();
        self.average.push(raw as f32);

        let top = crate::lcd_line!("Light: {}", raw);
        let mut bottom = crate::lcd_line!("Avg:");
        match self.average.mean() {
            Some(mean) => ufmt::uwrite!(&mut bottom, "{}", mean as u32).ok(),
            None => bottom.push_str("--").ok(),
        };
        match estimate_lux(raw) {
            Some(lux) => ufmt::uwrite!(&mut bottom, " {}lx", (lux as u32).min(LUX_DISPLAY_MAX)).ok(),
            None => bottom.push_str(" --lx").ok(),
        };
        render_lines(&top, &bottom, lcd);

        if raw < self.limit {
            warn!("light alarm, raw reading {} below {}", raw, self.limit);
            signal.raise(Input::Alarm);
            return LightTick::Alarm(raw);
        }
        LightTick::Normal(raw)
    }

    pub fn average_light(&self) -> Option<f32> {
        self.average.mean()
    }
}
