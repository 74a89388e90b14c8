use crate::actuators::{Buzzer, Color, Indicator};
use crate::average::RollingAverage;
use crate::config::{ClimateLimits, Settings, HUMIDITY_WINDOW, TEMPERATURE_WINDOW};
use crate::rendering::{render_lines, Display, Tenths};
use crate::sensors::{ClimateReading, HumidityTemperatureProbe, SensorError};
use crate::signal::{Input, Signal};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClimateTick {
    /// The probe returned garbage, nothing changed
    Skipped(SensorError),
    Normal(ClimateReading),
    Alarm(ClimateReading),
}

/// Temperature and humidity watch
pub struct ClimateMonitor {
    limits: ClimateLimits,
    temperature: RollingAverage<TEMPERATURE_WINDOW>,
    humidity: RollingAverage<HUMIDITY_WINDOW>,
    last: Option<ClimateReading>,
}

impl ClimateMonitor {
    pub fn new(settings: &Settings) -> Self {
        Self {
            limits: settings.climate,
            temperature: RollingAverage::new(),
            humidity: RollingAverage::new(),
            last: None,
        }
    }

    /// Entry side effects: quiet outputs, clean averages, blank screen
    pub fn enter<D, I, B>(&mut self, lcd: &mut D, indicator: &mut I, buzzer: &mut B)
    where
        D: Display,
        I: Indicator,
        B: Buzzer,
    {
        buzzer.silence();
        indicator.set_color(Color::OFF);
        self.temperature.reset();
        self.humidity.reset();
        self.last = None;
        lcd.clear();
    }

    /// Reads, displays and checks one climate sample
    /// param probe: humidity/temperature probe
    /// param lcd: LCD instance
    /// param signal: receives Alarm when both limits are exceeded
    pub fn tick<P, D>(&mut self, probe: &mut P, lcd: &mut D, signal: &mut Signal) -> ClimateTick
    where
        P: HumidityTemperatureProbe,
        D: Display,
    {
        let reading = match ClimateReading::read(probe) {
            Ok(reading) => reading,
            Err(e) => {
                warn!("skipping climate tick: {}", e);
                return ClimateTick::Skipped(e);
            }
        };
        self.last = Some(reading);

        let top = crate::lcd_line!(
            "H:{}% HI:{}",
            Tenths(reading.humidity),
            Tenths(reading.heat_index())
        );
        let bottom = crate::lcd_line!(
            "T:{}C {}F",
            Tenths(reading.temperature_c),
            Tenths(reading.temperature_f)
        );
        render_lines(&top, &bottom, lcd);

        self.temperature.push(reading.temperature_c);
        self.humidity.push(reading.humidity);

        if self.exceeds_limits(&reading) {
            warn!("climate alarm, temperature and humidity above limits");
            signal.raise(Input::Alarm);
            return ClimateTick::Alarm(reading);
        }
        ClimateTick::Normal(reading)
    }

    fn exceeds_limits(&self, reading: &ClimateReading) -> bool {
        reading.temperature_c > self.limits.temperature_c && reading.humidity > self.limits.humidity_pct
    }

    pub fn average_temperature(&self) -> Option<f32> {
        self.temperature.mean()
    }

    pub fn average_humidity(&self) -> Option<f32> {
        self.humidity.mean()
    }

    pub fn last_reading(&self) -> Option<ClimateReading> {
        self.last
    }
}
