use embedded_hal::digital::{InputPin, OutputPin};
use libm::{fabsf, powf, sqrtf};
use thiserror::Error;

/// Photo-resistor characteristics, used for the lux estimate only
pub const LIGHT_GAMMA: f32 = 0.7;
pub const LIGHT_RL10_KOHM: f32 = 50.0;
const LIGHT_DIVIDER_OHM: f32 = 2000.0;
const LIGHT_REFERENCE_V: f32 = 5.0;
/// Full scale of the raw light reading (10 bit)
pub const LIGHT_FULL_SCALE: u16 = 1024;

/// Combined humidity and temperature probe.
/// Either reading may be NaN after a failed transfer.
pub trait HumidityTemperatureProbe {
    /// Relative humidity in percent
    fn read_humidity(&mut self) -> f32;
    fn read_temperature(&mut self, fahrenheit: bool) -> f32;
}

/// Photo-resistor behind an ADC
pub trait LightSensor {
    /// Raw reading, proportional to brightness
    fn read_raw(&mut self) -> u16;
}

/// Polled key input. Returns a key once per press, `None` otherwise.
pub trait Keypad {
    fn get_key(&mut self) -> Option<char>;
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    #[error("humidity reading is not a number")]
    InvalidHumidity,

    #[error("temperature reading is not a number")]
    InvalidTemperature,
}

/// One validated sample from the humidity/temperature probe
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClimateReading {
    pub humidity: f32,
    pub temperature_c: f32,
    pub temperature_f: f32,
}

impl ClimateReading {
    pub fn from_raw(humidity: f32, temperature_c: f32, temperature_f: f32) -> Result<Self, SensorError> {
        if !humidity.is_finite() {
            return Err(SensorError::InvalidHumidity);
        }
        if !temperature_c.is_finite() || !temperature_f.is_finite() {
            return Err(SensorError::InvalidTemperature);
        }
        Ok(Self {
            humidity,
            temperature_c,
            temperature_f,
        })
    }

    /// Reads everything the probe offers in one go
    pub fn read<P: HumidityTemperatureProbe>(probe: &mut P) -> Result<Self, SensorError> {
        let humidity = probe.read_humidity();
        let temperature_c = probe.read_temperature(false);
        let temperature_f = probe.read_temperature(true);
        Self::from_raw(humidity, temperature_c, temperature_f)
    }

    /// Apparent temperature in Celsius
    pub fn heat_index(&self) -> f32 {
        heat_index_c(self.temperature_c, self.humidity)
    }
}

/// Converts Celsius to Fahrenheit
/// param celsius: temperature in C
pub fn celsius_to_fahrenheit(celsius: f32) -> f32 {
    celsius * (9. / 5.) + 32.
}

pub fn fahrenheit_to_celsius(fahrenheit: f32) -> f32 {
    (fahrenheit - 32.) * (5. / 9.)
}

/// NWS heat index (Steadman below 80F, Rothfusz regression above)
/// param temperature_c: air temperature in C
/// param humidity: relative humidity in percent
/// returns the apparent temperature in C
pub fn heat_index_c(temperature_c: f32, humidity: f32) -> f32 {
    let t = celsius_to_fahrenheit(temperature_c);
    let rh = humidity;

    let mut hi = 0.5 * (t + 61.0 + ((t - 68.0) * 1.2) + (rh * 0.094));
    if hi > 79.0 {
        hi = -42.379 + 2.049_015_2 * t + 10.143_331 * rh
            - 0.224_755_4 * t * rh
            - 0.006_837_83 * t * t
            - 0.054_817_17 * rh * rh
            + 0.001_228_74 * t * t * rh
            + 0.000_852_82 * t * rh * rh
            - 0.000_001_99 * t * t * rh * rh;

        if rh < 13.0 && (80.0..=112.0).contains(&t) {
            hi -= ((13.0 - rh) * 0.25) * sqrtf((17.0 - fabsf(t - 95.0)) * 0.058_82);
        } else if rh > 85.0 && (80.0..=87.0).contains(&t) {
            hi += ((rh - 85.0) * 0.1) * ((87.0 - t) * 0.2);
        }
    }

    fahrenheit_to_celsius(hi)
}

/// Rough lux estimate for the photo-resistor divider
/// param raw: 10 bit ADC reading
/// returns `None` at the rails, where the divider maths breaks down
pub fn estimate_lux(raw: u16) -> Option<f32> {
    if raw == 0 || raw >= LIGHT_FULL_SCALE {
        return None;
    }
    let voltage = raw as f32 / LIGHT_FULL_SCALE as f32 * LIGHT_REFERENCE_V;
    // Photo-resistor on the high side, so the reading rises with light
    let resistance = LIGHT_DIVIDER_OHM * (LIGHT_REFERENCE_V - voltage) / voltage;
    let lux = powf(
        LIGHT_RL10_KOHM * 1e3 * powf(10.0, LIGHT_GAMMA) / resistance,
        1.0 / LIGHT_GAMMA,
    );
    lux.is_finite().then_some(lux)
}

/// A probe that converts on request and is read back later
pub trait ForcedMeasurement {
    /// Starts a conversion without waiting for it
    /// returns false if the probe refused
    fn trigger(&mut self) -> bool;

    /// Reads back the last finished conversion
    /// returns (humidity %, temperature C), or `None` if nothing new is ready
    fn collect(&mut self) -> Option<(f32, f32)>;
}

/// Spreads a forced measurement over two climate ticks.
///
/// Each humidity read collects the conversion started on the previous tick
/// and starts the next one, so no read waits for a conversion. Readings lag by
/// one tick and the very first tick reads NaN.
pub struct PipelinedSensor<M> {
    sensor: M,
    pending: bool,
    latest: Option<(f32, f32)>,
}

impl<M: ForcedMeasurement> PipelinedSensor<M> {
    pub fn new(sensor: M) -> Self {
        Self {
            sensor,
            pending: false,
            latest: None,
        }
    }
}

impl<M: ForcedMeasurement> HumidityTemperatureProbe for PipelinedSensor<M> {
    fn read_humidity(&mut self) -> f32 {
        self.latest = if self.pending {
            self.sensor.collect()
        } else {
            None
        };
        self.pending = self.sensor.trigger();
        self.latest.map_or(f32::NAN, |(humidity, _)| humidity)
    }

    fn read_temperature(&mut self, fahrenheit: bool) -> f32 {
        let celsius = self.latest.map_or(f32::NAN, |(_, celsius)| celsius);
        if fahrenheit {
            celsius_to_fahrenheit(celsius)
        } else {
            celsius
        }
    }
}

/// Row-strobed key matrix.
///
/// Rows are driven high one at a time while the (pulled-down) columns are
/// read. A key that stays down is reported only once.
pub struct MatrixKeypad<R, C, const ROWS: usize, const COLS: usize> {
    rows: [R; ROWS],
    cols: [C; COLS],
    symbols: [[char; COLS]; ROWS],
    held: Option<char>,
}

impl<R, C, const ROWS: usize, const COLS: usize> MatrixKeypad<R, C, ROWS, COLS>
where
    R: OutputPin,
    C: InputPin,
{
    pub fn new(mut rows: [R; ROWS], cols: [C; COLS], symbols: [[char; COLS]; ROWS]) -> Self {
        for row in rows.iter_mut() {
            row.set_low().ok();
        }
        Self {
            rows,
            cols,
            symbols,
            held: None,
        }
    }

    /// Returns whichever key is down right now, if any
    pub fn scan(&mut self) -> Option<char> {
        let mut found = None;
        for (r, row) in self.rows.iter_mut().enumerate() {
            if row.set_high().is_err() {
                continue;
            }
            for (c, col) in self.cols.iter_mut().enumerate() {
                if found.is_none() && col.is_high().unwrap_or(false) {
                    found = Some(self.symbols[r][c]);
                }
            }
            row.set_low().ok();
            if found.is_some() {
                break;
            }
        }
        found
    }
}

impl<R, C, const ROWS: usize, const COLS: usize> Keypad for MatrixKeypad<R, C, ROWS, COLS>
where
    R: OutputPin,
    C: InputPin,
{
    fn get_key(&mut self) -> Option<char> {
        let key = self.scan();
        let pressed = match key {
            Some(_) if key != self.held => key,
            _ => None,
        };
        self.held = key;
        pressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;
    use std::rc::Rc;

    #[test]
    fn rejects_nan_readings() {
        assert_eq!(
            ClimateReading::from_raw(f32::NAN, 20.0, 68.0),
            Err(SensorError::InvalidHumidity)
        );
        assert_eq!(
            ClimateReading::from_raw(50.0, f32::NAN, 68.0),
            Err(SensorError::InvalidTemperature)
        );
        assert_eq!(
            ClimateReading::from_raw(50.0, 20.0, f32::NAN),
            Err(SensorError::InvalidTemperature)
        );
        assert!(ClimateReading::from_raw(50.0, 20.0, 68.0).is_ok());
    }

    #[test]
    fn heat_index_near_air_temperature_when_mild() {
        let hi = heat_index_c(20.0, 50.0);
        assert!((hi - 20.0).abs() < 1.5, "heat index {hi}");
    }

    #[test]
    fn heat_index_rises_in_hot_humid_air() {
        // NWS table: 90F at 70% RH feels like ~106F
        let hi = heat_index_c(fahrenheit_to_celsius(90.0), 70.0);
        let expected = fahrenheit_to_celsius(106.0);
        assert!((hi - expected).abs() < 1.0, "heat index {hi}");
    }

    #[test]
    fn lux_grows_with_brightness() {
        assert_eq!(estimate_lux(0), None);
        assert_eq!(estimate_lux(LIGHT_FULL_SCALE), None);
        let dim = estimate_lux(100).unwrap();
        let bright = estimate_lux(900).unwrap();
        assert!(bright > dim);
    }

    #[derive(Default)]
    struct FakeConversion {
        triggers: usize,
        collects: usize,
        refuse: bool,
        value: (f32, f32),
    }

    impl ForcedMeasurement for FakeConversion {
        fn trigger(&mut self) -> bool {
            self.triggers += 1;
            !self.refuse
        }

        fn collect(&mut self) -> Option<(f32, f32)> {
            self.collects += 1;
            Some(self.value)
        }
    }

    #[test]
    fn pipelined_sensor_reads_previous_conversion() {
        let mut pipeline = PipelinedSensor::new(FakeConversion {
            value: (55.0, 25.0),
            ..Default::default()
        });

        // Nothing converted yet
        assert!(pipeline.read_humidity().is_nan());
        assert!(pipeline.read_temperature(false).is_nan());
        assert_eq!(pipeline.sensor.triggers, 1);
        assert_eq!(pipeline.sensor.collects, 0);

        assert_eq!(pipeline.read_humidity(), 55.0);
        assert_eq!(pipeline.read_temperature(false), 25.0);
        assert!((pipeline.read_temperature(true) - 77.0).abs() < 1e-4);
        assert_eq!(pipeline.sensor.triggers, 2);
        assert_eq!(pipeline.sensor.collects, 1);
    }

    #[test]
    fn refused_trigger_is_not_collected() {
        let mut pipeline = PipelinedSensor::new(FakeConversion {
            refuse: true,
            value: (55.0, 25.0),
            ..Default::default()
        });
        pipeline.read_humidity();
        assert!(pipeline.read_humidity().is_nan());
        assert_eq!(pipeline.sensor.collects, 0);

        pipeline.sensor.refuse = false;
        pipeline.read_humidity();
        assert_eq!(pipeline.read_humidity(), 55.0);
    }

    #[derive(Clone)]
    struct FakeRow {
        level: Rc<Cell<bool>>,
    }

    impl ErrorType for FakeRow {
        type Error = Infallible;
    }

    impl OutputPin for FakeRow {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.level.set(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.level.set(true);
            Ok(())
        }
    }

    /// Column that reads high while its pressed row is strobed
    struct FakeCol {
        pressed_row: Rc<Cell<Option<usize>>>,
        rows: [Rc<Cell<bool>>; 2],
    }

    impl ErrorType for FakeCol {
        type Error = Infallible;
    }

    impl InputPin for FakeCol {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(self
                .pressed_row
                .get()
                .map(|r| self.rows[r].get())
                .unwrap_or(false))
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            self.is_high().map(|high| !high)
        }
    }

    type TwoByTwo = MatrixKeypad<FakeRow, FakeCol, 2, 2>;

    fn keypad() -> (TwoByTwo, [Rc<Cell<Option<usize>>>; 2]) {
        let levels = [Rc::new(Cell::new(false)), Rc::new(Cell::new(false))];
        let presses = [Rc::new(Cell::new(None)), Rc::new(Cell::new(None))];
        let rows = [
            FakeRow { level: levels[0].clone() },
            FakeRow { level: levels[1].clone() },
        ];
        let cols = [
            FakeCol { pressed_row: presses[0].clone(), rows: levels.clone() },
            FakeCol { pressed_row: presses[1].clone(), rows: levels.clone() },
        ];
        (MatrixKeypad::new(rows, cols, [['1', '2'], ['3', '4']]), presses)
    }

    #[test]
    fn matrix_reports_pressed_key() {
        let (mut keypad, presses) = keypad();
        assert_eq!(keypad.get_key(), None);

        // Row 1, column 0
        presses[0].set(Some(1));
        assert_eq!(keypad.get_key(), Some('3'));
    }

    #[test]
    fn held_key_is_reported_once() {
        let (mut keypad, presses) = keypad();
        presses[1].set(Some(0));
        assert_eq!(keypad.get_key(), Some('2'));
        assert_eq!(keypad.get_key(), None);
        assert_eq!(keypad.get_key(), None);

        presses[1].set(None);
        assert_eq!(keypad.get_key(), None);
        presses[1].set(Some(0));
        assert_eq!(keypad.get_key(), Some('2'));
    }
}
