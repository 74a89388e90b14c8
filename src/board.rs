use bme680::{Bme680, FieldDataCondition, PowerMode};
use embedded_hal_0_2::adc::{Channel, OneShot};
use i2c_pio::I2C;
use lcd1602_rs::LCD1602;
use rp_pico::hal::gpio::bank0::{Gpio0, Gpio1, Gpio2, Gpio3, Gpio4, Gpio5, Gpio8, Gpio9};
use rp_pico::hal::gpio::{FunctionNull, FunctionSio, Pin, PullDown, SioOutput};
use rp_pico::hal::pio::SM0;
use rp_pico::hal::Timer;
use rp_pico::pac::PIO0;

use crate::rendering::Display;
use crate::sensors::{ForcedMeasurement, LightSensor};
use crate::timer::{Clock, Instant};

type Output<P> = Pin<P, FunctionSio<SioOutput>, PullDown>;

pub type Bme<'a> = Bme680<
    I2C<'a, PIO0, SM0, Pin<Gpio8, FunctionNull, PullDown>, Pin<Gpio9, FunctionNull, PullDown>>,
    Timer,
>;

pub type Lcd = LCD1602<
    Output<Gpio1>,
    Output<Gpio0>,
    Output<Gpio2>,
    Output<Gpio3>,
    Output<Gpio4>,
    Output<Gpio5>,
    Timer,
>;

/// Millisecond clock on top of the 1 MHz hardware timer
pub struct PicoClock {
    timer: Timer,
}

impl PicoClock {
    pub fn new(timer: Timer) -> Self {
        Self { timer }
    }
}

impl Clock for PicoClock {
    fn now(&self) -> Instant {
        Instant::from_ticks(self.timer.get_counter().ticks() / 1000)
    }
}

/// BME680 driven one forced conversion at a time. Wrap it in
/// [`PipelinedSensor`](crate::sensors::PipelinedSensor) so the climate task never waits on a conversion.
pub struct Bme680Sensor<'a> {
    bme: Bme<'a>,
    delay: Timer,
}

impl<'a> Bme680Sensor<'a> {
    pub fn new(bme: Bme<'a>, delay: Timer) -> Self {
        Self { bme, delay }
    }
}

impl ForcedMeasurement for Bme680Sensor<'_> {
    fn trigger(&mut self) -> bool {
        // The chip is back in sleep once a conversion ends, so this is a
        // single register write
        let started = self
            .bme
            .set_sensor_mode(&mut self.delay, PowerMode::ForcedMode)
            .is_ok();
        if !started {
            warn!("bme680 refused forced mode");
        }
        started
    }

    fn collect(&mut self) -> Option<(f32, f32)> {
        match self.bme.get_sensor_data(&mut self.delay) {
            Ok((data, FieldDataCondition::NewData)) => {
                Some((data.humidity_percent(), data.temperature_celsius()))
            }
            Ok((_, FieldDataCondition::Unchanged)) => {
                warn!("bme680 conversion not finished");
                None
            }
            Err(_) => {
                warn!("bme680 read failed");
                None
            }
        }
    }
}

impl Display for Lcd {
    fn clear(&mut self) {
        if LCD1602::clear(self).is_err() {
            warn!("lcd clear failed");
        }
    }

    fn set_cursor(&mut self, col: u8, row: u8) {
        if self.set_position(col, row).is_err() {
            warn!("lcd cursor move failed");
        }
    }

    fn print(&mut self, text: &str) {
        if LCD1602::print(self, text).is_err() {
            warn!("lcd write failed");
        }
    }
}

/// Photo-resistor divider on an ADC input. The 12 bit conversion is scaled
/// down to the 10 bit range the thresholds are written for.
pub struct PhotoResistor<A, P> {
    adc: A,
    pin: P,
    last: u16,
}

impl<A, P> PhotoResistor<A, P> {
    pub fn new(adc: A, pin: P) -> Self {
        Self { adc, pin, last: 0 }
    }
}

impl<A, P> LightSensor for PhotoResistor<A, P>
where
    A: OneShot<A, u16, P>,
    P: Channel<A>,
{
    fn read_raw(&mut self) -> u16 {
        match self.adc.read(&mut self.pin) {
            Ok(raw) => self.last = raw >> 2,
            Err(_) => warn!("adc conversion not ready, keeping {}", self.last),
        }
        self.last
    }
}
