use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

use crate::timer::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    pub const OFF: Color = Color::new(0, 0, 0);
    pub const RED: Color = Color::new(255, 0, 0);
    pub const AMBER: Color = Color::new(255, 120, 0);

    pub const fn new(red: u8, green: u8, blue: u8) -> Color {
        Color { red, green, blue }
    }
}

/// Tri-color status light
pub trait Indicator {
    fn set_color(&mut self, color: Color);
}

/// Audible alarm output
pub trait Buzzer {
    /// Starts a tone. Must not block for `duration`.
    fn sound_at(&mut self, frequency_hz: u32, duration: Duration);
    fn silence(&mut self);
}

/// Active buzzer on a plain output pin.
///
/// The part picks its own pitch, so the frequency is ignored, and it keeps
/// sounding until [`Buzzer::silence`] is called.
pub struct PinBuzzer<P> {
    pin: P,
}

impl<P: OutputPin> PinBuzzer<P> {
    pub fn new(mut pin: P) -> Self {
        pin.set_low().ok();
        Self { pin }
    }
}

impl<P: OutputPin> Buzzer for PinBuzzer<P> {
    fn sound_at(&mut self, _frequency_hz: u32, _duration: Duration) {
        if self.pin.set_high().is_err() {
            warn!("buzzer pin refused to go high");
        }
    }

    fn silence(&mut self) {
        if self.pin.set_low().is_err() {
            warn!("buzzer pin refused to go low");
        }
    }
}

/// Common-cathode RGB LED with one PWM channel per color
pub struct PwmIndicator<R, G, B> {
    red: R,
    green: G,
    blue: B,
}

impl<R, G, B> PwmIndicator<R, G, B>
where
    R: SetDutyCycle,
    G: SetDutyCycle,
    B: SetDutyCycle,
{
    pub fn new(red: R, green: G, blue: B) -> Self {
        let mut indicator = Self { red, green, blue };
        indicator.set_color(Color::OFF);
        indicator
    }
}

impl<R, G, B> Indicator for PwmIndicator<R, G, B>
where
    R: SetDutyCycle,
    G: SetDutyCycle,
    B: SetDutyCycle,
{
    fn set_color(&mut self, color: Color) {
        let red = self.red.set_duty_cycle_fraction(color.red.into(), u8::MAX.into());
        let green = self.green.set_duty_cycle_fraction(color.green.into(), u8::MAX.into());
        let blue = self.blue.set_duty_cycle_fraction(color.blue.into(), u8::MAX.into());
        if red.is_err() || green.is_err() || blue.is_err() {
            warn!("indicator rejected color {}", color);
        }
    }
}
