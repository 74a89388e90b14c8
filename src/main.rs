#![no_std]
#![no_main]

use bme680::{Bme680, I2CAddress, IIRFilterSize, OversamplingSetting, SettingsBuilder};
use bsp::entry;
use defmt::*;
use defmt_rtt as _;
use panic_probe as _;

// Provide an alias for our BSP so we can switch targets quickly.
use rp_pico as bsp;

use bsp::hal::{
    adc::{Adc, AdcPin},
    clocks::{init_clocks_and_plls, Clock},
    pac,
    pio::PIOExt,
    pwm::Slices,
    watchdog::Watchdog,
    Timer,
};
use greenhouse_sentinel::actuators::{PinBuzzer, PwmIndicator};
use greenhouse_sentinel::board::{Bme680Sensor, PhotoResistor, PicoClock};
use greenhouse_sentinel::config::{Settings, KEYPAD_SYMBOLS};
use greenhouse_sentinel::sensors::{MatrixKeypad, PipelinedSensor};
use greenhouse_sentinel::{Devices, Greenhouse};
use i2c_pio::I2C;
use lcd1602_rs::LCD1602;
use rp_pico::hal;
use rp_pico::hal::fugit::RateExtU32;

#[entry]
fn main() -> ! {
    info!("Greenhouse Sentinel starting");
    // Grab our singleton objects
    let mut pac = pac::Peripherals::take().unwrap();

    // Set up the watchdog driver - needed by the clock setup code
    let mut watchdog = Watchdog::new(pac.WATCHDOG);

    // The default is to generate a 125 MHz system clock
    let clocks = init_clocks_and_plls(
        bsp::XOSC_CRYSTAL_FREQ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .ok()
    .unwrap();

    let sio = hal::Sio::new(pac.SIO);
    let pins = bsp::Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    let mut delay = Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);

    let (mut pio, sm0, _, _, _) = pac.PIO0.split(&mut pac.RESETS);
    let i2c_pio = I2C::new(
        &mut pio,
        pins.gpio8,
        pins.gpio9,
        sm0,
        100.kHz(),
        clocks.system_clock.freq(),
    );

    // Set up BME680, no gas heater so a forced measurement stays short
    let mut bme = Bme680::init(i2c_pio, &mut delay, I2CAddress::Secondary).unwrap();
    let bme_settings = SettingsBuilder::new()
        .with_humidity_oversampling(OversamplingSetting::OS2x)
        .with_temperature_oversampling(OversamplingSetting::OS8x)
        .with_temperature_filter(IIRFilterSize::Size3)
        .with_run_gas(false)
        .build();
    bme.set_sensor_settings(&mut delay, bme_settings).unwrap();

    // Set up LCD1602
    let lcd = LCD1602::new(
        pins.gpio1.into_function(),
        pins.gpio0.into_function(),
        pins.gpio2.into_function(),
        pins.gpio3.into_function(),
        pins.gpio4.into_function(),
        pins.gpio5.into_function(),
        delay,
    )
    .ok()
    .unwrap();

    // Set up keypad, rows driven and columns pulled down
    let keypad = MatrixKeypad::new(
        [
            pins.gpio14.into_push_pull_output().into_dyn_pin(),
            pins.gpio15.into_push_pull_output().into_dyn_pin(),
            pins.gpio16.into_push_pull_output().into_dyn_pin(),
            pins.gpio17.into_push_pull_output().into_dyn_pin(),
        ],
        [
            pins.gpio18.into_pull_down_input().into_dyn_pin(),
            pins.gpio19.into_pull_down_input().into_dyn_pin(),
            pins.gpio20.into_pull_down_input().into_dyn_pin(),
            pins.gpio21.into_pull_down_input().into_dyn_pin(),
        ],
        KEYPAD_SYMBOLS,
    );

    // Set up buzzer
    let buzzer = PinBuzzer::new(pins.gpio6.into_push_pull_output());

    // Set up RGB indicator on PWM5 A/B and PWM6 A
    let slices = Slices::new(pac.PWM, &mut pac.RESETS);
    let mut pwm5 = slices.pwm5;
    pwm5.set_ph_correct();
    pwm5.enable();
    let mut pwm6 = slices.pwm6;
    pwm6.set_ph_correct();
    pwm6.enable();
    let mut red = pwm5.channel_a;
    red.output_to(pins.gpio10);
    let mut green = pwm5.channel_b;
    green.output_to(pins.gpio11);
    let mut blue = pwm6.channel_a;
    blue.output_to(pins.gpio12);
    let indicator = PwmIndicator::new(red, green, blue);

    // Set up photo-resistor
    let adc = Adc::new(pac.ADC, &mut pac.RESETS);
    let light_pin = AdcPin::new(pins.gpio26.into_floating_input()).ok().unwrap();
    let light = PhotoResistor::new(adc, light_pin);

    let devices = Devices {
        display: lcd,
        keypad,
        probe: PipelinedSensor::new(Bme680Sensor::new(bme, delay)),
        light,
        indicator,
        buzzer,
    };
    let clock = PicoClock::new(delay);

    info!("Greenhouse Sentinel ready");
    Greenhouse::new(Settings::default(), devices).run(&clock, &mut delay)
}
