use thiserror::Error;

use crate::timer::Duration;

/// Symbols printed on the 4x4 keypad, row by row
pub const KEYPAD_SYMBOLS: [[char; 4]; 4] = [
    ['1', '2', '3', 'A'],
    ['4', '5', '6', 'B'],
    ['7', '8', '9', 'C'],
    ['*', '0', '#', 'D'],
];

pub const CREDENTIAL_LEN: usize = 4;
pub const CREDENTIAL: &str = "1A2B";
pub const MAX_ATTEMPTS: u8 = 3;

pub const TEMPERATURE_LIMIT_C: f32 = 30.0;
pub const HUMIDITY_LIMIT_PCT: f32 = 70.0;
pub const LIGHT_LIMIT_RAW: u16 = 20;

pub const TEMPERATURE_WINDOW: usize = 25;
pub const HUMIDITY_WINDOW: usize = 25;
pub const LIGHT_WINDOW: usize = 15;

/// Main loop sleep between scheduler iterations
pub const POLL_INTERVAL_MS: u32 = 5;
pub const KEYPAD_PERIOD: Duration = Duration::millis(50);
pub const MONITOR_PERIOD: Duration = Duration::millis(200);
pub const CLIMATE_TIMEOUT: Duration = Duration::millis(5000); // Timeout5
pub const LIGHT_TIMEOUT: Duration = Duration::millis(3000); // Timeout3
pub const ALARM_TIMEOUT: Duration = Duration::millis(6000); // Timeout6
pub const LOCKOUT_TIMEOUT: Duration = Duration::millis(5000); // Timeout5
pub const NOTICE_HOLD: Duration = Duration::millis(1000);

pub const ALARM_TONE_HZ: u32 = 1000;
pub const ALARM_TONE: Duration = Duration::millis(200);

/// The keypad code that unlocks monitoring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Credential([char; CREDENTIAL_LEN]);

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CredentialError {
    #[error("credential must be 4 symbols, got {len}")]
    WrongLength { len: usize },

    #[error("'{symbol}' is not on the keypad")]
    InvalidSymbol { symbol: char },
}

impl Credential {
    /// Parses a credential made of exactly four keypad symbols
    /// param code: the symbols as typed on the keypad
    /// returns the credential, or the first problem found in `code`
    pub const fn parse(code: &str) -> Result<Self, CredentialError> {
        let bytes = code.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if !bytes[i].is_ascii() {
                return Err(CredentialError::InvalidSymbol {
                    symbol: char::REPLACEMENT_CHARACTER,
                });
            }
            if !is_keypad_symbol(bytes[i] as char) {
                return Err(CredentialError::InvalidSymbol {
                    symbol: bytes[i] as char,
                });
            }
            i += 1;
        }
        if bytes.len() != CREDENTIAL_LEN {
            return Err(CredentialError::WrongLength { len: bytes.len() });
        }

        let mut symbols = ['0'; CREDENTIAL_LEN];
        let mut i = 0;
        while i < CREDENTIAL_LEN {
            symbols[i] = bytes[i] as char;
            i += 1;
        }
        Ok(Credential(symbols))
    }

    /// Counts the positions where `entry` matches this credential
    pub fn matching_positions(&self, entry: &[char]) -> usize {
        self.0
            .iter()
            .zip(entry.iter())
            .filter(|(expected, got)| expected == got)
            .count()
    }
}

/// Fails the build if `CREDENTIAL` is not a valid credential
pub const DEFAULT_CREDENTIAL: Credential = match Credential::parse(CREDENTIAL) {
    Ok(credential) => credential,
    Err(_) => panic!("CREDENTIAL must be 4 keypad symbols"),
};

const fn is_keypad_symbol(symbol: char) -> bool {
    let mut row = 0;
    while row < KEYPAD_SYMBOLS.len() {
        let mut col = 0;
        while col < KEYPAD_SYMBOLS[row].len() {
            if KEYPAD_SYMBOLS[row][col] == symbol {
                return true;
            }
            col += 1;
        }
        row += 1;
    }
    false
}

/// Climate alarm limits; both must be exceeded to raise the alarm.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClimateLimits {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

/// Everything the greenhouse is built from. These are fixed at boot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Settings {
    pub credential: Credential,
    pub max_attempts: u8,
    pub climate: ClimateLimits,
    pub light_limit: u16,
    pub keypad_period: Duration,
    pub monitor_period: Duration,
    pub climate_timeout: Duration,
    pub light_timeout: Duration,
    pub alarm_timeout: Duration,
    pub lockout_timeout: Duration,
    pub notice_hold: Duration,
    pub alarm_tone_hz: u32,
    pub alarm_tone: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            credential: DEFAULT_CREDENTIAL,
            max_attempts: MAX_ATTEMPTS,
            climate: ClimateLimits {
                temperature_c: TEMPERATURE_LIMIT_C,
                humidity_pct: HUMIDITY_LIMIT_PCT,
            },
            light_limit: LIGHT_LIMIT_RAW,
            keypad_period: KEYPAD_PERIOD,
            monitor_period: MONITOR_PERIOD,
            climate_timeout: CLIMATE_TIMEOUT,
            light_timeout: LIGHT_TIMEOUT,
            alarm_timeout: ALARM_TIMEOUT,
            lockout_timeout: LOCKOUT_TIMEOUT,
            notice_hold: NOTICE_HOLD,
            alarm_tone_hz: ALARM_TONE_HZ,
            alarm_tone: ALARM_TONE,
        }
    }
}
