use heapless::Vec;

use crate::config::{Credential, Settings, CREDENTIAL_LEN};
use crate::rendering::{render_lines, render_mask, Display};
use crate::sensors::Keypad;
use crate::signal::{Input, Signal};
use crate::timer::{Duration, Instant};

pub const PROMPT: &str = "Enter password";

/// What a single step concluded, if anything
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GateEvent {
    /// A key was taken into the entry buffer
    Key { entered: usize },
    Granted,
    Denied { attempts_left: u8 },
    LockedOut,
    /// The grant notice finished and MonitorTH was raised
    Released,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AfterHold {
    Release,
    Retry,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Collecting,
    Holding { until: Instant, then: AfterHold },
    /// Ignores the keypad until the next reset
    Closed,
}

/// Password check that runs inside the Init state.
///
/// ```text
///             4th key, match            hold expired
///  Collecting ──────────────► Holding ──────────────► Closed  (raises MonitorTH)
///      ▲                        │
///      │     hold expired       │ 4th key, mismatch, tries left
///      └────────────────────────┘
///      │
///      │ 4th key, mismatch, no tries left
///      └──────────────────────────────────────────────► Closed  (raises Blocked)
/// ```
pub struct AccessGate {
    credential: Credential,
    max_attempts: u8,
    notice_hold: Duration,
    entry: Vec<char, CREDENTIAL_LEN>,
    correct: usize,
    mistakes: u8,
    phase: Phase,
}

impl AccessGate {
    pub fn new(settings: &Settings) -> Self {
        Self {
            credential: settings.credential,
            max_attempts: settings.max_attempts,
            notice_hold: settings.notice_hold,
            entry: Vec::new(),
            correct: 0,
            mistakes: 0,
            phase: Phase::Collecting,
        }
    }

    /// Starts a fresh password flow
    pub fn reset(&mut self) {
        self.entry.clear();
        self.correct = 0;
        self.mistakes = 0;
        self.phase = Phase::Collecting;
    }

    pub fn mistakes(&self) -> u8 {
        self.mistakes
    }

    /// Number of keys collected for the current attempt
    pub fn entered(&self) -> usize {
        self.entry.len()
    }

    /// Matching positions in the last evaluated attempt
    pub fn last_correct(&self) -> usize {
        self.correct
    }

    pub fn is_collecting(&self) -> bool {
        self.phase == Phase::Collecting
    }

    pub fn is_locked_out(&self) -> bool {
        self.phase == Phase::Closed && self.mistakes >= self.max_attempts
    }

    pub fn render_prompt<D: Display>(&self, lcd: &mut D) {
        render_lines(PROMPT, "", lcd);
    }

    /// Advances the password flow by at most one key
    /// param now: current time, used for the notice hold
    /// param keypad: polled once, and only while collecting
    /// param signal: receives MonitorTH or Blocked
    /// returns what this step concluded, if anything
    pub fn step<K, D>(
        &mut self,
        now: Instant,
        keypad: &mut K,
        lcd: &mut D,
        signal: &mut Signal,
    ) -> Option<GateEvent>
    where
        K: Keypad,
        D: Display,
    {
        match self.phase {
            Phase::Closed => None,
            Phase::Holding { until, then } => {
                if now < until {
                    return None;
                }
                match then {
                    AfterHold::Release => {
                        self.phase = Phase::Closed;
                        lcd.clear();
                        signal.raise(Input::MonitorTH);
                        Some(GateEvent::Released)
                    }
                    AfterHold::Retry => {
                        self.phase = Phase::Collecting;
                        self.render_prompt(lcd);
                        None
                    }
                }
            }
            Phase::Collecting => {
                let key = keypad.get_key()?;
                let position = self.entry.len();
                // Capacity is never hit, a full buffer is evaluated right away
                self.entry.push(key).ok();
                render_mask(position, lcd);

                if self.entry.len() < CREDENTIAL_LEN {
                    return Some(GateEvent::Key {
                        entered: self.entry.len(),
                    });
                }
                Some(self.evaluate(now, lcd, signal))
            }
        }
    }

    fn evaluate<D: Display>(&mut self, now: Instant, lcd: &mut D, signal: &mut Signal) -> GateEvent {
        self.correct = self.credential.matching_positions(&self.entry);
        self.entry.clear();

        if self.correct == CREDENTIAL_LEN {
            info!("password accepted");
            self.mistakes = 0;
            render_lines("Access granted", "", lcd);
            self.phase = Phase::Holding {
                until: now + self.notice_hold,
                then: AfterHold::Release,
            };
            return GateEvent::Granted;
        }

        self.mistakes = self.mistakes.saturating_add(1);
        if self.mistakes < self.max_attempts {
            let attempts_left = self.max_attempts - self.mistakes;
            warn!(
                "wrong password ({} of {} positions), {} tries left",
                self.correct,
                CREDENTIAL_LEN,
                attempts_left
            );
            let tries = crate::lcd_line!("Tries left: {}", attempts_left);
            render_lines("Wrong password", &tries, lcd);
            self.phase = Phase::Holding {
                until: now + self.notice_hold,
                then: AfterHold::Retry,
            };
            return GateEvent::Denied { attempts_left };
        }

        warn!("too many wrong passwords, locking out");
        self.phase = Phase::Closed;
        signal.raise(Input::Blocked);
        GateEvent::LockedOut
    }
}
