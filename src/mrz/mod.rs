//! Recognition of MRZ data typed, or sent by a keyboard-wedge scanner, into an arbitrary
//! keystroke stream.
//!
//! The recognizer keeps the most recent characters and, after every character, tests whether
//! the end of the stream is the BAC relevant part of an ID-1 (TD1) or passport (TD3) MRZ. A
//! candidate is only accepted when the check digits of the document number, date of birth and
//! date of expiry all match and the gender field is valid.
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::bac::BacKeySpec;

mod buffer;
mod check_digit;
mod layout;

pub use check_digit::{check_digit, Error};

use buffer::ScanBuffer;
use layout::{TD1, TD3};

pub const DEFAULT_TIMEOUT_MS: u64 = 3000;
pub const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MrzOptions {
    /// Inactivity after which buffered characters are discarded.
    pub timeout_ms: u64,
    /// Number of characters kept before the buffer starts over.
    pub capacity: usize,
    /// Two digit years are placed within 80 years before and 20 years after this year.
    pub reference_year: i32,
}

impl Default for MrzOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            capacity: DEFAULT_CAPACITY,
            reference_year: OffsetDateTime::now_utc().year(),
        }
    }
}

/// Streaming MRZ detector. Not meant to be shared between threads; feed it from the thread
/// that receives the input events.
#[derive(Debug, Clone)]
pub struct MrzRecognizer {
    options: MrzOptions,
    buffer: ScanBuffer,
}

impl Default for MrzRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl MrzRecognizer {
    pub fn new() -> Self {
        Self::with_options(MrzOptions::default())
    }

    pub fn with_options(options: MrzOptions) -> Self {
        Self {
            buffer: ScanBuffer::new(options.capacity.max(TD1.min_len)),
            options,
        }
    }

    pub fn options(&self) -> &MrzOptions {
        &self.options
    }

    /// Number of characters currently buffered.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Feed one character typed at `timestamp_millis`.
    ///
    /// Returns the BAC key when this character completes an MRZ. The buffer is cleared after a
    /// recognition, so the same MRZ is reported once.
    pub fn feed(&mut self, c: char, timestamp_millis: u64) -> Option<BacKeySpec> {
        if let Some(idle) = self.buffer.idle_for(timestamp_millis) {
            if idle > self.options.timeout_ms {
                tracing::trace!(idle, "discarding stale MRZ input");
                self.buffer.reset();
            }
        }
        self.buffer.push(c.to_ascii_uppercase(), timestamp_millis);

        let reference_year = self.options.reference_year;
        let (layout, key) = [TD1, TD3].into_iter().find_map(|layout| {
            layout
                .recognize(&self.buffer, reference_year)
                .map(|key| (layout, key))
        })?;

        tracing::debug!(layout = layout.name, "recognized MRZ");
        self.buffer.reset();
        Some(key)
    }

    /// Feed a sequence of characters that all arrive at `timestamp_millis`.
    pub fn feed_str(&mut self, s: &str, timestamp_millis: u64) -> Vec<BacKeySpec> {
        s.chars()
            .filter_map(|c| self.feed(c, timestamp_millis))
            .collect()
    }
}

#[cfg(test)]
mod test {
    use time::macros::date;
    use time::{Date, Month};

    use super::*;

    const TD3_LINE_1: &str = "P<NLDDE<BRUIJN<<WILLEKE<LISELOTTE<<<<<<<<<<<";
    const TD3_LINE_2: &str = "1234567897NLD7110195F1108280<<<<<<<<<<<<<<02";

    fn recognizer() -> MrzRecognizer {
        MrzRecognizer::with_options(MrzOptions {
            reference_year: 2026,
            ..MrzOptions::default()
        })
    }

    fn stream(recognizer: &mut MrzRecognizer, input: &str, start: u64, step: u64) -> Vec<BacKeySpec> {
        input
            .chars()
            .enumerate()
            .filter_map(|(i, c)| recognizer.feed(c, start + i as u64 * step))
            .collect()
    }

    #[test_log::test]
    fn recognizes_passport_typed_character_by_character() {
        let mut recognizer = recognizer();
        let input = format!("{TD3_LINE_1}\n{TD3_LINE_2}\n");
        let keys = stream(&mut recognizer, &input, 1_000, 50);
        assert_eq!(keys.len(), 1);
        assert_eq!(
            keys[0],
            BacKeySpec::new("123456789", date!(1971 - 10 - 19), date!(2011 - 08 - 28)).unwrap()
        );
        // Only what was typed after the recognition remains.
        assert_eq!(recognizer.buffered(), TD3_LINE_2.len() - 28 + 1);
    }

    #[test]
    fn lower_case_input_is_upper_cased() {
        let mut recognizer = recognizer();
        let keys = recognizer.feed_str("l898902c<3utO6908061f9406236", 0);
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].document_number(), "L898902C<");
    }

    #[test]
    fn corrupted_check_digit_is_never_accepted() {
        let mut recognizer = recognizer();
        let corrupted = TD3_LINE_2.replacen("7110195", "7110196", 1);
        let input = format!("{TD3_LINE_1}{corrupted}");
        assert!(stream(&mut recognizer, &input, 0, 10).is_empty());
    }

    #[test]
    fn pause_longer_than_timeout_discards_prefix() {
        let mut recognizer = recognizer();
        let (head, tail) = TD3_LINE_2.split_at(10);
        let mut keys = stream(&mut recognizer, head, 0, 10);
        keys.extend(stream(&mut recognizer, tail, 10 * 10 + DEFAULT_TIMEOUT_MS + 1, 10));
        assert!(keys.is_empty());
    }

    #[test]
    fn pause_within_timeout_keeps_prefix() {
        let mut recognizer = recognizer();
        let (head, tail) = TD3_LINE_2.split_at(10);
        let mut keys = stream(&mut recognizer, head, 0, 10);
        keys.extend(stream(&mut recognizer, tail, 90 + DEFAULT_TIMEOUT_MS, 10));
        assert_eq!(keys.len(), 1);
    }

    #[test]
    fn recognizes_id_card() {
        let mut recognizer = recognizer();
        // TD1 spans two lines, so the lines must arrive without separators.
        let input = "I<UTOD231458907<<<<<<<<<<<<<<<7408122F1204159UTO<<<<<<<<<<<6ERIKSSON<<ANNA<MARIA<<<<<<<<<<";
        let keys = stream(&mut recognizer, input, 0, 5);
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].document_number(), "D23145890");
    }

    proptest::proptest! {
        /// Every well formed passport line yields the key it was printed from.
        #[test]
        fn td3_line_yields_its_key(
            number in "[A-Z0-9]{9}",
            birth in (1946i32..=2045, 1u8..=12, 1u8..=28),
            expiry in (1946i32..=2045, 1u8..=12, 1u8..=28),
        ) {
            let date = |(y, m, d): (i32, u8, u8)| {
                Date::from_calendar_date(y, Month::try_from(m).unwrap(), d).unwrap()
            };
            let key = BacKeySpec::new(number, date(birth), date(expiry)).unwrap();
            let field = |s: String| format!("{s}{}", check_digit(&s).unwrap());
            let line = format!(
                "{}UTO{}M{}",
                field(key.document_number().to_string()),
                field(key.date_of_birth_mrz()),
                field(key.date_of_expiry_mrz()),
            );

            let keys = recognizer().feed_str(&line, 0);
            proptest::prop_assert_eq!(keys, vec![key]);
        }
    }

    #[test]
    fn starts_over_when_capacity_is_exceeded() {
        let mut recognizer = MrzRecognizer::with_options(MrzOptions {
            capacity: 40,
            reference_year: 2026,
            ..MrzOptions::default()
        });
        // 20 characters of noise plus the 28 character line exceed the capacity.
        let input = format!("{}{}", "X".repeat(20), &TD3_LINE_2[..28]);
        let keys = stream(&mut recognizer, &input, 0, 1);
        assert!(keys.is_empty());
        assert_eq!(recognizer.buffered(), 8);
    }
}
