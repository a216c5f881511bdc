use time::{Date, Month};

use crate::bac::BacKeySpec;

use super::buffer::ScanBuffer;
use super::check_digit::check_digit;

/// Positions of the BAC relevant fields, counted back from the end of the buffer.
///
/// Both layouts end with the date of expiry check digit as the last character typed.
#[derive(Debug, Clone, Copy)]
pub(super) struct Layout {
    pub name: &'static str,
    pub min_len: usize,
    document_number: usize,
    document_number_check: usize,
    date_of_birth: usize,
    date_of_birth_check: usize,
    gender: usize,
    date_of_expiry: usize,
    date_of_expiry_check: usize,
}

const DOCUMENT_NUMBER_WIDTH: usize = 9;
const DATE_WIDTH: usize = 6;

/// ID-1 cards. Line 1 carries the document number, line 2 the dates:
///
/// ```text
/// I<NNNPPPPPPPPPC<<<<<<<<<<<<<<<
/// BBBBBBCGEEEEEECNNN<<<<<<<<<<<C
/// ```
pub(super) const TD1: Layout = Layout {
    name: "TD1",
    min_len: 40,
    document_number: 40,
    document_number_check: 31,
    date_of_birth: 15,
    date_of_birth_check: 9,
    gender: 8,
    date_of_expiry: 7,
    date_of_expiry_check: 1,
};

/// Passport books, line 2:
///
/// ```text
/// PPPPPPPPPCNNNBBBBBBCGEEEEEEC<<<<<<<<<<<<<<CC
/// ```
pub(super) const TD3: Layout = Layout {
    name: "TD3",
    min_len: 28,
    document_number: 28,
    document_number_check: 19,
    date_of_birth: 15,
    date_of_birth_check: 9,
    gender: 8,
    date_of_expiry: 7,
    date_of_expiry_check: 1,
};

/// The fields of one layout as found at the end of the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Fields {
    document_number: String,
    document_number_check: char,
    date_of_birth: String,
    date_of_birth_check: char,
    gender: char,
    date_of_expiry: String,
    date_of_expiry_check: char,
}

impl Layout {
    fn extract(&self, buffer: &ScanBuffer) -> Option<Fields> {
        if buffer.len() < self.min_len {
            return None;
        }
        Some(Fields {
            document_number: buffer.field_from_end(self.document_number, DOCUMENT_NUMBER_WIDTH)?,
            document_number_check: buffer.char_from_end(self.document_number_check)?,
            date_of_birth: buffer.field_from_end(self.date_of_birth, DATE_WIDTH)?,
            date_of_birth_check: buffer.char_from_end(self.date_of_birth_check)?,
            gender: buffer.char_from_end(self.gender)?,
            date_of_expiry: buffer.field_from_end(self.date_of_expiry, DATE_WIDTH)?,
            date_of_expiry_check: buffer.char_from_end(self.date_of_expiry_check)?,
        })
    }

    /// A BAC key if the end of the buffer is a valid instance of this layout.
    pub fn recognize(&self, buffer: &ScanBuffer, reference_year: i32) -> Option<BacKeySpec> {
        let fields = self.extract(buffer)?;
        let date_of_birth = parse_mrz_date(&fields.date_of_birth, reference_year)?;
        let date_of_expiry = parse_mrz_date(&fields.date_of_expiry, reference_year)?;

        let digits_match = [
            (&fields.date_of_birth, fields.date_of_birth_check),
            (&fields.date_of_expiry, fields.date_of_expiry_check),
            (&fields.document_number, fields.document_number_check),
        ]
        .iter()
        .all(|(field, check)| check_digit(field).ok() == Some(*check));

        if !digits_match || !matches!(fields.gender, 'M' | 'F' | '<') {
            return None;
        }

        BacKeySpec::new(fields.document_number, date_of_birth, date_of_expiry).ok()
    }
}

/// Parse `YYMMDD`, placing the year within 80 years before and 20 years after `reference_year`.
pub(super) fn parse_mrz_date(field: &str, reference_year: i32) -> Option<Date> {
    if field.len() != DATE_WIDTH || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let yy: i32 = field[0..2].parse().ok()?;
    let mm: u8 = field[2..4].parse().ok()?;
    let dd: u8 = field[4..6].parse().ok()?;

    let window_start = reference_year - 80;
    let mut year = window_start - window_start.rem_euclid(100) + yy;
    if year < window_start {
        year += 100;
    }

    Date::from_calendar_date(year, Month::try_from(mm).ok()?, dd).ok()
}

#[cfg(test)]
mod test {
    use time::macros::date;

    use super::*;

    fn buffer_of(s: &str) -> ScanBuffer {
        let mut buffer = ScanBuffer::new(256);
        for c in s.chars() {
            buffer.push(c, 0);
        }
        buffer
    }

    #[test]
    fn century_window() {
        assert_eq!(parse_mrz_date("711019", 2026), Some(date!(1971 - 10 - 19)));
        assert_eq!(parse_mrz_date("110828", 2026), Some(date!(2011 - 08 - 28)));
        assert_eq!(parse_mrz_date("450101", 2026), Some(date!(2045 - 01 - 01)));
        assert_eq!(parse_mrz_date("460101", 2026), Some(date!(1946 - 01 - 01)));
        assert_eq!(parse_mrz_date("991231", 2010), Some(date!(1999 - 12 - 31)));
    }

    #[test]
    fn rejects_invalid_dates() {
        assert_eq!(parse_mrz_date("711319", 2026), None);
        assert_eq!(parse_mrz_date("710230", 2026), None);
        assert_eq!(parse_mrz_date("71101<", 2026), None);
        assert_eq!(parse_mrz_date("7110", 2026), None);
    }

    #[test]
    fn recognizes_td3_line() {
        let buffer = buffer_of("1234567897NLD7110195F1108280");
        let key = TD3.recognize(&buffer, 2026).unwrap();
        assert_eq!(key.document_number(), "123456789");
        assert_eq!(key.date_of_birth(), date!(1971 - 10 - 19));
        assert_eq!(key.date_of_expiry(), date!(2011 - 08 - 28));
        assert!(TD1.recognize(&buffer, 2026).is_none());
    }

    #[test]
    fn recognizes_td1_lines() {
        let buffer = buffer_of("I<UTOD231458907<<<<<<<<<<<<<<<7408122F1204159");
        let key = TD1.recognize(&buffer, 2026).unwrap();
        assert_eq!(key.document_number(), "D23145890");
        assert_eq!(key.date_of_birth(), date!(1974 - 08 - 12));
        assert_eq!(key.date_of_expiry(), date!(2012 - 04 - 15));
    }

    #[test]
    fn requires_every_check_digit_and_gender() {
        for corrupted in [
            "1234567896NLD7110195F1108280",
            "1234567897NLD7110194F1108280",
            "1234567897NLD7110195F1108281",
            "1234567897NLD7110195X1108280",
        ] {
            assert!(TD3.recognize(&buffer_of(corrupted), 2026).is_none(), "{corrupted}");
        }
    }

    #[test]
    fn too_short_for_either_layout() {
        let buffer = buffer_of("234567897NLD7110195F1108280");
        assert!(TD3.recognize(&buffer, 2026).is_none());
        assert!(TD1.recognize(&buffer, 2026).is_none());
    }
}
