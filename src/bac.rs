//! The key material for Basic Access Control, as printed in the MRZ.
use std::fmt;

use serde::{Deserialize, Serialize};
use time::format_description::FormatItem;
use time::macros::format_description;
use time::Date;

const DOCUMENT_NUMBER_LENGTH: usize = 9;
const MRZ_DATE: &[FormatItem<'static>] = format_description!("[year repr:last_two][month][day]");

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("illegal document number '{0}'")]
    IllegalDocumentNumber(String),
}

/// Document number, date of birth and date of expiry of a travel document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawBacKeySpec")]
pub struct BacKeySpec {
    document_number: String,
    #[serde(with = "iso_date")]
    date_of_birth: Date,
    #[serde(with = "iso_date")]
    date_of_expiry: Date,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBacKeySpec {
    document_number: String,
    #[serde(with = "iso_date")]
    date_of_birth: Date,
    #[serde(with = "iso_date")]
    date_of_expiry: Date,
}

impl TryFrom<RawBacKeySpec> for BacKeySpec {
    type Error = Error;

    fn try_from(raw: RawBacKeySpec) -> Result<Self, Self::Error> {
        BacKeySpec::new(raw.document_number, raw.date_of_birth, raw.date_of_expiry)
    }
}

impl BacKeySpec {
    /// The document number is upper-cased and padded with `<` fillers to nine characters.
    pub fn new(
        document_number: impl Into<String>,
        date_of_birth: Date,
        date_of_expiry: Date,
    ) -> Result<Self, Error> {
        let document_number = document_number.into();
        let trimmed = document_number.trim();
        if trimmed.is_empty()
            || !trimmed
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '<')
        {
            return Err(Error::IllegalDocumentNumber(document_number));
        }
        let mut normalized = trimmed.to_ascii_uppercase();
        while normalized.len() < DOCUMENT_NUMBER_LENGTH {
            normalized.push('<');
        }
        Ok(Self {
            document_number: normalized,
            date_of_birth,
            date_of_expiry,
        })
    }

    pub fn document_number(&self) -> &str {
        &self.document_number
    }

    pub fn date_of_birth(&self) -> Date {
        self.date_of_birth
    }

    pub fn date_of_expiry(&self) -> Date {
        self.date_of_expiry
    }

    /// Date of birth in MRZ form, `YYMMDD`.
    pub fn date_of_birth_mrz(&self) -> String {
        mrz_date(self.date_of_birth)
    }

    /// Date of expiry in MRZ form, `YYMMDD`.
    pub fn date_of_expiry_mrz(&self) -> String {
        mrz_date(self.date_of_expiry)
    }
}

fn mrz_date(date: Date) -> String {
    // Every Date is representable with this description.
    date.format(MRZ_DATE).unwrap_or_default()
}

impl fmt::Display for BacKeySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}",
            self.document_number,
            self.date_of_birth_mrz(),
            self.date_of_expiry_mrz()
        )
    }
}

#[cfg(test)]
mod test {
    use time::macros::date;

    use super::*;

    #[test]
    fn pads_short_document_numbers() {
        let key = BacKeySpec::new("ab12", date!(1971 - 10 - 19), date!(2011 - 08 - 28)).unwrap();
        assert_eq!(key.document_number(), "AB12<<<<<");
        assert_eq!(key.to_string(), "AB12<<<<<, 711019, 110828");
    }

    #[test]
    fn rejects_illegal_document_numbers() {
        assert!(BacKeySpec::new("", date!(1971 - 10 - 19), date!(2011 - 08 - 28)).is_err());
        assert!(BacKeySpec::new("12 34", date!(1971 - 10 - 19), date!(2011 - 08 - 28)).is_err());
    }

    #[test]
    fn equality_is_by_value() {
        let a = BacKeySpec::new("123456789", date!(1971 - 10 - 19), date!(2011 - 08 - 28));
        let b = BacKeySpec::new("123456789", date!(1971 - 10 - 19), date!(2011 - 08 - 28));
        assert_eq!(a, b);
    }

    #[test]
    fn json_uses_iso_dates() {
        let key =
            BacKeySpec::new("123456789", date!(1971 - 10 - 19), date!(2011 - 08 - 28)).unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(
            json,
            r#"{"documentNumber":"123456789","dateOfBirth":"1971-10-19","dateOfExpiry":"2011-08-28"}"#
        );
        let back: BacKeySpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
        assert!(serde_json::from_str::<BacKeySpec>(
            r#"{"documentNumber":"","dateOfBirth":"1971-10-19","dateOfExpiry":"2011-08-28"}"#
        )
        .is_err());
    }
}
