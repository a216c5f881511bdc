use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lowest and highest data group numbers defined by the LDS.
pub const MIN_DATA_GROUP: u8 = 1;
pub const MAX_DATA_GROUP: u8 = 16;

/// An elementary file of the Logical Data Structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FileId {
    Com,
    Sod,
    /// Data group 1 to 16.
    DataGroup(u8),
    Cvca,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("unknown LDS file '{0}'")]
    UnknownFile(String),
    #[error("data group number {0} out of range")]
    DataGroupOutOfRange(u8),
    #[error("tag 0x{0:02X} is not a data group tag")]
    NotADataGroupTag(u32),
}

impl FileId {
    pub fn data_group(number: u8) -> Result<Self, Error> {
        if (MIN_DATA_GROUP..=MAX_DATA_GROUP).contains(&number) {
            Ok(FileId::DataGroup(number))
        } else {
            Err(Error::DataGroupOutOfRange(number))
        }
    }

    /// The ICAO short file identifier.
    pub fn fid(&self) -> u16 {
        match self {
            FileId::Com => 0x011E,
            FileId::Sod => 0x011D,
            FileId::DataGroup(n) => 0x0100 + u16::from(*n),
            FileId::Cvca => 0x011C,
        }
    }

    /// The LDS tag of the file's outermost TLV, if it has one.
    pub fn tag(&self) -> Option<u32> {
        match self {
            FileId::Com => Some(0x60),
            FileId::Sod => Some(0x77),
            FileId::DataGroup(n) => data_group_tag(*n),
            FileId::Cvca => None,
        }
    }

    pub fn data_group_number(&self) -> Option<u8> {
        match self {
            FileId::DataGroup(n) => Some(*n),
            _ => None,
        }
    }
}

fn data_group_tag(number: u8) -> Option<u32> {
    let tag = match number {
        1 => 0x61,
        2 => 0x75,
        3 => 0x63,
        4 => 0x76,
        5..=14 => 0x60 + u32::from(number),
        15 => 0x6F,
        16 => 0x70,
        _ => return None,
    };
    Some(tag)
}

/// Map a tag from the EF.COM tag list to its data group number.
pub fn data_group_number_for_tag(tag: u32) -> Result<u8, Error> {
    (MIN_DATA_GROUP..=MAX_DATA_GROUP)
        .find(|n| data_group_tag(*n) == Some(tag))
        .ok_or(Error::NotADataGroupTag(tag))
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileId::Com => f.write_str("COM"),
            FileId::Sod => f.write_str("SOD"),
            FileId::DataGroup(n) => write!(f, "DG{n}"),
            FileId::Cvca => f.write_str("CVCA"),
        }
    }
}

impl FromStr for FileId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let name = upper.strip_prefix("EF.").unwrap_or(&upper);
        match name {
            "COM" => Ok(FileId::Com),
            "SOD" => Ok(FileId::Sod),
            "CVCA" => Ok(FileId::Cvca),
            _ => name
                .strip_prefix("DG")
                .and_then(|n| n.parse::<u8>().ok())
                .ok_or_else(|| Error::UnknownFile(s.to_string()))
                .and_then(FileId::data_group),
        }
    }
}

impl TryFrom<String> for FileId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FileId> for String {
    fn from(value: FileId) -> Self {
        value.to_string()
    }
}
