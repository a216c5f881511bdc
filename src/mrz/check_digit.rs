const WEIGHTS: [u32; 3] = [7, 3, 1];

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("'{0}' is not an MRZ character")]
    InvalidCharacter(char),
}

/// Value of an MRZ character in the check digit computation.
fn value(c: char) -> Result<u32, Error> {
    match c {
        '<' => Ok(0),
        '0'..='9' => Ok(c as u32 - '0' as u32),
        'A'..='Z' => Ok(c as u32 - 'A' as u32 + 10),
        _ => Err(Error::InvalidCharacter(c)),
    }
}

/// ICAO 9303 check digit of an MRZ field.
pub fn check_digit(field: &str) -> Result<char, Error> {
    let mut sum = 0;
    for (i, c) in field.chars().enumerate() {
        sum = (sum + value(c)? * WEIGHTS[i % WEIGHTS.len()]) % 10;
    }
    // sum is a single decimal digit.
    Ok(char::from(b'0' + sum as u8))
}
