//! # NMEA sentence codec
//!
//! Parses and renders NMEA 0183 style sentences of the form
//! `$TTSSS,field1,field2*CS`:
//!
//! - `TT` is a two character talker id (`ZC` for the CTD protocol)
//! - `SSS` is the three character sentence id (`CMD`, `ACK`, ...)
//! - `*CS` is an optional checksum: XOR of every byte between `$` and `*`,
//!   as two hex digits. It is validated when present and always written on
//!   output.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::todo
)]

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length of the address field after `$` (talker + sentence id).
const ADDRESS_LEN: usize = 5;
const TALKER_LEN: usize = 2;

/// Why a line could not be decoded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SentenceError {
    #[error("empty sentence")]
    Empty,

    #[error("sentence contains non-ASCII characters")]
    NonAscii,

    #[error("sentence must start with '$': {0}")]
    MissingStart(String),

    #[error("invalid address field '{0}': expected 2 character talker and 3 character sentence id")]
    InvalidAddress(String),

    #[error("malformed checksum '{0}': expected two hex digits after '*'")]
    BadChecksumFormat(String),

    #[error("checksum mismatch: computed {expected:02X}, sentence says {actual:02X}")]
    ChecksumMismatch { expected: u8, actual: u8 },
}

/// A decoded sentence: talker, sentence id and the ordered data fields.
///
/// `fields` does not include the address, so `field(0)` is the first value
/// after the `$TTSSS,` prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    talker: String,
    id: String,
    fields: Vec<String>,
}

impl Sentence {
    /// Build a sentence for output. Talker and id are not validated here;
    /// `parse` is the validating entry point.
    pub fn new(
        talker: impl Into<String>,
        id: impl Into<String>,
        fields: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            talker: talker.into(),
            id: id.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Decode and validate one line. Trailing `\r`/`\n` are ignored.
    pub fn parse(line: &str) -> Result<Self, SentenceError> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            return Err(SentenceError::Empty);
        }
        if !line.is_ascii() {
            return Err(SentenceError::NonAscii);
        }

        let Some(rest) = line.strip_prefix('$') else {
            return Err(SentenceError::MissingStart(line.to_string()));
        };

        let body = match rest.split_once('*') {
            Some((body, cs)) => {
                let actual = parse_checksum(cs)?;
                let expected = checksum(body);
                if expected != actual {
                    return Err(SentenceError::ChecksumMismatch { expected, actual });
                }
                body
            }
            None => rest,
        };

        let mut parts = body.split(',');
        let address = parts.next().unwrap_or_default();
        let (talker, id) = split_address(address)?;

        Ok(Self {
            talker: talker.to_string(),
            id: id.to_string(),
            fields: parts.map(str::to_string).collect(),
        })
    }

    pub fn talker(&self) -> &str {
        &self.talker
    }

    /// Three character sentence identifier (`ACK` for `$ZCACK,...`).
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    /// Everything between `$` and `*`.
    pub fn body(&self) -> String {
        let mut body = format!("{}{}", self.talker, self.id);
        for field in &self.fields {
            body.push(',');
            body.push_str(field);
        }
        body
    }

    /// Render with checksum, without line terminator: `$ZCCMD,START*3F`.
    pub fn to_line(&self) -> String {
        let body = self.body();
        format!("${}*{:02X}", body, checksum(&body))
    }
}

impl fmt::Display for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line())
    }
}

impl FromStr for Sentence {
    type Err = SentenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// XOR of all bytes of `body` (the text between `$` and `*`).
pub fn checksum(body: &str) -> u8 {
    body.bytes().fold(0, |acc, b| acc ^ b)
}

fn parse_checksum(cs: &str) -> Result<u8, SentenceError> {
    if cs.len() != 2 || !cs.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(SentenceError::BadChecksumFormat(cs.to_string()));
    }
    u8::from_str_radix(cs, 16).map_err(|_| SentenceError::BadChecksumFormat(cs.to_string()))
}

fn split_address(address: &str) -> Result<(&str, &str), SentenceError> {
    let valid = address.len() == ADDRESS_LEN && address.bytes().all(|b| b.is_ascii_alphanumeric());
    match (valid, address.get(..TALKER_LEN), address.get(TALKER_LEN..)) {
        (true, Some(talker), Some(id)) => Ok((talker, id)),
        _ => Err(SentenceError::InvalidAddress(address.to_string())),
    }
}
