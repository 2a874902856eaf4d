//! Typed access to a bundle's front-matter metadata.
//!
//! The content parser hands back a flat `key → value` string mapping. This
//! module turns entries of that mapping into typed values on demand:
//!
//! - **Scalars** ([`ScalarValue`]): strings, booleans, integers, dates,
//!   content paths and tags. Dates are parsed with the site's configured
//!   chrono format; a value matching only the date part of that format is
//!   accepted at midnight UTC.
//! - **Lists**: `Vec<T>` of any scalar, written comma-separated
//!   (`tags: rust, web`). Entries are trimmed and empty entries dropped.
//! - **Structured values** ([`FromMetadata`]): decoded from the entries that
//!   share a dotted prefix. For `audio`, the decoder handed to
//!   [`FromMetadata::from_metadata`] sees `audio.url` as `url` and a bare
//!   `audio` entry as its [`self_value`](MetadataDecoder::self_value).
//!
//! ## Absent vs. wrong
//!
//! [`decode_if_present`](MetadataDecoder::decode_if_present) distinguishes a
//! missing key (`Ok(None)`) from a key whose value cannot be converted
//! (`Err`). Required decoding through [`decode`](MetadataDecoder::decode)
//! turns a missing key into [`DecodeError::KeyNotFound`]. Callers that report
//! errors rely on [`DecodeError::value_found`] to tell the two apart.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("missing metadata field `{key}` (expected {expected})")]
    KeyNotFound { key: String, expected: &'static str },
    #[error("metadata field `{key}` is not a valid {expected}: `{found}`")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: String,
    },
    #[error("metadata field `{key}` is invalid: {reason}")]
    DataCorrupted { key: String, reason: String },
}

impl DecodeError {
    /// Fully qualified key of the offending field, e.g. `audio.duration`.
    pub fn key(&self) -> &str {
        match self {
            DecodeError::KeyNotFound { key, .. }
            | DecodeError::TypeMismatch { key, .. }
            | DecodeError::DataCorrupted { key, .. } => key,
        }
    }

    /// Whether the field was present (with an unusable value) rather than missing.
    pub fn value_found(&self) -> bool {
        !matches!(self, DecodeError::KeyNotFound { .. })
    }
}

/// A value parsed from a single metadata string.
pub trait ScalarValue: Sized {
    /// Type name used in error messages.
    const EXPECTED: &'static str;

    /// Parse `raw`; `None` means the string is not a valid `Self`.
    fn parse_value(raw: &str, date_format: &str) -> Option<Self>;
}

/// A structured value decoded from a group of metadata entries.
///
/// Host-defined item metadata implements this trait and is decoded from the
/// root decoder, so its fields map directly to top-level keys.
pub trait FromMetadata: Sized {
    fn from_metadata(decoder: &MetadataDecoder<'_>) -> Result<Self, DecodeError>;
}

/// Anything [`MetadataDecoder::decode_if_present`] can produce.
pub trait Decodable: Sized {
    const EXPECTED: &'static str;

    /// Decode the value stored under `key`, or `Ok(None)` when there is none.
    fn decode_at(decoder: &MetadataDecoder<'_>, key: &str) -> Result<Option<Self>, DecodeError>;
}

/// Read-only view over a metadata mapping, optionally scoped to a prefix.
#[derive(Debug, Clone)]
pub struct MetadataDecoder<'a> {
    entries: BTreeMap<&'a str, &'a str>,
    self_value: Option<&'a str>,
    date_format: &'a str,
    /// Dotted prefix of this decoder within the root mapping, empty at the root.
    prefix: String,
}

impl<'a> MetadataDecoder<'a> {
    pub fn new(metadata: &'a BTreeMap<String, String>, date_format: &'a str) -> Self {
        Self {
            entries: metadata
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect(),
            self_value: None,
            date_format,
            prefix: String::new(),
        }
    }

    /// Decode an optional field.
    pub fn decode_if_present<T: Decodable>(&self, key: &str) -> Result<Option<T>, DecodeError> {
        T::decode_at(self, key)
    }

    /// Decode a required field.
    pub fn decode<T: Decodable>(&self, key: &str) -> Result<T, DecodeError> {
        T::decode_at(self, key)?.ok_or_else(|| DecodeError::KeyNotFound {
            key: self.qualified(key),
            expected: T::EXPECTED,
        })
    }

    /// The raw string stored under `key` in this scope.
    pub fn raw(&self, key: &str) -> Option<&'a str> {
        self.entries.get(key).copied()
    }

    /// The value of the bare key this decoder was scoped to (`audio` for the
    /// `audio.*` decoder), if there is one.
    pub fn self_value(&self) -> Option<&'a str> {
        self.self_value
    }

    pub fn date_format(&self) -> &'a str {
        self.date_format
    }

    /// Whether `key` has a value or any nested `key.*` entries.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key) || self.nested_entries(key).next().is_some()
    }

    /// Decoder scoped to `key`, or `None` when nothing is stored under it.
    pub fn nested(&self, key: &str) -> Option<MetadataDecoder<'a>> {
        if !self.contains(key) {
            return None;
        }
        Some(MetadataDecoder {
            entries: self.nested_entries(key).collect(),
            self_value: self.raw(key),
            date_format: self.date_format,
            prefix: self.qualified(key),
        })
    }

    /// Decode a structured value stored under `key`.
    pub fn decode_structured<T: FromMetadata>(&self, key: &str) -> Result<Option<T>, DecodeError> {
        match self.nested(key) {
            Some(nested) => T::from_metadata(&nested).map(Some),
            None => Ok(None),
        }
    }

    /// `key` qualified with this decoder's prefix, for error reporting.
    pub fn qualified(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.prefix, key)
        }
    }

    fn nested_entries<'s>(&'s self, key: &'s str) -> impl Iterator<Item = (&'a str, &'a str)> + 's {
        self.entries.iter().filter_map(move |(&k, &v)| {
            k.strip_prefix(key)
                .and_then(|rest| rest.strip_prefix('.'))
                .filter(|rest| !rest.is_empty())
                .map(|rest| (rest, v))
        })
    }

    fn scalar<T: ScalarValue>(&self, key: &str) -> Result<Option<T>, DecodeError> {
        let Some(raw) = self.raw(key) else {
            return Ok(None);
        };
        T::parse_value(raw, self.date_format)
            .map(Some)
            .ok_or_else(|| DecodeError::TypeMismatch {
                key: self.qualified(key),
                expected: T::EXPECTED,
                found: raw.to_string(),
            })
    }
}

macro_rules! scalar_decodable {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Decodable for $ty {
                const EXPECTED: &'static str = <$ty as ScalarValue>::EXPECTED;

                fn decode_at(
                    decoder: &MetadataDecoder<'_>,
                    key: &str,
                ) -> Result<Option<Self>, DecodeError> {
                    decoder.scalar(key)
                }
            }
        )*
    };
}

scalar_decodable!(
    String,
    bool,
    u32,
    u64,
    i64,
    DateTime<Utc>,
    crate::types::ContentPath,
    crate::types::Tag,
);

impl<T: ScalarValue> Decodable for Vec<T> {
    const EXPECTED: &'static str = "comma-separated list";

    fn decode_at(decoder: &MetadataDecoder<'_>, key: &str) -> Result<Option<Self>, DecodeError> {
        let Some(raw) = decoder.raw(key) else {
            return Ok(None);
        };
        raw.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                T::parse_value(entry, decoder.date_format()).ok_or_else(|| {
                    DecodeError::TypeMismatch {
                        key: decoder.qualified(key),
                        expected: T::EXPECTED,
                        found: entry.to_string(),
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}

impl ScalarValue for String {
    const EXPECTED: &'static str = "string";

    fn parse_value(raw: &str, _date_format: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

impl ScalarValue for bool {
    const EXPECTED: &'static str = "boolean";

    fn parse_value(raw: &str, _date_format: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ScalarValue for u32 {
    const EXPECTED: &'static str = "unsigned integer";

    fn parse_value(raw: &str, _date_format: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }
}

impl ScalarValue for u64 {
    const EXPECTED: &'static str = "unsigned integer";

    fn parse_value(raw: &str, _date_format: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }
}

impl ScalarValue for i64 {
    const EXPECTED: &'static str = "integer";

    fn parse_value(raw: &str, _date_format: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }
}

impl ScalarValue for DateTime<Utc> {
    const EXPECTED: &'static str = "date";

    fn parse_value(raw: &str, date_format: &str) -> Option<Self> {
        parse_date(raw.trim(), date_format)
    }
}

/// Parse a metadata date with the configured format.
///
/// Falls back to parsing the value as a bare date so `2024-03-01` is accepted
/// under the default `%Y-%m-%d %H:%M` format. The date-only fallback uses
/// the part of the format before the first space.
pub fn parse_date(raw: &str, date_format: &str) -> Option<DateTime<Utc>> {
    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, date_format) {
        return Some(datetime.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, date_format) {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    let date_part = date_format.split_whitespace().next()?;
    NaiveDate::parse_from_str(raw, date_part)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}
