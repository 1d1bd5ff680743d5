use std::{fmt, str};

use chrono::NaiveDate;

use crate::encoder::{decode, encode};
use crate::fallback::FALLBACK_MARKER;

/// Where the suffix of a [`BusinessId`] came from.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum Origin {
    /// Encoded from a segment number, with the number and the digit width it was padded to.
    Segment { number: u64, width: usize },

    /// Produced by the random fallback generator.
    Fallback,
}

/// Represents a parsed identifier of the form `{prefix}-{YYYYMMDD}{suffix}`.
///
/// # Examples
///
/// ```rust
/// use dayseq::{BusinessId, Origin};
///
/// let id = "ORD-VIP-20240101AAAAC".parse::<BusinessId>()?;
/// assert_eq!(id.prefix(), "ORD-VIP");
/// assert_eq!(id.origin(), Origin::Segment { number: 1, width: 5 });
/// assert_eq!(id.to_string(), "ORD-VIP-20240101AAAAC");
/// # Ok::<(), dayseq::ParseError>(())
/// ```
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct BusinessId {
    prefix: String,
    date: NaiveDate,
    suffix: String,
    origin: Origin,
}

impl BusinessId {
    /// Returns everything before the last `-`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the date the identifier was minted for.
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub const fn origin(&self) -> Origin {
        self.origin
    }

    /// Returns true if the suffix came from the random fallback generator.
    pub const fn is_fallback(&self) -> bool {
        matches!(self.origin, Origin::Fallback)
    }
}

impl fmt::Display for BusinessId {
    /// Returns the `{prefix}-{YYYYMMDD}{suffix}` representation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}{}",
            self.prefix,
            self.date.format("%Y%m%d"),
            self.suffix
        )
    }
}

impl str::FromStr for BusinessId {
    type Err = ParseError;

    /// Creates an object from the `{prefix}-{YYYYMMDD}{suffix}` representation.
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        const ERR: ParseError = ParseError {};
        let (prefix, rest) = src.rsplit_once('-').ok_or(ERR)?;
        if prefix.is_empty() || rest.len() <= 8 || !rest.is_char_boundary(8) {
            return Err(ERR);
        }
        let (day, suffix) = rest.split_at(8);
        if !day.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ERR);
        }
        let date = NaiveDate::parse_from_str(day, "%Y%m%d").map_err(|_| ERR)?;

        let origin = if suffix.starts_with(FALLBACK_MARKER) {
            if !suffix.bytes().all(|b| b.is_ascii_uppercase()) {
                return Err(ERR);
            }
            Origin::Fallback
        } else {
            let number = decode(suffix).ok_or(ERR)?;
            Origin::Segment {
                number,
                width: suffix.len(),
            }
        };

        Ok(Self {
            prefix: prefix.to_owned(),
            date,
            suffix: suffix.to_owned(),
            origin,
        })
    }
}

impl TryFrom<String> for BusinessId {
    type Error = ParseError;

    fn try_from(src: String) -> Result<Self, Self::Error> {
        src.parse()
    }
}

impl From<BusinessId> for String {
    fn from(src: BusinessId) -> Self {
        src.to_string()
    }
}

impl BusinessId {
    /// Assembles an identifier from a segment number, returning `None` if it cannot be encoded.
    pub fn from_segment(prefix: &str, date: NaiveDate, number: u64, width: usize) -> Option<Self> {
        let suffix = encode(i64::try_from(number).ok()?, width).ok()?;
        Some(Self {
            prefix: prefix.to_owned(),
            date,
            origin: Origin::Segment {
                number,
                width: suffix.len(),
            },
            suffix,
        })
    }
}

/// Error parsing an invalid string representation of a business identifier.
#[derive(thiserror::Error, Clone, Eq, PartialEq, Hash, Debug)]
#[error("invalid business identifier representation")]
pub struct ParseError {}

#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
mod serde_support {
    use super::{fmt, BusinessId};
    use serde::{de, Deserializer, Serializer};

    impl serde::Serialize for BusinessId {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_str(self)
        }
    }

    impl<'de> serde::Deserialize<'de> for BusinessId {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_str(VisitorImpl)
        }
    }

    struct VisitorImpl;

    impl<'de> de::Visitor<'de> for VisitorImpl {
        type Value = BusinessId;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(formatter, "a business identifier")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            value.parse::<Self::Value>().map_err(de::Error::custom)
        }
    }

}

#[cfg(test)]
mod tests {
    use super::{BusinessId, Origin, ParseError};
    use chrono::NaiveDate;

    /// Parses segment and fallback identifiers
    #[test]
    fn parses_segment_and_fallback_identifiers() {
        let id: BusinessId = "ORD-20240101AAAAC".parse().unwrap();
        assert_eq!(id.prefix(), "ORD");
        assert_eq!(id.date(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(id.suffix(), "AAAAC");
        assert_eq!(id.origin(), Origin::Segment { number: 1, width: 5 });
        assert!(!id.is_fallback());

        let id: BusinessId = "PAY-X-20241231YBCAQWERTYUA".parse().unwrap();
        assert_eq!(id.prefix(), "PAY-X");
        assert_eq!(id.origin(), Origin::Fallback);
        assert!(id.is_fallback());
        assert_eq!(id.to_string(), "PAY-X-20241231YBCAQWERTYUA");
    }

    /// Rejects malformed identifiers
    #[test]
    fn rejects_malformed_identifiers() {
        let cases = [
            "",
            "ORD",
            "-20240101AAAAC",
            "ORD-20240101",
            "ORD-2024010AAAAC",
            "ORD-20241301AAAAC",
            "ORD-20240101AABAC",
            "ORD-20240101Ybcd",
            "ORD-+2024101AAAAC",
            "ORD-2024é101AAAAC",
        ];
        for text in cases {
            assert_eq!(text.parse::<BusinessId>(), Err(ParseError {}), "{}", text);
        }
    }

    /// Builds identifiers that round-trip through their string form
    #[test]
    fn builds_identifiers_that_round_trip_through_their_string_form() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let id = BusinessId::from_segment("ORD", date, 1_234, 6).unwrap();
        assert_eq!(id.to_string(), "ORD-20240101AACEFH");
        assert_eq!(id.to_string().parse::<BusinessId>(), Ok(id.clone()));
        assert_eq!(String::from(id), "ORD-20240101AACEFH");
        assert!(BusinessId::from_segment("ORD", date, u64::MAX, 6).is_none());
    }
}
