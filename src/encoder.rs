//! Digit-to-letter encoding of segment numbers.

/// Letters substituted for the decimal digits `0` through `9`, in order.
///
/// All ten are distinct and none of them is [`FALLBACK_MARKER`](crate::FALLBACK_MARKER).
pub const DIGIT_LETTERS: &[u8; 10] = b"ACEFHNQRSU";

/// Error raised when a character outside the digit table reaches the encoder.
#[derive(thiserror::Error, Clone, Eq, PartialEq, Hash, Debug)]
#[error("no letter mapped for {digit:?} at position {position} of {digits:?}")]
pub struct EncodeError {
    pub digits: String,
    pub position: usize,
    pub digit: char,
}

/// Zero-pads `value` to `width` decimal digits and substitutes every digit with its letter.
///
/// Values wider than `width` are encoded in full rather than truncated. A negative value yields
/// an [`EncodeError`] because `-` has no table entry.
///
/// # Examples
///
/// ```rust
/// assert_eq!(dayseq::encode(1, 5).unwrap(), "AAAAC");
/// assert_eq!(dayseq::encode(9_876, 6).unwrap(), "AAUSRQ");
/// ```
pub fn encode(value: i64, width: usize) -> Result<String, EncodeError> {
    encode_digits(&format!("{:0width$}", value, width = width))
}

/// Substitutes every byte of a decimal string with its letter.
pub fn encode_digits(digits: &str) -> Result<String, EncodeError> {
    let mut suffix = String::with_capacity(digits.len());
    for (position, digit) in digits.chars().enumerate() {
        let Some(letter) = letter_for(digit) else {
            return Err(EncodeError {
                digits: digits.to_owned(),
                position,
                digit,
            });
        };
        suffix.push(letter);
    }
    Ok(suffix)
}

/// Reverses [`encode`], returning `None` if `suffix` contains a letter outside the table.
pub fn decode(suffix: &str) -> Option<u64> {
    if suffix.is_empty() {
        return None;
    }
    suffix.chars().try_fold(0u64, |acc, c| {
        let d = DIGIT_LETTERS.iter().position(|&l| l as char == c)?;
        acc.checked_mul(10)?.checked_add(d as u64)
    })
}

fn letter_for(digit: char) -> Option<char> {
    let d = digit.to_digit(10)?;
    Some(DIGIT_LETTERS[d as usize] as char)
}

#[cfg(test)]
mod tests {
    use super::{decode, encode, encode_digits, DIGIT_LETTERS};

    /// Encodes prepared cases correctly
    #[test]
    fn encodes_prepared_cases_correctly() {
        let cases = [
            ((0, 6), "AAAAAA"),
            ((1, 5), "AAAAC"),
            ((1, 6), "AAAAAC"),
            ((1_234_567_890, 6), "CEFHNQRSUA"),
            ((99_999, 5), "UUUUU"),
            ((10_000, 6), "ACAAAA"),
            ((42, 0), "HE"),
        ];
        for ((value, width), text) in cases {
            assert_eq!(encode(value, width).unwrap(), text);
        }
    }

    /// Decodes encoded suffixes back to the original number
    #[test]
    fn decodes_encoded_suffixes_back_to_the_original_number() {
        for value in [0i64, 1, 7, 960, 1_000, 10_000, 123_456, 9_999_999_999] {
            let suffix = encode(value, 6).unwrap();
            assert_eq!(decode(&suffix), Some(value as u64));
        }
        assert_eq!(decode("AAAAC"), Some(1));
    }

    /// Rejects characters without a table entry
    #[test]
    fn rejects_characters_without_a_table_entry() {
        let err = encode(-5, 6).unwrap_err();
        assert_eq!(err.digit, '-');
        assert_eq!(err.position, 0);
        assert_eq!(err.digits, "-00005");

        let err = encode_digits("12x4").unwrap_err();
        assert_eq!((err.digit, err.position), ('x', 2));

        assert_eq!(decode(""), None);
        assert_eq!(decode("AAY"), None);
        assert_eq!(decode("aaa"), None);
    }

    /// Maps every digit to a distinct upper-case letter
    #[test]
    fn maps_every_digit_to_a_distinct_upper_case_letter() {
        let mut letters = DIGIT_LETTERS.to_vec();
        assert!(letters.iter().all(u8::is_ascii_uppercase));
        letters.sort_unstable();
        letters.dedup();
        assert_eq!(letters.len(), 10);
        assert!(!DIGIT_LETTERS.contains(&(crate::FALLBACK_MARKER as u8)));
    }
}
