//! Tunables of a [`SegmentCache`](crate::SegmentCache).

/// Sizing and admission parameters of a segment cache.
///
/// The defaults request segments of 10,000 numbers, render them as six letters, renew once fewer
/// than 50 numbers remain, and let two concurrent renewals ask for a full segment.
///
/// # Examples
///
/// ```rust
/// use dayseq::SegmentConfig;
///
/// let config = SegmentConfig::compact().with_low_watermark(20);
/// assert_eq!(config.step, 1_000);
/// assert_eq!(config.digit_width, 5);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct SegmentConfig {
    /// Size of the range requested from the authority on a full renewal.
    pub step: u32,

    /// Renewal starts once `cursor + low_watermark` exceeds the segment bound.
    pub low_watermark: i64,

    /// Number of decimal digits a served integer is zero-padded to before encoding.
    pub digit_width: usize,

    /// Concurrent renewals admitted with the full step; later ones request a single number.
    pub full_step_admissions: u32,
}

impl SegmentConfig {
    /// Widest zero-padding that still fits any `i64`.
    pub const MAX_DIGIT_WIDTH: usize = 19;

    /// Returns the smaller profile: segments of 1,000 numbers rendered as five letters.
    pub const fn compact() -> Self {
        Self {
            step: 1_000,
            low_watermark: 50,
            digit_width: 5,
            full_step_admissions: 2,
        }
    }

    pub const fn with_step(mut self, step: u32) -> Self {
        self.step = step;
        self
    }

    pub const fn with_low_watermark(mut self, low_watermark: i64) -> Self {
        self.low_watermark = low_watermark;
        self
    }

    pub const fn with_digit_width(mut self, digit_width: usize) -> Self {
        self.digit_width = digit_width;
        self
    }

    pub const fn with_full_step_admissions(mut self, admissions: u32) -> Self {
        self.full_step_admissions = admissions;
        self
    }

    /// Checks that the parameters describe a cache that can make progress.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.step == 0 {
            return Err(ConfigError::ZeroStep);
        }
        if self.low_watermark < 0 || self.low_watermark >= i64::from(self.step) {
            return Err(ConfigError::LowWatermarkOutOfRange {
                low_watermark: self.low_watermark,
                step: self.step,
            });
        }
        if self.digit_width == 0 || self.digit_width > Self::MAX_DIGIT_WIDTH {
            return Err(ConfigError::DigitWidthOutOfRange(self.digit_width));
        }
        if self.full_step_admissions == 0 {
            return Err(ConfigError::NoFullStepAdmission);
        }
        Ok(())
    }
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            step: 10_000,
            low_watermark: 50,
            digit_width: 6,
            full_step_admissions: 2,
        }
    }
}

/// Reasons a [`SegmentConfig`] is rejected.
#[derive(thiserror::Error, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ConfigError {
    #[error("step must be positive")]
    ZeroStep,

    #[error("low watermark {low_watermark} must lie in 0..{step}")]
    LowWatermarkOutOfRange { low_watermark: i64, step: u32 },

    #[error("digit width {0} must lie in 1..=19")]
    DigitWidthOutOfRange(usize),

    #[error("at least one concurrent renewal must be admitted with the full step")]
    NoFullStepAdmission,
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, SegmentConfig};

    /// Accepts the default and compact profiles
    #[test]
    fn accepts_the_default_and_compact_profiles() {
        assert_eq!(SegmentConfig::default().validate(), Ok(()));
        assert_eq!(SegmentConfig::compact().validate(), Ok(()));
        assert_eq!(SegmentConfig::default().step, 10_000);
        assert_eq!(SegmentConfig::default().digit_width, 6);
    }

    /// Rejects parameters that stall the cache
    #[test]
    fn rejects_parameters_that_stall_the_cache() {
        let base = SegmentConfig::default();
        assert_eq!(
            base.clone().with_step(0).validate(),
            Err(ConfigError::ZeroStep)
        );
        assert_eq!(
            base.clone().with_step(50).validate(),
            Err(ConfigError::LowWatermarkOutOfRange {
                low_watermark: 50,
                step: 50
            })
        );
        assert_eq!(
            base.clone().with_low_watermark(-1).validate(),
            Err(ConfigError::LowWatermarkOutOfRange {
                low_watermark: -1,
                step: 10_000
            })
        );
        assert_eq!(
            base.clone().with_digit_width(0).validate(),
            Err(ConfigError::DigitWidthOutOfRange(0))
        );
        assert_eq!(
            base.clone().with_digit_width(20).validate(),
            Err(ConfigError::DigitWidthOutOfRange(20))
        );
        assert_eq!(
            base.with_full_step_admissions(0).validate(),
            Err(ConfigError::NoFullStepAdmission)
        );
    }

    #[cfg(feature = "serde")]
    /// Deserializes partial configuration over the defaults
    #[test]
    fn deserializes_partial_configuration_over_the_defaults() {
        use serde_test::{assert_de_tokens, Token};

        assert_de_tokens(
            &SegmentConfig::default().with_step(1_000),
            &[
                Token::Struct {
                    name: "SegmentConfig",
                    len: 1,
                },
                Token::Str("step"),
                Token::U32(1_000),
                Token::StructEnd,
            ],
        );
    }
}
