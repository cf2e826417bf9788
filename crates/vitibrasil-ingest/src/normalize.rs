//! Numeric cell normalization
//!
//! Source cells use a decimal comma, dots as thousands separators, and a
//! handful of "not informed" tokens. All of those collapse to a finite `f64`.

use std::collections::HashSet;

/// Numeric type a domain stores its quantities as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericTarget {
    /// Rounded to the nearest whole number
    Integer,
    Float,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NormalizeError {
    #[error("not a number: '{0}'")]
    NotANumber(String),

    #[error("value is not finite: '{0}'")]
    NotFinite(String),
}

#[derive(Debug, Clone)]
pub struct Normalizer {
    sentinels: HashSet<String>,
}

impl Normalizer {
    pub fn new<I, S>(sentinels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            sentinels: sentinels
                .into_iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .collect(),
        }
    }

    pub fn normalize(&self, raw: &str, target: NumericTarget) -> Result<f64, NormalizeError> {
        let text = raw.trim().to_lowercase();
        let text = if self.sentinels.contains(&text) {
            "0".to_string()
        } else if text.contains(',') {
            text.replace('.', "").replace(',', ".")
        } else {
            text
        };

        let value: f64 = text
            .parse()
            .map_err(|_| NormalizeError::NotANumber(raw.to_string()))?;

        if !value.is_finite() {
            return Err(NormalizeError::NotFinite(raw.to_string()));
        }

        Ok(match target {
            NumericTarget::Integer => value.round(),
            NumericTarget::Float => value,
        })
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_SENTINELS)
    }
}
