//! Rating Scores
//!
//! A candidate's score is built from named base values and named
//! multiplicative modifiers so the diagnostics sink can show how a value was
//! reached.

use std::fmt;

/// Upper bound of any candidate score
pub const MAX_SCORE: f64 = 10_000.0;

/// A score assembled from base values and modifiers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingScore {
    bases: Vec<(&'static str, f64)>,
    modifiers: Vec<(&'static str, f64)>,
}

impl RatingScore {
    /// Creates a score with a single base value.
    pub fn new(label: &'static str, base: f64) -> Self {
        Self::default().with_base(label, base)
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn with_base(mut self, label: &'static str, value: f64) -> Self {
        self.add_base(label, value);
        self
    }

    pub fn with_modifier(mut self, label: &'static str, factor: f64) -> Self {
        self.add_modifier(label, factor);
        self
    }

    /// Adds to the base. Bases are summed.
    pub fn add_base(&mut self, label: &'static str, value: f64) {
        self.bases.push((label, value));
    }

    /// Adds a multiplier applied to the summed base.
    pub fn add_modifier(&mut self, label: &'static str, factor: f64) {
        self.modifiers.push((label, factor));
    }

    pub fn base(&self) -> f64 {
        self.bases.iter().map(|(_, v)| v).sum()
    }

    /// Final value, clamped to `0..=MAX_SCORE`. Non-finite results score 0.
    pub fn value(&self) -> f64 {
        let raw = self
            .modifiers
            .iter()
            .fold(self.base(), |acc, (_, factor)| acc * factor);
        if raw.is_nan() {
            return 0.0;
        }
        raw.clamp(0.0, MAX_SCORE)
    }

    pub fn is_positive(&self) -> bool {
        self.value() > 0.0
    }

    /// Human-readable breakdown, e.g. `fatigue:187.5 x duty:2.00 = 375.00`
    pub fn breakdown(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RatingScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bases.is_empty() {
            write!(f, "none")?;
        }
        for (i, (label, value)) in self.bases.iter().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            write!(f, "{}:{:.1}", label, value)?;
        }
        for (label, factor) in &self.modifiers {
            write!(f, " x {}:{:.2}", label, factor)?;
        }
        write!(f, " = {:.2}", self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bases_sum_and_modifiers_multiply() {
        let score = RatingScore::new("fatigue", 100.0)
            .with_base("stress", 20.0)
            .with_modifier("duty", 2.0)
            .with_modifier("performance", 0.5);
        assert_eq!(score.base(), 120.0);
        assert_eq!(score.value(), 120.0);
    }

    #[test]
    fn test_value_clamped() {
        assert_eq!(RatingScore::new("base", -5.0).value(), 0.0);
        assert_eq!(
            RatingScore::new("base", 9_000.0)
                .with_modifier("boost", 3.0)
                .value(),
            MAX_SCORE
        );
        assert_eq!(
            RatingScore::new("base", f64::INFINITY)
                .with_modifier("gate", 0.0)
                .value(),
            0.0
        );
    }

    #[test]
    fn test_zero_is_not_positive() {
        assert!(!RatingScore::zero().is_positive());
        assert!(RatingScore::new("base", 0.1).is_positive());
    }

    #[test]
    fn test_breakdown_format() {
        let score = RatingScore::new("hunger", 50.0).with_modifier("job", 0.25);
        assert_eq!(score.breakdown(), "hunger:50.0 x job:0.25 = 12.50");
    }
}
