//! Posterior distributions over a query variable's domain.

use std::fmt;
use std::sync::Arc;

use crate::engine::errors::InferenceError;
use crate::engine::evidence::Evidence;

/// Largest deviation from 1 accepted when deserializing a distribution.
const NORMALIZATION_TOLERANCE: f64 = 1e-9;

/// A distribution over the values of one variable, in domain order.
///
/// Deserialized distributions are checked like normalized ones: every entry
/// must lie in `[0, 1]` and the entries must sum to 1.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "DistributionRecord"))]
pub struct Distribution {
    variable: Arc<str>,
    entries: Vec<(Arc<str>, f64)>,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct DistributionRecord {
    variable: Arc<str>,
    entries: Vec<(Arc<str>, f64)>,
}

#[cfg(feature = "serde")]
impl TryFrom<DistributionRecord> for Distribution {
    type Error = InferenceError;

    fn try_from(record: DistributionRecord) -> Result<Self, Self::Error> {
        let DistributionRecord { variable, entries } = record;
        if let Some((value, p)) = entries
            .iter()
            .find(|(_, p)| !p.is_finite() || !(0.0..=1.0).contains(p))
        {
            return Err(InferenceError::Numerical(format!(
                "P({}={}) is {}",
                variable, value, p
            )));
        }
        let total: f64 = entries.iter().map(|(_, p)| p).sum();
        if (total - 1.0).abs() > NORMALIZATION_TOLERANCE {
            return Err(InferenceError::Numerical(format!(
                "distribution of {} sums to {}",
                variable, total
            )));
        }
        Ok(Self { variable, entries })
    }
}

impl Distribution {
    /// Normalizes unnormalized masses into a distribution.
    ///
    /// Fails with [`InferenceError::ZeroEvidence`] when the total mass is zero and
    /// with [`InferenceError::Numerical`] when it is not finite.
    pub fn normalize(
        variable: Arc<str>,
        mut entries: Vec<(Arc<str>, f64)>,
        evidence: &Evidence,
    ) -> Result<Self, InferenceError> {
        let total: f64 = entries.iter().map(|(_, mass)| mass).sum();
        if !total.is_finite() {
            return Err(InferenceError::Numerical(format!(
                "total mass for P({} | {}) is {}",
                variable, evidence, total
            )));
        }
        if total <= 0.0 {
            return Err(InferenceError::ZeroEvidence {
                query: variable.to_string(),
                evidence: evidence.to_string(),
            });
        }
        for (_, mass) in &mut entries {
            *mass /= total;
        }
        Ok(Self { variable, entries })
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn get(&self, value: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(v, _)| &**v == value)
            .map(|(_, p)| *p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(v, p)| (&**v, *p))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, p)| p).sum()
    }

    /// The most probable value; ties go to the earliest value in domain order.
    pub fn most_likely(&self) -> Option<(&str, f64)> {
        self.iter()
            .fold(None, |best: Option<(&str, f64)>, (value, p)| match best {
                Some((_, best_p)) if best_p >= p => best,
                _ => Some((value, p)),
            })
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, (value, p)) in self.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "P({}={}) = {:.4}", self.variable, value, p)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn masses(values: &[(&str, f64)]) -> Vec<(Arc<str>, f64)> {
        values.iter().map(|(v, p)| (Arc::from(*v), *p)).collect()
    }

    #[test]
    fn normalize_divides_by_total() {
        let dist = Distribution::normalize(
            "rain".into(),
            masses(&[("none", 0.07), ("heavy", 0.18)]),
            &Evidence::new(),
        )
        .expect("normalized");
        assert!((dist.get("none").expect("none") - 0.28).abs() < 1e-12);
        assert!((dist.get("heavy").expect("heavy") - 0.72).abs() < 1e-12);
        assert!((dist.total() - 1.0).abs() < 1e-12);
        assert_eq!(dist.most_likely().map(|(v, _)| v), Some("heavy"));
    }

    #[test]
    fn normalize_rejects_zero_mass() {
        let err = Distribution::normalize(
            "rain".into(),
            masses(&[("none", 0.0), ("heavy", 0.0)]),
            &Evidence::new().with("appointment", "miss"),
        )
        .expect_err("zero mass");
        assert_eq!(
            err,
            InferenceError::ZeroEvidence {
                query: "rain".into(),
                evidence: "{appointment=miss}".into(),
            }
        );
    }

    #[test]
    fn normalize_rejects_non_finite_mass() {
        let err = Distribution::normalize(
            "rain".into(),
            masses(&[("none", f64::INFINITY), ("heavy", 0.1)]),
            &Evidence::new(),
        )
        .expect_err("infinite mass");
        assert!(matches!(err, InferenceError::Numerical(_)));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialization_keeps_domain_order_and_rejects_unnormalized_entries() {
        let dist = Distribution::normalize(
            "maintenance".into(),
            masses(&[("yes", 0.06), ("no", 0.45)]),
            &Evidence::new(),
        )
        .expect("normalized");
        let json = serde_json::to_string(&dist).expect("serialize");
        let back: Distribution = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, dist);
        let values: Vec<&str> = back.iter().map(|(v, _)| v).collect();
        assert_eq!(values, ["yes", "no"]);

        let unnormalized = r#"{"variable":"rain","entries":[["none",0.5],["heavy",0.9]]}"#;
        assert!(serde_json::from_str::<Distribution>(unnormalized).is_err());
        let negative = r#"{"variable":"rain","entries":[["none",1.5],["heavy",-0.5]]}"#;
        assert!(serde_json::from_str::<Distribution>(negative).is_err());
    }
}
