//! Validation results.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::HarnessConfig;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    Symmetry,
    Determinism,
    Idempotence,
    Monotonicity,
    Integrity,
}

impl Property {
    pub fn as_str(self) -> &'static str {
        match self {
            Property::Symmetry => "symmetry",
            Property::Determinism => "determinism",
            Property::Idempotence => "idempotence",
            Property::Monotonicity => "monotonicity",
            Property::Integrity => "integrity",
        }
    }
}

impl std::fmt::Display for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseResult {
    pub name: String,
    pub property: Property,
    /// Input length in characters.
    pub input_len: usize,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Advisory property violated; the case still passes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub elapsed_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySummary {
    pub passed: usize,
    pub total: usize,
}

impl PropertySummary {
    pub fn validated(&self) -> bool {
        self.total > 0 && self.passed == self.total
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Guarantee {
    Yes,
    Partial,
    No,
}

impl Guarantee {
    fn from_bool(ok: bool) -> Self {
        if ok { Guarantee::Yes } else { Guarantee::No }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guarantees {
    /// Symmetry and integrity hold everywhere.
    pub lossless: Guarantee,
    pub reproducible: Guarantee,
    pub one_way: Guarantee,
    /// `Partial` when any pair shrank.
    pub monotonic_soft: Guarantee,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Valid,
    MvpAcceptable,
    NeedsRevision,
}

impl Classification {
    pub fn from_rate(success_rate: f64, config: &HarnessConfig) -> Self {
        if success_rate >= config.valid_threshold {
            Classification::Valid
        } else if success_rate >= config.mvp_threshold {
            Classification::MvpAcceptable
        } else {
            Classification::NeedsRevision
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub codec: String,
    pub timestamp: DateTime<Utc>,
    pub total_cases: usize,
    pub passed_cases: usize,
    pub failed_cases: usize,
    /// Percent of passed cases.
    pub success_rate: f64,
    pub cases: Vec<CaseResult>,
    pub properties: BTreeMap<Property, PropertySummary>,
    pub guarantees: Guarantees,
    pub classification: Classification,
}

impl ValidationReport {
    pub fn from_cases(codec: impl Into<String>, cases: Vec<CaseResult>, config: &HarnessConfig) -> Self {
        let total_cases = cases.len();
        let passed_cases = cases.iter().filter(|c| c.passed).count();
        let success_rate = if total_cases == 0 {
            0.0
        } else {
            passed_cases as f64 / total_cases as f64 * 100.0
        };

        let mut properties: BTreeMap<Property, PropertySummary> = BTreeMap::new();
        for case in &cases {
            let entry = properties
                .entry(case.property)
                .or_insert(PropertySummary { passed: 0, total: 0 });
            entry.total += 1;
            if case.passed {
                entry.passed += 1;
            }
        }

        let holds = |p: Property| properties.get(&p).is_some_and(PropertySummary::validated);
        let shrank = cases
            .iter()
            .any(|c| c.property == Property::Monotonicity && c.warning.is_some());
        let guarantees = Guarantees {
            lossless: Guarantee::from_bool(holds(Property::Symmetry) && holds(Property::Integrity)),
            reproducible: Guarantee::from_bool(holds(Property::Determinism)),
            one_way: Guarantee::from_bool(holds(Property::Idempotence)),
            monotonic_soft: match (holds(Property::Monotonicity), shrank) {
                (true, false) => Guarantee::Yes,
                (true, true) => Guarantee::Partial,
                (false, _) => Guarantee::No,
            },
        };

        Self {
            codec: codec.into(),
            timestamp: Utc::now(),
            total_cases,
            passed_cases,
            failed_cases: total_cases - passed_cases,
            success_rate,
            cases,
            properties,
            guarantees,
            classification: Classification::from_rate(success_rate, config),
        }
    }

    pub fn property(&self, property: Property) -> Option<&PropertySummary> {
        self.properties.get(&property)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CaseResult> {
        self.cases.iter().filter(|c| !c.passed)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// RFC 3339 timestamp.
    pub fn timestamp_rfc3339(&self) -> String {
        self.timestamp.to_rfc3339()
    }
}
