//! Validation report
//!
//! Ordered gate results plus the overall verdict. `overall_passed` is always
//! the AND of the individual results, including after deserialisation.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The seven quality gates, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateName {
    /// Guardrails state the scope boundary
    DescriptionClarity,
    /// Three imperative quickstart steps
    QuickstartExecutable,
    /// At least two distinct templates
    Templates,
    /// At least five complete failure modes
    FailureModes,
    /// At least three distinct edge cases
    EdgeCases,
    /// High-risk failures have scripted guardrails
    BrittlenessHandling,
    /// Fewer than 500 rendered lines
    SizeConstraint,
}

impl GateName {
    /// All gates in evaluation order
    pub const ALL: [GateName; 7] = [
        Self::DescriptionClarity,
        Self::QuickstartExecutable,
        Self::Templates,
        Self::FailureModes,
        Self::EdgeCases,
        Self::BrittlenessHandling,
        Self::SizeConstraint,
    ];

    /// Stable snake_case name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DescriptionClarity => "description_clarity",
            Self::QuickstartExecutable => "quickstart_executable",
            Self::Templates => "templates",
            Self::FailureModes => "failure_modes",
            Self::EdgeCases => "edge_cases",
            Self::BrittlenessHandling => "brittleness_handling",
            Self::SizeConstraint => "size_constraint",
        }
    }
}

impl fmt::Display for GateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateResult {
    /// Whether the gate passed
    pub passed: bool,
    /// What was found; names the exact shortfall on failure
    pub detail: String,
    /// How to fix a failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl GateResult {
    /// Passing result
    #[inline]
    #[must_use]
    pub fn pass(detail: impl Into<String>) -> Self {
        Self {
            passed: true,
            detail: detail.into(),
            remediation: None,
        }
    }

    /// Failing result with remediation guidance
    #[inline]
    #[must_use]
    pub fn fail(detail: impl Into<String>, remediation: impl Into<String>) -> Self {
        Self {
            passed: false,
            detail: detail.into(),
            remediation: Some(remediation.into()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ReportParts {
    gate_results: IndexMap<GateName, GateResult>,
}

impl From<ReportParts> for ValidationReport {
    fn from(parts: ReportParts) -> Self {
        Self::from_results(parts.gate_results)
    }
}

/// Gate results for one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ReportParts")]
pub struct ValidationReport {
    gate_results: IndexMap<GateName, GateResult>,
    overall_passed: bool,
}

impl ValidationReport {
    /// Build report; the overall verdict is derived
    #[must_use]
    pub fn from_results(results: impl IntoIterator<Item = (GateName, GateResult)>) -> Self {
        let gate_results: IndexMap<_, _> = results.into_iter().collect();
        let overall_passed = gate_results.values().all(|r| r.passed);
        Self {
            gate_results,
            overall_passed,
        }
    }

    /// AND of all gate results
    #[inline]
    #[must_use]
    pub fn overall_passed(&self) -> bool {
        self.overall_passed
    }

    /// Results in evaluation order
    #[inline]
    #[must_use]
    pub fn gate_results(&self) -> &IndexMap<GateName, GateResult> {
        &self.gate_results
    }

    /// Result for one gate
    #[inline]
    #[must_use]
    pub fn get(&self, gate: GateName) -> Option<&GateResult> {
        self.gate_results.get(&gate)
    }

    /// Names of failing gates, in evaluation order
    #[must_use]
    pub fn failing_gates(&self) -> Vec<GateName> {
        self.gate_results
            .iter()
            .filter(|(_, r)| !r.passed)
            .map(|(name, _)| *name)
            .collect()
    }

    /// One line per failing gate: detail plus remediation
    #[must_use]
    pub fn remediation_plan(&self) -> Vec<String> {
        self.gate_results
            .values()
            .filter(|r| !r.passed)
            .map(|r| match &r.remediation {
                Some(fix) => format!("{} ({fix})", r.detail),
                None => r.detail.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_passing() -> Vec<(GateName, GateResult)> {
        GateName::ALL
            .into_iter()
            .map(|g| (g, GateResult::pass("ok")))
            .collect()
    }

    #[test]
    fn overall_is_and_of_results() {
        assert!(ValidationReport::from_results(all_passing()).overall_passed());

        let mut results = all_passing();
        results[3].1 = GateResult::fail("failure_modes: found 4, need ≥5", "add one more");
        let report = ValidationReport::from_results(results);
        assert!(!report.overall_passed());
        assert_eq!(report.failing_gates(), vec![GateName::FailureModes]);
        assert_eq!(
            report.remediation_plan(),
            vec!["failure_modes: found 4, need ≥5 (add one more)".to_string()]
        );
    }

    #[test]
    fn deserialise_rederives_verdict() {
        let mut results = all_passing();
        results[6].1 = GateResult::fail("size_constraint: 512 lines, need <500", "trim");
        let report = ValidationReport::from_results(results);

        let mut json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["gate_results"]["size_constraint"]["passed"], false);
        json["overall_passed"] = serde_json::json!(true);

        let back: ValidationReport = serde_json::from_value(json).unwrap();
        assert!(!back.overall_passed());
        assert_eq!(back, report);
    }
}
