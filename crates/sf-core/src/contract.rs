//! Contract extraction
//!
//! Copies the canon fields the compiler consumes and predicts gate shortfalls
//! before any merge work, so they are logged as early as possible.

use serde::{Deserialize, Serialize};
use sf_gates::{MIN_EDGE_CASES, MIN_FAILURE_MODES, MIN_TEMPLATES};
use sf_model::{CanonExtract, DecisionPoint, FailureMode, Template, QUICKSTART_STEPS};

/// Canon content the document will be built from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    /// Quickstart steps
    pub quickstart: Vec<String>,
    /// Workflow decision points
    pub decision_points: Vec<DecisionPoint>,
    /// Templates
    pub templates: Vec<Template>,
    /// Failure modes
    pub failure_modes: Vec<FailureMode>,
    /// Edge cases
    pub edge_cases: Vec<String>,
}

impl Contract {
    /// Copy the contract fields out of a canon extract
    #[must_use]
    pub fn extract(canon: &CanonExtract) -> Self {
        Self {
            quickstart: canon.quickstart_steps.value.clone(),
            decision_points: canon.decision_points.value.clone(),
            templates: canon.templates.value.clone(),
            failure_modes: canon.failure_modes.value.clone(),
            edge_cases: canon.edge_cases.value.clone(),
        }
    }

    /// Shortfalls the gates will report unless the overlay makes up for them
    ///
    /// Local failure patterns can still lift the failure-mode count, so a
    /// prediction here is a warning, not a verdict.
    #[must_use]
    pub fn predicted_shortfalls(&self) -> Vec<String> {
        let mut shortfalls = Vec::new();
        if self.quickstart.len() != QUICKSTART_STEPS {
            shortfalls.push(format!(
                "quickstart: found {}, need exactly {QUICKSTART_STEPS}",
                self.quickstart.len()
            ));
        }
        if self.templates.len() < MIN_TEMPLATES {
            shortfalls.push(format!(
                "templates: found {}, need ≥{MIN_TEMPLATES}",
                self.templates.len()
            ));
        }
        if self.failure_modes.len() < MIN_FAILURE_MODES {
            shortfalls.push(format!(
                "failure_modes: found {}, need ≥{MIN_FAILURE_MODES}",
                self.failure_modes.len()
            ));
        }
        if self.edge_cases.len() < MIN_EDGE_CASES {
            shortfalls.push(format!(
                "edge_cases: found {}, need ≥{MIN_EDGE_CASES}",
                self.edge_cases.len()
            ));
        }
        shortfalls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_test_utils::{canon_with_failure_modes, healthy_canon};

    #[test]
    fn healthy_canon_predicts_nothing() {
        assert!(Contract::extract(&healthy_canon()).predicted_shortfalls().is_empty());
    }

    #[test]
    fn short_canon_predicts_failure_mode_gap() {
        let contract = Contract::extract(&canon_with_failure_modes(3));
        assert_eq!(
            contract.predicted_shortfalls(),
            vec!["failure_modes: found 3, need ≥5".to_string()]
        );
    }
}
