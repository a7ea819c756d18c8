//! Gate registry and report assembly

use crate::gates::{
    BrittlenessGate, DescriptionClarityGate, EdgeCasesGate, FailureModesGate, QualityGate,
    QuickstartGate, SizeGate, TemplatesGate,
};
use sf_model::{Document, GateName, ValidationReport};

/// Runs every registered gate, in order, over a document
pub struct Validator {
    gates: Vec<Box<dyn QualityGate>>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("gates", &self.gate_names())
            .finish()
    }
}

impl Validator {
    /// Validator with the seven standard gates
    #[must_use]
    pub fn new() -> Self {
        Self {
            gates: vec![
                Box::new(DescriptionClarityGate),
                Box::new(QuickstartGate),
                Box::new(TemplatesGate),
                Box::new(FailureModesGate),
                Box::new(EdgeCasesGate),
                Box::new(BrittlenessGate),
                Box::new(SizeGate),
            ],
        }
    }

    /// Registered gates in evaluation order
    #[must_use]
    pub fn gate_names(&self) -> Vec<GateName> {
        self.gates.iter().map(|g| g.name()).collect()
    }

    /// Evaluate every gate; a failing gate never short-circuits the rest
    #[must_use]
    pub fn validate(&self, doc: &Document) -> ValidationReport {
        let report = ValidationReport::from_results(self.gates.iter().map(|gate| {
            let result = gate.check(doc);
            tracing::debug!(
                gate = %gate.name(),
                passed = result.passed,
                detail = %result.detail,
                "gate evaluated"
            );
            (gate.name(), result)
        }));

        tracing::debug!(
            skill = %doc.meta().name,
            passed = report.overall_passed(),
            failing = report.failing_gates().len(),
            "validation complete"
        );
        report
    }
}

/// Validate with the standard gates
#[must_use]
pub fn validate(doc: &Document) -> ValidationReport {
    Validator::new().validate(doc)
}
