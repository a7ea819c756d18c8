//! Brittleness handling: scripted guardrails for high-risk failures

use super::QualityGate;
use sf_model::{Document, GateName, GateResult, GuardClass, Item, Risk, SectionName};

/// Passes when every high-risk failure mode has a scripted guardrail naming its symptom
///
/// Vacuously passes when no failure mode is high risk.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrittlenessGate;

impl QualityGate for BrittlenessGate {
    fn name(&self) -> GateName {
        GateName::BrittlenessHandling
    }

    fn check(&self, doc: &Document) -> GateResult {
        let scripted: Vec<String> = doc
            .section(SectionName::Guardrails)
            .iter()
            .filter_map(|i| match i {
                Item::Guard {
                    class: GuardClass::Scripted,
                    text,
                } => Some(text.to_lowercase()),
                _ => None,
            })
            .collect();

        let high_risk: Vec<&str> = doc
            .section(SectionName::FailureModes)
            .iter()
            .filter_map(|i| match i {
                Item::FailureMode {
                    symptom,
                    risk: Risk::High,
                    ..
                } => Some(symptom.trim()),
                _ => None,
            })
            .collect();

        let unguarded: Vec<&str> = high_risk
            .iter()
            .copied()
            .filter(|symptom| {
                let needle = symptom.to_lowercase();
                !scripted.iter().any(|s| s.contains(&needle))
            })
            .collect();

        if !unguarded.is_empty() {
            return GateResult::fail(
                format!(
                    "brittleness_handling: {} high-risk failure mode(s) without scripted guardrail: {}",
                    unguarded.len(),
                    unguarded.join("; ")
                ),
                "give each high-risk failure mode a concrete fix using only permitted tools so a scripted guardrail can be generated",
            );
        }
        GateResult::pass(format!(
            "brittleness_handling: {} high-risk failure mode(s) scripted",
            high_risk.len()
        ))
    }
}
