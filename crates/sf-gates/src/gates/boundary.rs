//! Description clarity: the guardrails state the scope boundary

use super::QualityGate;
use sf_model::{Document, GateName, GateResult, GuardClass, Item, SectionName};

/// Passes when guardrails carry at least one must-cover and one must-not-cover line
#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptionClarityGate;

impl QualityGate for DescriptionClarityGate {
    fn name(&self) -> GateName {
        GateName::DescriptionClarity
    }

    fn check(&self, doc: &Document) -> GateResult {
        let guardrails = doc.section(SectionName::Guardrails);
        let count = |wanted: GuardClass| {
            guardrails
                .iter()
                .filter(|i| matches!(i, Item::Guard { class, .. } if *class == wanted))
                .count()
        };
        let covered = count(GuardClass::MustCover);
        let excluded = count(GuardClass::MustNotCover);

        if guardrails.is_empty() || covered == 0 || excluded == 0 {
            return GateResult::fail(
                format!(
                    "description_clarity: guardrails have {covered} must-cover and {excluded} must-not-cover lines, need ≥1 of each"
                ),
                "state what the skill covers and what it explicitly refuses in the scope card",
            );
        }
        GateResult::pass(format!(
            "description_clarity: {covered} covered, {excluded} excluded"
        ))
    }
}
