//! Content gates: templates, failure modes, edge cases

use super::QualityGate;
use sf_model::{Document, GateName, GateResult, Item, SectionName};
use std::collections::HashSet;

/// Minimum distinct templates
pub const MIN_TEMPLATES: usize = 2;

/// Minimum failure-mode entries
pub const MIN_FAILURE_MODES: usize = 5;

/// Minimum distinct edge cases
pub const MIN_EDGE_CASES: usize = 3;

fn key(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Passes with at least two distinct templates
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplatesGate;

impl QualityGate for TemplatesGate {
    fn name(&self) -> GateName {
        GateName::Templates
    }

    fn check(&self, doc: &Document) -> GateResult {
        let distinct: HashSet<(String, String)> = doc
            .section(SectionName::Templates)
            .iter()
            .filter_map(|i| match i {
                Item::Template { name, body, .. } => Some((key(name), body.trim().to_string())),
                _ => None,
            })
            .collect();

        if distinct.len() < MIN_TEMPLATES {
            return GateResult::fail(
                format!(
                    "templates: found {} distinct, need ≥{MIN_TEMPLATES}",
                    distinct.len()
                ),
                "add reusable snippets that differ in name or body",
            );
        }
        GateResult::pass(format!("templates: {} distinct", distinct.len()))
    }
}

/// Passes with at least five complete failure modes
#[derive(Debug, Clone, Copy, Default)]
pub struct FailureModesGate;

impl QualityGate for FailureModesGate {
    fn name(&self) -> GateName {
        GateName::FailureModes
    }

    fn check(&self, doc: &Document) -> GateResult {
        let modes: Vec<[(&'static str, &str); 3]> = doc
            .section(SectionName::FailureModes)
            .iter()
            .filter_map(|i| match i {
                Item::FailureMode {
                    symptom,
                    root_cause,
                    fix,
                    ..
                } => Some([
                    ("symptom", symptom.as_str()),
                    ("root_cause", root_cause.as_str()),
                    ("fix", fix.as_str()),
                ]),
                _ => None,
            })
            .collect();

        if modes.len() < MIN_FAILURE_MODES {
            return GateResult::fail(
                format!(
                    "failure_modes: found {}, need ≥{MIN_FAILURE_MODES}",
                    modes.len()
                ),
                "add known failures, each with symptom, root cause and fix",
            );
        }

        for (i, fields) in modes.iter().enumerate() {
            if let Some((field, _)) = fields.iter().find(|(_, v)| v.trim().is_empty()) {
                return GateResult::fail(
                    format!("failure_modes: entry {} missing {field}", i + 1),
                    "fill in symptom, root cause and fix for every entry",
                );
            }
        }
        GateResult::pass(format!("failure_modes: {} complete", modes.len()))
    }
}

/// Passes with at least three distinct edge cases
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeCasesGate;

impl QualityGate for EdgeCasesGate {
    fn name(&self) -> GateName {
        GateName::EdgeCases
    }

    fn check(&self, doc: &Document) -> GateResult {
        let distinct: HashSet<String> = doc
            .section(SectionName::EdgeCases)
            .iter()
            .filter_map(|i| match i {
                Item::EdgeCase { text, .. } => Some(key(text)),
                _ => None,
            })
            .filter(|k| !k.is_empty())
            .collect();

        if distinct.len() < MIN_EDGE_CASES {
            return GateResult::fail(
                format!(
                    "edge_cases: found {} distinct, need ≥{MIN_EDGE_CASES}",
                    distinct.len()
                ),
                "list boundary conditions such as empty, oversized or malformed inputs",
            );
        }
        GateResult::pass(format!("edge_cases: {} distinct", distinct.len()))
    }
}
