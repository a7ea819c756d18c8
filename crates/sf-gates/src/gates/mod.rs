//! Quality gates over compiled documents
//!
//! Each gate inspects one aspect of a [`Document`] and returns a
//! [`GateResult`]. Gates are pure: they never mutate the document and give
//! the same answer for the same input.

use sf_model::{Document, GateName, GateResult};

mod boundary;
mod brittleness;
mod content;
mod quickstart;
mod size;

pub use boundary::DescriptionClarityGate;
pub use brittleness::BrittlenessGate;
pub use content::{
    EdgeCasesGate, FailureModesGate, TemplatesGate, MIN_EDGE_CASES, MIN_FAILURE_MODES,
    MIN_TEMPLATES,
};
pub use quickstart::{imperative_violation, QuickstartGate};
pub use size::{SizeGate, MAX_LINES};

/// A single pass/fail check on a compiled document
///
/// Implement this trait to add a new gate.
pub trait QualityGate: Send + Sync + std::fmt::Debug {
    /// Gate identity, used as the report key
    fn name(&self) -> GateName;

    /// Evaluate the document
    fn check(&self, doc: &Document) -> GateResult;
}
