//! Size constraint

use super::QualityGate;
use sf_model::{Document, GateName, GateResult};

/// Exclusive upper bound on rendered lines
pub const MAX_LINES: usize = 500;

/// Passes when the rendered document is shorter than [`MAX_LINES`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SizeGate;

impl QualityGate for SizeGate {
    fn name(&self) -> GateName {
        GateName::SizeConstraint
    }

    fn check(&self, doc: &Document) -> GateResult {
        let lines = doc.line_count();
        if lines >= MAX_LINES {
            return GateResult::fail(
                format!("size_constraint: {lines} lines, need <{MAX_LINES}"),
                "move detail into reference files and keep the main document concise",
            );
        }
        GateResult::pass(format!("size_constraint: {lines} lines"))
    }
}
