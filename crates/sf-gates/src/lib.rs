//! SkillForge Gates
//!
//! Seven pass/fail quality gates over a compiled [`Document`](sf_model::Document).
//!
//! # Core Concepts
//!
//! - [`QualityGate`]: one check, keyed by [`GateName`](sf_model::GateName)
//! - [`Validator`]: runs every gate in order and builds the report
//!
//! Validation is pure. Every gate runs even when an earlier one fails, and
//! a failing gate is a report entry rather than an error.
//!
//! # Example
//!
//! ```rust,ignore
//! use sf_gates::Validator;
//!
//! let report = Validator::new().validate(&doc);
//! for line in report.remediation_plan() {
//!     println!("{line}");
//! }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod gates;
mod validator;

pub use gates::{
    imperative_violation, BrittlenessGate, DescriptionClarityGate, EdgeCasesGate,
    FailureModesGate, QualityGate, QuickstartGate, SizeGate, TemplatesGate, MAX_LINES,
    MIN_EDGE_CASES, MIN_FAILURE_MODES, MIN_TEMPLATES,
};
pub use validator::{validate, Validator};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
