//! SkillForge Model
//!
//! Immutable value objects shared by the compiler, the gate validator and the
//! orchestrator.
//!
//! # Core Concepts
//!
//! - [`ScopeCard`]: accepted problem boundary
//! - [`CanonExtract`]: externally sourced findings, each field provenance-tagged
//! - [`LocalOverlay`]: organizational constraints that override canon
//! - [`Document`]: compiled seven-section skill document plus conflict log
//! - [`ValidationReport`]: ordered gate results with an overall verdict
//!
//! # Example
//!
//! ```rust,ignore
//! use sf_model::{OutputForm, ScopeCard};
//!
//! let scope = ScopeCard::new("lint Python code", OutputForm::Script, "zero lint errors")
//!     .with_triggers(["lint python", "check style", "run ruff", "fix pep8", "python linter"])
//!     .with_must_cover(["style", "imports", "unused names"])
//!     .with_must_not_cover(["typing", "formatting", "security"]);
//! scope.validate()?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod canon;
mod document;
mod error;
mod overlay;
mod provenance;
mod report;
mod scope;
mod text;

pub use canon::{
    CanonExtract, CanonOrigin, DecisionPoint, FailureMode, Risk, SourceRef, Template,
    QUICKSTART_STEPS,
};
pub use document::{
    BranchArm, Conflict, ContentBlock, Document, DocumentMeta, DocumentMetadata, GuardClass, Item,
    SectionName, Tag,
};
pub use error::{InputRecord, InputValidationError};
pub use overlay::{prohibits, FormatSpec, LocalOverlay, Priority, ToolRequirements};
pub use provenance::{Provenance, Sourced, UNVERIFIED};
pub use report::{GateName, GateResult, ValidationReport};
pub use scope::{
    is_measurable, OutputForm, ScopeCard, MIN_GOAL_CHARS, MIN_MUST_COVER, MIN_MUST_NOT_COVER,
    MIN_TRIGGERS,
};

pub use text::{contains_word, contains_word_prefix};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
