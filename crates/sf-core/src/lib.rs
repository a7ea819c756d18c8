//! SkillForge Core - generation orchestrator
//!
//! Drives one skill request from an accepted scope card to a validated
//! document:
//! - Analyses the scope's degrees of freedom
//! - Queries a knowledge service under a timeout
//! - Synthesises an unverified canon offline when the service fails
//! - Suspends for the five-question local-overlay interview
//! - Compiles, validates and optionally persists the result
//!
//! # Example
//!
//! ```rust,ignore
//! use sf_core::prelude::*;
//!
//! # async fn example(scope: ScopeCard, answers: InterviewAnswers) -> Result<(), ForgeError> {
//! let forge = SkillForge::from_config(ForgeConfig::new().with_persist(false))?;
//! let outcome = forge.generate(&scope, &ScriptedInterviewer::new(answers)).await?;
//!
//! println!("{}", outcome.document.render_markdown());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod contract;
pub mod error;
pub mod fallback;
pub mod freedom;
pub mod interview;
pub mod knowledge;
pub mod pipeline;
pub mod sink;
pub mod stage;
pub mod telemetry;

pub use config::{ForgeConfig, DEFAULT_CANON_TIMEOUT_MS};
pub use contract::Contract;
pub use error::{ConfigError, ForgeError, ServiceFailure, SinkError, StageError};
pub use fallback::OfflineKnowledge;
pub use freedom::{FreedomAnalysis, FreedomLevel, SuggestedResources};
pub use interview::{
    parse_format, parse_tools, InterviewAnswers, InterviewQuestion, Interviewer,
    ScriptedInterviewer,
};
pub use knowledge::{HttpKnowledgeService, KnowledgeService, Unavailable};
pub use pipeline::{
    GenerationOutcome, GenerationStatus, Pipeline, RunId, ScopeSource, SkillForge,
};
pub use sink::{ArtifactSink, DirectorySink};
pub use stage::{allowed_transitions, validate_transition, Stage};
pub use telemetry::init_tracing;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving a generation run
    pub use crate::{
        DirectorySink, ForgeConfig, ForgeError, GenerationOutcome, GenerationStatus,
        InterviewAnswers, InterviewQuestion, Pipeline, ScriptedInterviewer, SkillForge, Stage,
        Unavailable,
    };
    pub use sf_model::{CanonExtract, Document, LocalOverlay, ScopeCard, ValidationReport};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
