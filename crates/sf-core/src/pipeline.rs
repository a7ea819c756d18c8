//! Generation pipeline
//!
//! [`Pipeline`] steps one request through the stage machine explicitly, so a
//! caller can suspend at the interview and resume later. [`SkillForge`]
//! drives a whole run through the collaborator traits.
//!
//! # Workflow
//! 1. Accept the scope card and analyse its degrees of freedom
//! 2. Query the knowledge service under a timeout, falling back offline
//! 3. Extract the contract and log predicted shortfalls
//! 4. Suspend until all five interview answers are present
//! 5. Compile and validate

use crate::config::ForgeConfig;
use crate::contract::Contract;
use crate::error::{ForgeError, ServiceFailure, StageError};
use crate::fallback::OfflineKnowledge;
use crate::freedom::FreedomAnalysis;
use crate::interview::{InterviewAnswers, InterviewQuestion, Interviewer};
use crate::knowledge::{HttpKnowledgeService, KnowledgeService, Unavailable};
use crate::sink::{ArtifactSink, DirectorySink};
use crate::stage::{validate_transition, Stage};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sf_model::{CanonExtract, Document, GateName, LocalOverlay, ScopeCard, ValidationReport};
use std::path::PathBuf;
use std::sync::Arc;
use ulid::Ulid;

/// Unique run identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RunId(pub Ulid);

impl RunId {
    /// Generate new run ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Verdict of a finished run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "failing", rename_all = "snake_case")]
pub enum GenerationStatus {
    /// Every gate passed
    Passed,
    /// Listed gates failed; the document is still returned
    FailedGates(Vec<GateName>),
}

impl GenerationStatus {
    /// Derive from a report
    #[must_use]
    pub fn from_report(report: &ValidationReport) -> Self {
        if report.overall_passed() {
            Self::Passed
        } else {
            Self::FailedGates(report.failing_gates())
        }
    }

    /// Whether every gate passed
    #[inline]
    #[must_use]
    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    /// Run identifier
    pub run_id: RunId,
    /// Completion time
    pub created_at: DateTime<Utc>,
    /// Degrees-of-freedom analysis
    pub freedom: FreedomAnalysis,
    /// Contract the document was built from
    pub contract: Contract,
    /// Compiled document
    pub document: Document,
    /// Gate results
    pub report: ValidationReport,
    /// Verdict
    pub status: GenerationStatus,
    /// Where the artifacts were persisted, if they were
    pub location: Option<PathBuf>,
}

impl GenerationOutcome {
    /// Whether the canon came from the offline fallback
    #[inline]
    #[must_use]
    pub fn is_fallback_sourced(&self) -> bool {
        self.document.is_fallback_sourced()
    }
}

/// One request stepped explicitly through the stage machine
#[derive(Debug, Clone)]
pub struct Pipeline {
    id: RunId,
    config: ForgeConfig,
    stage: Stage,
    history: Vec<Stage>,
    scope: Option<ScopeCard>,
    freedom: Option<FreedomAnalysis>,
    canon: Option<CanonExtract>,
    contract: Option<Contract>,
}

impl Pipeline {
    /// Create pipeline at the `scope` stage
    #[must_use]
    pub fn new(config: ForgeConfig) -> Self {
        Self {
            id: RunId::new(),
            config,
            stage: Stage::Scope,
            history: vec![Stage::Scope],
            scope: None,
            freedom: None,
            canon: None,
            contract: None,
        }
    }

    /// Run identifier
    #[inline]
    #[must_use]
    pub fn id(&self) -> RunId {
        self.id
    }

    /// Current stage
    #[inline]
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Every stage visited, in order
    #[inline]
    #[must_use]
    pub fn history(&self) -> &[Stage] {
        &self.history
    }

    /// Canon gathered so far
    #[inline]
    #[must_use]
    pub fn canon(&self) -> Option<&CanonExtract> {
        self.canon.as_ref()
    }

    /// Whether the run is waiting for interview answers
    #[inline]
    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.stage == Stage::LocalOverlay
    }

    fn expect_stage(&self, expected: Stage) -> Result<(), StageError> {
        if self.stage == expected {
            Ok(())
        } else {
            Err(StageError::WrongStage {
                expected,
                actual: self.stage,
            })
        }
    }

    fn advance(&mut self, to: Stage) -> Result<(), StageError> {
        validate_transition(self.stage, to)?;
        tracing::info!(run = %self.id, from = %self.stage, to = %to, "stage transition");
        self.stage = to;
        self.history.push(to);
        Ok(())
    }

    /// Accept a scope card and analyse its degrees of freedom
    ///
    /// # Errors
    /// [`ForgeError::Stage`] outside the `scope` stage, or
    /// [`ForgeError::InvalidInput`] when the card violates an invariant.
    pub fn accept_scope(&mut self, scope: ScopeCard) -> Result<&FreedomAnalysis, ForgeError> {
        self.expect_stage(Stage::Scope)?;
        scope.validate()?;
        self.advance(Stage::FreedomAnalysis)?;

        let analysis = FreedomAnalysis::analyze(&scope);
        tracing::info!(
            run = %self.id,
            level = ?analysis.level,
            boundary = scope.boundary_size(),
            "freedom analysed"
        );
        self.scope = Some(scope);
        Ok(&*self.freedom.insert(analysis))
    }

    /// Query the knowledge service once, bounded by the configured timeout
    ///
    /// Any failure or timeout is recovered by synthesising the canon offline;
    /// the resulting document is then flagged as fallback-sourced. Leaves the
    /// run suspended at `local_overlay`.
    ///
    /// # Errors
    /// [`ForgeError::Stage`] outside the `freedom_analysis` stage.
    pub async fn gather_canon(
        &mut self,
        service: &dyn KnowledgeService,
    ) -> Result<&CanonExtract, ForgeError> {
        self.expect_stage(Stage::FreedomAnalysis)?;
        let scope = self.scope.clone().ok_or(StageError::WrongStage {
            expected: Stage::FreedomAnalysis,
            actual: Stage::Scope,
        })?;
        self.advance(Stage::ExternalCanon)?;

        let bound = self.config.canon_timeout();
        let answer = match tokio::time::timeout(bound, service.query(&scope)).await {
            Ok(Ok(canon)) => canon
                .validate()
                .map(|()| canon)
                .map_err(|e| ServiceFailure::Malformed(e.to_string())),
            Ok(Err(failure)) => Err(failure),
            Err(_) => Err(ServiceFailure::Timeout {
                after_ms: self.config.canon_timeout_ms,
            }),
        };

        let canon = match answer {
            Ok(canon) => {
                tracing::info!(run = %self.id, backend = service.name(), "canon received");
                canon
            }
            Err(failure) => {
                tracing::warn!(
                    run = %self.id,
                    backend = service.name(),
                    error = %failure,
                    "knowledge service failed, using offline fallback"
                );
                self.advance(Stage::OfflineFallback)?;
                OfflineKnowledge::new().generate(&scope)
            }
        };

        self.advance(Stage::ContractExtraction)?;
        let contract = Contract::extract(&canon);
        for shortfall in contract.predicted_shortfalls() {
            tracing::warn!(run = %self.id, %shortfall, "predicted gate shortfall");
        }
        self.contract = Some(contract);

        self.advance(Stage::LocalOverlay)?;
        Ok(&*self.canon.insert(canon))
    }

    /// Resume a suspended run with interview answers
    ///
    /// The run stays suspended while any answer is missing.
    ///
    /// # Errors
    /// [`ForgeError::InterviewIncomplete`] while answers are missing,
    /// [`ForgeError::InvalidInput`] on an invalid priority or overlay, or
    /// [`ForgeError::Stage`] when the run is not suspended.
    pub fn resume_with_interview(
        &mut self,
        answers: &InterviewAnswers,
    ) -> Result<GenerationOutcome, ForgeError> {
        self.expect_stage(Stage::LocalOverlay)?;
        let overlay = answers.to_overlay().map_err(|e| {
            if let ForgeError::InterviewIncomplete { missing } = &e {
                tracing::info!(run = %self.id, missing = missing.len(), "interview incomplete, still suspended");
            }
            e
        })?;
        self.resume_with_overlay(overlay)
    }

    /// Resume a suspended run with a ready overlay
    ///
    /// # Errors
    /// [`ForgeError::InvalidInput`] when an input violates an invariant, or
    /// [`ForgeError::Stage`] when the run is not suspended.
    pub fn resume_with_overlay(
        &mut self,
        overlay: LocalOverlay,
    ) -> Result<GenerationOutcome, ForgeError> {
        self.expect_stage(Stage::LocalOverlay)?;
        overlay.validate()?;
        let missing = || StageError::WrongStage {
            expected: Stage::LocalOverlay,
            actual: Stage::Scope,
        };
        let scope = self.scope.clone().ok_or_else(missing)?;
        let canon = self.canon.clone().ok_or_else(missing)?;
        let freedom = self.freedom.clone().ok_or_else(missing)?;
        let contract = self.contract.clone().ok_or_else(missing)?;

        self.advance(Stage::Compile)?;
        let document = sf_compiler::compile(&scope, &canon, &overlay)?;
        tracing::info!(
            run = %self.id,
            skill = %document.meta().name,
            lines = document.line_count(),
            conflicts = document.conflicts().len(),
            fallback = document.is_fallback_sourced(),
            "document compiled"
        );

        self.advance(Stage::Validate)?;
        let report = sf_gates::validate(&document);
        let status = GenerationStatus::from_report(&report);
        match &status {
            GenerationStatus::Passed => {
                tracing::info!(run = %self.id, "all gates passed");
            }
            GenerationStatus::FailedGates(failing) => {
                tracing::warn!(
                    run = %self.id,
                    failing = ?failing,
                    plan = ?report.remediation_plan(),
                    "gates failed"
                );
            }
        }

        Ok(GenerationOutcome {
            run_id: self.id,
            created_at: Utc::now(),
            freedom,
            contract,
            document,
            report,
            status,
            location: None,
        })
    }
}

/// Supplies the accepted scope card
#[async_trait]
pub trait ScopeSource: Send + Sync {
    /// Produce the scope card for this run
    async fn scope(&self) -> anyhow::Result<ScopeCard>;
}

#[async_trait]
impl ScopeSource for ScopeCard {
    async fn scope(&self) -> anyhow::Result<ScopeCard> {
        Ok(self.clone())
    }
}

/// Drives whole runs through the collaborator traits
#[derive(Clone)]
pub struct SkillForge {
    config: ForgeConfig,
    knowledge: Arc<dyn KnowledgeService>,
    sink: Option<Arc<dyn ArtifactSink>>,
}

impl std::fmt::Debug for SkillForge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkillForge")
            .field("config", &self.config)
            .field("knowledge", &self.knowledge.name())
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

impl SkillForge {
    /// Create orchestrator with a knowledge backend
    #[must_use]
    pub fn new(config: ForgeConfig, knowledge: Arc<dyn KnowledgeService>) -> Self {
        Self {
            config,
            knowledge,
            sink: None,
        }
    }

    /// Create orchestrator entirely from configuration
    ///
    /// Queries `knowledge_endpoint` over HTTP when set, otherwise every run
    /// takes the offline path. Persists under `output_dir` when `persist` is
    /// enabled.
    ///
    /// # Errors
    /// Returns [`ForgeError::Config`] when the configuration is invalid.
    pub fn from_config(config: ForgeConfig) -> Result<Self, ForgeError> {
        config.validate()?;
        let knowledge: Arc<dyn KnowledgeService> = match &config.knowledge_endpoint {
            Some(endpoint) => Arc::new(HttpKnowledgeService::new(endpoint.clone())),
            None => Arc::new(Unavailable),
        };
        let sink = config
            .persist
            .then(|| Arc::new(DirectorySink::new(&config.output_dir)) as Arc<dyn ArtifactSink>);
        tracing::info!(
            knowledge = knowledge.name(),
            persist = config.persist,
            output_dir = %config.output_dir.display(),
            "forge configured"
        );
        Ok(Self {
            config,
            knowledge,
            sink,
        })
    }

    /// With artifact sink; used only when `persist` is enabled
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn ArtifactSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ForgeConfig {
        &self.config
    }

    /// Run one request end to end
    ///
    /// Failing gates are reported in the outcome, never retried.
    ///
    /// # Errors
    /// Returns invalid configuration, collaborator failures, invalid inputs,
    /// incomplete interviews and persistence failures. Knowledge-service failures are never
    /// returned; they trigger the offline fallback.
    pub async fn generate(
        &self,
        source: &dyn ScopeSource,
        interviewer: &dyn Interviewer,
    ) -> Result<GenerationOutcome, ForgeError> {
        self.config.validate()?;
        let scope = source
            .scope()
            .await
            .map_err(|e| ForgeError::collaborator("scope source", &e))?;
        tracing::info!(goal = %scope.goal, "generation requested");

        let mut pipeline = Pipeline::new(self.config.clone());
        pipeline.accept_scope(scope.clone())?;
        pipeline.gather_canon(self.knowledge.as_ref()).await?;

        let answers = interviewer
            .interview(&scope, &InterviewQuestion::ALL)
            .await
            .map_err(|e| ForgeError::collaborator("interviewer", &e))?;
        let mut outcome = pipeline.resume_with_interview(&answers)?;

        if self.config.persist {
            if let Some(sink) = &self.sink {
                outcome.location = Some(sink.persist(&outcome).await?);
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::interview::ScriptedInterviewer;
    use sf_test_utils::{healthy_overlay, healthy_scope};
    use std::time::Duration;

    fn answers() -> InterviewAnswers {
        InterviewQuestion::ALL
            .into_iter()
            .fold(InterviewAnswers::new(), |a, q| a.with(q, ""))
            .with(InterviewQuestion::Priority, "accuracy")
    }

    #[test]
    fn operations_out_of_order_are_rejected() {
        let mut pipeline = Pipeline::new(ForgeConfig::new());
        let err = pipeline.resume_with_overlay(healthy_overlay()).unwrap_err();
        assert!(matches!(
            err,
            ForgeError::Stage(StageError::WrongStage {
                expected: Stage::LocalOverlay,
                actual: Stage::Scope
            })
        ));
        assert_eq!(pipeline.stage(), Stage::Scope);
    }

    #[test]
    fn invalid_scope_leaves_stage_unchanged() {
        let mut pipeline = Pipeline::new(ForgeConfig::new());
        let mut scope = healthy_scope();
        scope.goal = "short".to_string();
        assert!(pipeline.accept_scope(scope).unwrap_err().requires_caller());
        assert_eq!(pipeline.stage(), Stage::Scope);
    }

    #[tokio::test]
    async fn unavailable_service_takes_offline_path() {
        let mut pipeline = Pipeline::new(ForgeConfig::new());
        pipeline.accept_scope(healthy_scope()).unwrap();
        let canon = pipeline.gather_canon(&Unavailable).await.unwrap();
        assert!(canon.is_fully_unverified());
        assert!(pipeline.is_suspended());
        assert!(pipeline.history().contains(&Stage::OfflineFallback));
    }

    #[tokio::test]
    async fn incomplete_interview_keeps_run_suspended() {
        let mut pipeline = Pipeline::new(ForgeConfig::new());
        pipeline.accept_scope(healthy_scope()).unwrap();
        pipeline.gather_canon(&Unavailable).await.unwrap();

        let partial = InterviewAnswers::new().with(InterviewQuestion::Priority, "speed");
        let err = pipeline.resume_with_interview(&partial).unwrap_err();
        assert!(matches!(err, ForgeError::InterviewIncomplete { .. }));
        assert!(pipeline.is_suspended());

        let outcome = pipeline.resume_with_interview(&answers()).unwrap();
        assert_eq!(pipeline.stage(), Stage::Validate);
        assert!(outcome.is_fallback_sourced());
    }

    #[tokio::test]
    async fn generate_without_sink_does_not_persist() {
        let forge = SkillForge::new(ForgeConfig::new(), Arc::new(Unavailable));
        let outcome = forge
            .generate(&healthy_scope(), &ScriptedInterviewer::new(answers()))
            .await
            .unwrap();
        assert!(outcome.location.is_none());
        assert!(outcome.status.is_passed(), "{:?}", outcome.report.remediation_plan());
    }

    #[tokio::test]
    async fn overlay_resume_compiles_and_validates() {
        let mut pipeline = Pipeline::new(ForgeConfig::new());
        pipeline.accept_scope(healthy_scope()).unwrap();
        pipeline.gather_canon(&Unavailable).await.unwrap();

        let outcome = pipeline.resume_with_overlay(healthy_overlay()).unwrap();
        assert!(pipeline
            .history()
            .ends_with(&[Stage::LocalOverlay, Stage::Compile, Stage::Validate]));
        assert!(outcome.is_fallback_sourced());
        assert!(pipeline.canon().is_some());
    }

    #[test]
    fn zero_timeout_config_is_rejected() {
        let config = ForgeConfig::new().with_canon_timeout(Duration::ZERO);
        let err = SkillForge::from_config(config).unwrap_err();
        assert!(matches!(
            err,
            ForgeError::Config(ConfigError::Invalid {
                field: "canon_timeout_ms",
                ..
            })
        ));
        assert!(err.requires_caller());
    }

    #[tokio::test]
    async fn generate_rejects_invalid_config_before_running() {
        let config = ForgeConfig::new().with_canon_timeout(Duration::ZERO);
        let forge = SkillForge::new(config, Arc::new(Unavailable));
        let err = forge
            .generate(&healthy_scope(), &ScriptedInterviewer::new(answers()))
            .await
            .unwrap_err();
        assert!(matches!(err, ForgeError::Config(_)));
    }

    #[test]
    fn non_http_endpoint_is_rejected() {
        let config = ForgeConfig::new().with_knowledge_endpoint("ftp://canon.local");
        assert!(matches!(
            SkillForge::from_config(config),
            Err(ForgeError::Config(ConfigError::Invalid {
                field: "knowledge_endpoint",
                ..
            }))
        ));
    }
}
