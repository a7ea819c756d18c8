//! Testing utilities for SkillForge workspace
//!
//! Shared fixtures: a well-formed "lint Python code" request that compiles
//! into a document passing every gate, plus variations for the failure paths.

#![allow(missing_docs)]

use sf_model::{
    CanonExtract, CanonOrigin, DecisionPoint, FailureMode, LocalOverlay, OutputForm, Priority,
    Provenance, ScopeCard, SourceRef, Template,
};

pub const RUFF_DOCS: &str = "https://docs.astral.sh/ruff/";
pub const PEP8: &str = "https://peps.python.org/pep-0008/";

pub fn healthy_scope() -> ScopeCard {
    ScopeCard::new(
        "lint Python code",
        OutputForm::Script,
        "zero lint errors reported on the sample project",
    )
    .with_triggers([
        "lint my python code",
        "check python style",
        "run the python linter",
        "fix pep8 warnings",
        "clean up python imports",
    ])
    .with_must_cover(["style violations", "unused imports", "undefined names"])
    .with_must_not_cover(["type checking", "code formatting", "security auditing"])
}

pub fn failure_modes(count: usize) -> Vec<FailureMode> {
    let catalogue = [
        FailureMode::new(
            "Linter reports thousands of errors on first run",
            "No baseline configuration for legacy code",
            "Generate a baseline and fix new violations only",
        ),
        FailureMode::new(
            "Config file is ignored",
            "Config lives outside the project root",
            "Move pyproject.toml settings to the repository root",
        ),
        FailureMode::new(
            "Autofix rewrites files unexpectedly",
            "Unsafe fixes enabled by default",
            "Disable unsafe fixes and review the diff",
        )
        .high_risk(),
        FailureMode::new(
            "CI passes but local runs fail",
            "Linter versions differ between environments",
            "Pin the linter version in the lock file",
        ),
        FailureMode::new(
            "Import errors flagged in generated code",
            "Generated directories are not excluded",
            "Add generated paths to the exclude list",
        ),
        FailureMode::new(
            "Run takes minutes on large repositories",
            "Cache directory is not persisted",
            "Persist the linter cache between runs",
        ),
    ];
    catalogue.into_iter().cycle().take(count).collect()
}

pub fn canon_with_failure_modes(count: usize) -> CanonExtract {
    CanonExtract::empty(CanonOrigin::service("fixture"))
        .with_quickstart(
            [
                "Install ruff into the project environment",
                "Run ruff check on the source directory",
                "Fix reported violations and rerun until clean",
            ],
            Provenance::cited(RUFF_DOCS),
        )
        .with_decision_points(
            vec![
                DecisionPoint::new("the project has no lint config", "create a minimal pyproject section"),
                DecisionPoint::new("violations exceed 100", "generate a baseline first"),
            ],
            Provenance::cited(RUFF_DOCS),
        )
        .with_templates(
            vec![
                Template::new("pyproject section", "[tool.ruff]\nline-length = 88"),
                Template::new("CI step", "ruff check . --output-format=github"),
            ],
            Provenance::cited(RUFF_DOCS),
        )
        .with_failure_modes(failure_modes(count), Provenance::cited(RUFF_DOCS))
        .with_edge_cases(
            [
                "Notebooks mixed with plain modules",
                "Files with non-UTF-8 encodings",
                "Vendored third-party code",
            ],
            Provenance::cited(PEP8),
        )
        .with_sources(vec![
            SourceRef {
                title: "Ruff documentation".to_string(),
                url: Some(RUFF_DOCS.to_string()),
            },
            SourceRef {
                title: "PEP 8".to_string(),
                url: Some(PEP8.to_string()),
            },
        ])
}

pub fn healthy_canon() -> CanonExtract {
    canon_with_failure_modes(5)
}

pub fn healthy_overlay() -> LocalOverlay {
    LocalOverlay::new(Priority::Accuracy)
}

/// Canon that recommends `tool_a` by default
pub fn canon_recommending(tool_a: &str) -> CanonExtract {
    healthy_canon().with_recommended_tools([tool_a], Provenance::cited(RUFF_DOCS))
}

/// Overlay forbidding `tool_a` and requiring `tool_b`
pub fn overlay_replacing(tool_a: &str, tool_b: &str) -> LocalOverlay {
    healthy_overlay()
        .with_forbidden_tools([tool_a])
        .with_required_tools([tool_b])
}
