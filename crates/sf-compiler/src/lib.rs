//! SkillForge Compiler
//!
//! Merges a validated [`ScopeCard`], [`CanonExtract`] and [`LocalOverlay`]
//! into a seven-section [`Document`].
//!
//! # Core Concepts
//!
//! - [`MERGE_POLICY`]: ordered resolvers, compliance before preferences
//! - [`Resolution`]: effective value of every mergeable topic plus conflicts
//! - [`sections`]: one pure transform per document section
//!
//! Compilation is a pure function: identical inputs give byte-identical
//! rendered output.
//!
//! # Example
//!
//! ```rust,ignore
//! use sf_compiler::compile;
//!
//! let doc = compile(&scope, &canon, &overlay)?;
//! assert_eq!(doc.sections().len(), 7);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod naming;
mod resolve;
pub mod sections;

pub use naming::{short_description, skill_name, skill_title, MAX_DESCRIPTION_CHARS};
pub use resolve::{
    resolve, resolve_compliance, resolve_format, resolve_priority, resolve_tooling, BannedTool,
    MergeInput, Resolution, Resolver, MERGE_POLICY, TOPIC_FORMAT, TOPIC_TOOLS,
};

use indexmap::IndexMap;
use sf_model::{
    CanonExtract, Document, DocumentMeta, InputValidationError, LocalOverlay, ScopeCard,
    SectionName,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Compile the three inputs into a document
///
/// All inputs are validated before any merge work starts.
///
/// # Errors
/// Returns the first violated input invariant, naming record and field.
pub fn compile(
    scope: &ScopeCard,
    canon: &CanonExtract,
    overlay: &LocalOverlay,
) -> Result<Document, InputValidationError> {
    scope.validate()?;
    canon.validate()?;
    overlay.validate()?;

    let resolution = resolve(canon, overlay);

    let mut blocks = IndexMap::with_capacity(SectionName::ALL.len());
    blocks.insert(SectionName::Quickstart, sections::quickstart(canon, overlay));
    blocks.insert(
        SectionName::Workflow,
        sections::workflow(scope, canon, &resolution),
    );
    blocks.insert(
        SectionName::Guardrails,
        sections::guardrails(scope, canon, overlay, &resolution),
    );
    blocks.insert(SectionName::Templates, sections::templates(canon));
    blocks.insert(
        SectionName::FailureModes,
        sections::failure_modes(canon, overlay),
    );
    blocks.insert(SectionName::EdgeCases, sections::edge_cases(canon));
    blocks.insert(SectionName::References, sections::references());

    let meta = DocumentMeta {
        name: skill_name(&scope.goal),
        title: skill_title(&scope.goal),
        description: short_description(&scope.goal, &scope.triggers, &resolution.tools),
        output_form: scope.output_form,
        priority: resolution.priority,
        canon_origin: canon.origin.clone(),
        fallback_sourced: canon.is_fallback(),
    };

    Ok(Document::assemble(meta, blocks, resolution.conflicts))
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use sf_model::{CanonOrigin, GuardClass, InputRecord, Item, Provenance};
    use sf_test_utils::{
        canon_recommending, healthy_canon, healthy_overlay, healthy_scope, overlay_replacing,
    };

    #[test]
    fn healthy_inputs_produce_seven_sections() {
        let doc = compile(&healthy_scope(), &healthy_canon(), &healthy_overlay()).unwrap();

        let keys: Vec<_> = doc.sections().keys().copied().collect();
        assert_eq!(keys, SectionName::ALL.to_vec());
        assert_eq!(doc.meta().name, "lint-python-code");
        assert!(doc.conflicts().is_empty());
        assert!(!doc.is_fallback_sourced());
        assert_eq!(doc.section(SectionName::Quickstart).len(), 3);
    }

    #[test]
    fn invalid_scope_rejected_before_merge() {
        let mut scope = healthy_scope();
        scope.triggers.truncate(2);
        let err = compile(&scope, &healthy_canon(), &healthy_overlay()).unwrap_err();
        assert_eq!(err.record, InputRecord::ScopeCard);
        assert_eq!(err.field, "triggers");
    }

    #[test]
    fn invalid_overlay_rejected() {
        let overlay = healthy_overlay()
            .with_required_tools(["ruff"])
            .with_forbidden_tools(["ruff"]);
        let err = compile(&healthy_scope(), &healthy_canon(), &overlay).unwrap_err();
        assert_eq!(err.record, InputRecord::LocalOverlay);
    }

    #[test]
    fn overridden_tool_never_reaches_guardrails() {
        let doc = compile(
            &healthy_scope(),
            &canon_recommending("pylint"),
            &overlay_replacing("pylint", "ruff"),
        )
        .unwrap();

        assert_eq!(doc.conflicts().len(), 1);
        assert_eq!(doc.conflicts()[0].topic, TOPIC_TOOLS);

        let tools: Vec<&str> = doc
            .section(SectionName::Guardrails)
            .iter()
            .filter_map(|i| match i {
                Item::Guard { class: GuardClass::Tooling, text } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(tools, vec!["use ruff only"]);

        let guardrails = doc.render_markdown();
        let section = guardrails
            .split("## Guardrails")
            .nth(1)
            .and_then(|s| s.split("## Templates").next())
            .unwrap();
        assert!(!section.contains("pylint"));
        assert!(doc.render_markdown().contains("## Resolved Conflicts"));
    }

    #[test]
    fn mid_sentence_prohibition_bans_canon_tool() {
        let overlay = healthy_overlay().with_compliance(["Using pylint is forbidden on customer code"]);
        let doc = compile(&healthy_scope(), &canon_recommending("pylint"), &overlay).unwrap();

        assert_eq!(doc.conflicts().len(), 1);
        assert_eq!(doc.conflicts()[0].topic, TOPIC_TOOLS);
        assert_eq!(doc.conflicts()[0].override_value, "none permitted");
        assert!(doc.section(SectionName::Guardrails).iter().all(|i| !matches!(
            i,
            Item::Guard { class: GuardClass::Tooling, .. }
        )));
    }

    #[test]
    fn fallback_canon_flags_document() {
        let canon = CanonExtract {
            origin: CanonOrigin::OfflineFallback,
            ..healthy_canon()
        };
        let doc = compile(&healthy_scope(), &canon, &healthy_overlay()).unwrap();
        assert!(doc.is_fallback_sourced());
        assert!(doc.render_markdown().contains("canon: unverified-fallback"));
    }

    proptest! {
        #[test]
        fn compilation_is_deterministic(
            steps in prop::collection::vec("[a-z]{1,12}( [a-z]{1,12}){0,4}", 0..6),
            edges in prop::collection::vec("[A-Za-z ]{1,30}", 0..8),
            patterns in prop::collection::vec("[a-z]{3,20}", 0..4),
        ) {
            let canon = healthy_canon()
                .with_quickstart(steps, Provenance::Unverified)
                .with_edge_cases(edges, Provenance::cited("fixture"));
            let overlay = healthy_overlay().with_failure_patterns(patterns);

            let a = compile(&healthy_scope(), &canon, &overlay).unwrap();
            let b = compile(&healthy_scope(), &canon, &overlay).unwrap();
            prop_assert_eq!(a.render_markdown(), b.render_markdown());
            prop_assert_eq!(a.line_count(), a.render_markdown().lines().count());
            prop_assert_eq!(a.sections().len(), 7);
        }
    }
}
