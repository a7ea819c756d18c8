//! Section transforms
//!
//! One public function per document section. Each maps the validated inputs
//! and the merge [`Resolution`] to a [`ContentBlock`] and nothing else.

use crate::naming::capitalize;
use crate::resolve::{MergeInput, Resolution};
use once_cell::sync::Lazy;
use regex::Regex;
use sf_model::{
    contains_word, BranchArm, CanonExtract, ContentBlock, GuardClass, Item, LocalOverlay, Risk,
    ScopeCard, Tag,
};

/// Leading "1.", "2)", "Step 3:", "- " markers on canon steps
static STEP_NUMBERING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:step\s*\d+\s*[:.)\-]?|\d+\s*[.):\-]|[-*•])\s*")
        .expect("step numbering pattern is valid")
});

/// Catch-all workflow action
pub const ELSE_ACTION: &str = "stop and re-check the guardrails before continuing";

/// Root cause recorded for locally reported failure patterns
pub const LOCAL_ROOT_CAUSE: &str = "observed in local operations; root cause not yet diagnosed";

/// Fix recorded for locally reported failure patterns
pub const LOCAL_FIX: &str = "stop, capture the failing input and escalate to the skill owner";

/// Fixed navigation stub: (target, label)
pub const REFERENCE_LINKS: [(&str, &str); 4] = [
    ("references/user_overrides.md", "local overlay and compliance constraints"),
    ("references/schema.md", "input and output schema"),
    ("references/examples.md", "worked examples"),
    ("references/decisions.md", "resolved conflicts and their trade-offs"),
];

/// Normalise one canon step into a single sentence
#[must_use]
pub fn normalize_step(raw: &str) -> String {
    let stripped = STEP_NUMBERING.replace(raw, "");
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    terminate(&capitalize(&collapsed))
}

fn terminate(sentence: &str) -> String {
    if sentence.is_empty() || sentence.ends_with(['.', '!', '?']) {
        sentence.to_string()
    } else {
        format!("{sentence}.")
    }
}

/// Quick Start: canon steps, normalised, with structured format affixes
#[must_use]
pub fn quickstart(canon: &CanonExtract, overlay: &LocalOverlay) -> ContentBlock {
    let prefix = overlay.format_spec.get("step_prefix").map(str::trim);
    let suffix = overlay.format_spec.get("step_suffix").map(str::trim);

    let items = canon
        .quickstart_steps
        .value
        .iter()
        .map(|raw| normalize_step(raw))
        .filter(|step| !step.is_empty())
        .map(|mut step| {
            if let Some(suffix) = suffix.filter(|s| !s.is_empty()) {
                step = terminate(&format!("{} {suffix}", step.trim_end_matches('.')));
            }
            if let Some(prefix) = prefix.filter(|p| !p.is_empty()) {
                step = format!("{prefix} {step}");
            }
            Item::Step { text: step }
        })
        .collect();
    ContentBlock::new(items)
}

/// Workflow: one branch per decision point, a fixed catch-all, then notes
#[must_use]
pub fn workflow(scope: &ScopeCard, canon: &CanonExtract, resolution: &Resolution) -> ContentBlock {
    let mut items: Vec<Item> = canon
        .decision_points
        .value
        .iter()
        .enumerate()
        .map(|(i, point)| Item::Branch {
            arm: if i == 0 { BranchArm::If } else { BranchArm::ElseIf },
            condition: Some(strip_if(&point.condition)),
            action: point.action.trim().to_string(),
        })
        .collect();

    if !items.is_empty() {
        items.push(Item::Branch {
            arm: BranchArm::Else,
            condition: None,
            action: ELSE_ACTION.to_string(),
        });
    }

    if let Some(format) = &resolution.output_format {
        items.push(Item::Note {
            label: "Output format".to_string(),
            text: format.clone(),
        });
    }
    items.push(Item::Note {
        label: "Priority".to_string(),
        text: resolution.priority.label().to_string(),
    });
    items.push(Item::Note {
        label: "Done when".to_string(),
        text: scope.success_criteria.trim().to_string(),
    });
    ContentBlock::new(items)
}

fn strip_if(condition: &str) -> String {
    let trimmed = condition.trim();
    match trimmed.get(..3) {
        Some(head) if head.eq_ignore_ascii_case("if ") => trimmed[3..].trim().to_string(),
        _ => trimmed.to_string(),
    }
}

/// Guardrails: scope boundary, compliance, permitted tools, scripted actions
///
/// A high-risk failure mode whose symptom or fix names an excluded tool gets
/// no scripted guard; the brittleness gate then reports it.
#[must_use]
pub fn guardrails(
    scope: &ScopeCard,
    canon: &CanonExtract,
    overlay: &LocalOverlay,
    resolution: &Resolution,
) -> ContentBlock {
    let guard = |class: GuardClass, text: &str| Item::Guard {
        class,
        text: text.trim().to_string(),
    };

    let mut items: Vec<Item> = Vec::new();
    items.extend(scope.triggers.iter().map(|t| guard(GuardClass::Trigger, t)));
    items.extend(scope.must_cover.iter().map(|t| guard(GuardClass::MustCover, t)));
    items.extend(scope.must_not_cover.iter().map(|t| guard(GuardClass::MustNotCover, t)));

    if overlay.compliance_constraints.is_empty() {
        items.push(guard(GuardClass::Compliance, "none declared"));
    } else {
        items.extend(
            overlay
                .compliance_constraints
                .iter()
                .map(|rule| guard(GuardClass::Compliance, rule)),
        );
    }

    if !resolution.tools.is_empty() {
        items.push(guard(
            GuardClass::Tooling,
            &format!("use {} only", resolution.tools.join(", ")),
        ));
    }

    let excluded = resolution.excluded_tools(&MergeInput { canon, overlay });
    let names_excluded = |text: &str| excluded.iter().any(|t| contains_word(text, t));
    items.extend(
        canon
            .failure_modes
            .value
            .iter()
            .filter(|m| m.risk == Risk::High && !m.fix.trim().is_empty())
            .filter(|m| !names_excluded(&m.symptom) && !names_excluded(&m.fix))
            .map(|m| {
                guard(
                    GuardClass::Scripted,
                    &format!(
                        "on \"{}\", apply exactly: {}",
                        m.symptom.trim(),
                        m.fix.trim()
                    ),
                )
            }),
    );
    ContentBlock::new(items)
}

/// Templates: canon snippets tagged with provenance
#[must_use]
pub fn templates(canon: &CanonExtract) -> ContentBlock {
    let tag = Tag::Canon(canon.templates.provenance.clone());
    ContentBlock::new(
        canon
            .templates
            .value
            .iter()
            .map(|t| Item::Template {
                name: t.name.trim().to_string(),
                body: t.body.clone(),
                tag: tag.clone(),
            })
            .collect(),
    )
}

/// Failure Modes: canon entries, then local patterns tagged `local`
#[must_use]
pub fn failure_modes(canon: &CanonExtract, overlay: &LocalOverlay) -> ContentBlock {
    let tag = Tag::Canon(canon.failure_modes.provenance.clone());
    let canon_items = canon.failure_modes.value.iter().map(|m| Item::FailureMode {
        symptom: m.symptom.trim().to_string(),
        root_cause: m.root_cause.trim().to_string(),
        fix: m.fix.trim().to_string(),
        risk: m.risk,
        tag: tag.clone(),
    });
    let local_items = overlay
        .known_failure_patterns
        .iter()
        .map(|pattern| Item::FailureMode {
            symptom: pattern.clone(),
            root_cause: LOCAL_ROOT_CAUSE.to_string(),
            fix: LOCAL_FIX.to_string(),
            risk: Risk::Standard,
            tag: Tag::Local,
        });
    ContentBlock::new(canon_items.chain(local_items).collect())
}

/// Edge Cases: canon entries tagged with provenance
#[must_use]
pub fn edge_cases(canon: &CanonExtract) -> ContentBlock {
    let tag = Tag::Canon(canon.edge_cases.provenance.clone());
    ContentBlock::new(
        canon
            .edge_cases
            .value
            .iter()
            .map(|text| Item::EdgeCase {
                text: text.trim().to_string(),
                tag: tag.clone(),
            })
            .collect(),
    )
}

/// References: fixed navigation stub
#[must_use]
pub fn references() -> ContentBlock {
    ContentBlock::new(
        REFERENCE_LINKS
            .iter()
            .map(|(target, label)| Item::Link {
                label: (*label).to_string(),
                target: (*target).to_string(),
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::resolve;
    use pretty_assertions::assert_eq;
    use sf_model::{FailureMode, FormatSpec, Provenance};
    use sf_test_utils::{healthy_canon, healthy_overlay, healthy_scope};

    fn steps(block: &ContentBlock) -> Vec<String> {
        block
            .iter()
            .filter_map(|i| match i {
                Item::Step { text } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn step_numbering_is_stripped() {
        assert_eq!(normalize_step("1. install  ruff"), "Install ruff.");
        assert_eq!(normalize_step("Step 2: run ruff check"), "Run ruff check.");
        assert_eq!(normalize_step("- Fix violations!"), "Fix violations!");
        assert_eq!(normalize_step("   "), "");
    }

    #[test]
    fn quickstart_keeps_canon_count() {
        let canon = healthy_canon().with_quickstart(["a", "b", "c", "d"], Provenance::Unverified);
        assert_eq!(quickstart(&canon, &healthy_overlay()).len(), 4);

        let canon = healthy_canon().with_quickstart(["only one"], Provenance::Unverified);
        assert_eq!(quickstart(&canon, &healthy_overlay()).len(), 1);
    }

    #[test]
    fn structured_format_affixes_steps() {
        let mut map = indexmap::IndexMap::new();
        map.insert("step_prefix".to_string(), "Run:".to_string());
        map.insert("step_suffix".to_string(), "in the repo root".to_string());
        let overlay = healthy_overlay().with_format(FormatSpec::Structured(map));
        let canon = healthy_canon().with_quickstart(["1. lint the code"], Provenance::Unverified);

        assert_eq!(
            steps(&quickstart(&canon, &overlay)),
            vec!["Run: Lint the code in the repo root.".to_string()]
        );
    }

    #[test]
    fn workflow_chains_branches_with_else() {
        let canon = healthy_canon();
        let block = workflow(&healthy_scope(), &canon, &resolve(&canon, &healthy_overlay()));
        let arms: Vec<BranchArm> = block
            .iter()
            .filter_map(|i| match i {
                Item::Branch { arm, .. } => Some(*arm),
                _ => None,
            })
            .collect();
        assert_eq!(arms, vec![BranchArm::If, BranchArm::ElseIf, BranchArm::Else]);
    }

    #[test]
    fn guardrails_state_boundary_and_scripted_actions() {
        let canon = healthy_canon();
        let overlay = healthy_overlay();
        let block = guardrails(&healthy_scope(), &canon, &overlay, &resolve(&canon, &overlay));

        let count = |class: GuardClass| {
            block
                .iter()
                .filter(|i| matches!(i, Item::Guard { class: c, .. } if *c == class))
                .count()
        };
        assert_eq!(count(GuardClass::Trigger), 5);
        assert_eq!(count(GuardClass::MustCover), 3);
        assert_eq!(count(GuardClass::MustNotCover), 3);
        assert_eq!(count(GuardClass::Compliance), 1);
        assert_eq!(count(GuardClass::Scripted), 1);
    }

    #[test]
    fn scripted_guard_never_names_an_excluded_tool() {
        let mut canon = healthy_canon()
            .with_recommended_tools(["pylint"], Provenance::cited("https://pylint.org"));
        canon.failure_modes.value.push(
            FailureMode::new(
                "Lint run crashes",
                "Plugin incompatible with interpreter",
                "Rerun pylint with --disable=all",
            )
            .high_risk(),
        );
        let overlay = healthy_overlay()
            .with_compliance(["Never use pylint"])
            .with_required_tools(["ruff"]);
        let resolution = resolve(&canon, &overlay);
        assert_eq!(
            resolution.excluded_tools(&MergeInput { canon: &canon, overlay: &overlay }),
            vec!["pylint".to_string()]
        );

        let block = guardrails(&healthy_scope(), &canon, &overlay, &resolution);
        let scripted: Vec<&str> = block
            .iter()
            .filter_map(|i| match i {
                Item::Guard { class: GuardClass::Scripted, text } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(scripted.len(), 1);
        assert!(scripted[0].contains("Autofix rewrites files unexpectedly"));
        assert!(block.iter().all(|i| match i {
            Item::Guard { class: GuardClass::Compliance, .. } => true,
            Item::Guard { text, .. } => !text.contains("pylint"),
            _ => true,
        }));
    }

    #[test]
    fn local_patterns_appended_verbatim() {
        let overlay = healthy_overlay().with_failure_patterns(["  Linter hangs on CI "]);
        let block = failure_modes(&healthy_canon(), &overlay);
        assert_eq!(block.len(), 6);
        match block.items.last() {
            Some(Item::FailureMode { symptom, tag, .. }) => {
                assert_eq!(symptom, "  Linter hangs on CI ");
                assert_eq!(*tag, Tag::Local);
            }
            other => panic!("unexpected last item: {other:?}"),
        }
    }

    #[test]
    fn references_are_fixed() {
        assert_eq!(references().len(), REFERENCE_LINKS.len());
    }
}
