//! Merge policy
//!
//! Canon values seed every topic. The overlay then overrides them through an
//! explicit, ordered list of resolvers: compliance first, preferences after.
//! A topic locked by compliance cannot be reintroduced by a later resolver.

use sf_model::{CanonExtract, Conflict, LocalOverlay, Priority};

/// Conflict topic for the recommended tool set
pub const TOPIC_TOOLS: &str = "tool choice";

/// Conflict topic for the output format
pub const TOPIC_FORMAT: &str = "output format";

/// One step of the merge policy
pub type Resolver = fn(&MergeInput<'_>, &mut Resolution);

/// Resolvers in precedence order: compliance, then overlay preferences
pub const MERGE_POLICY: [(&str, Resolver); 4] = [
    ("compliance", resolve_compliance),
    ("tooling", resolve_tooling),
    ("format", resolve_format),
    ("priority", resolve_priority),
];

/// Read-only inputs to the resolvers
#[derive(Debug, Clone, Copy)]
pub struct MergeInput<'a> {
    /// Canon defaults
    pub canon: &'a CanonExtract,
    /// Overlay overrides
    pub overlay: &'a LocalOverlay,
}

/// A canon tool removed by a compliance rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannedTool {
    /// Tool name as the canon spelled it
    pub tool: String,
    /// Rule that bans it
    pub rule: String,
}

/// Effective value of every mergeable topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Tools the document may name
    pub tools: Vec<String>,
    /// Canon tools removed by compliance; locked out for later resolvers
    pub banned: Vec<BannedTool>,
    /// Effective output format
    pub output_format: Option<String>,
    /// Optimisation target, carried as an annotation
    pub priority: Priority,
    /// Overrides in resolution order, at most one per topic
    pub conflicts: Vec<Conflict>,
}

impl Resolution {
    /// Seed every topic with its canon default
    #[must_use]
    pub fn seed(input: &MergeInput<'_>) -> Self {
        let mut tools: Vec<String> = Vec::new();
        for tool in &input.canon.recommended_tools.value {
            push_unique(&mut tools, tool);
        }
        Self {
            tools,
            banned: Vec::new(),
            output_format: input
                .canon
                .output_format
                .value
                .as_deref()
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_string),
            priority: input.overlay.priority,
            conflicts: Vec::new(),
        }
    }

    /// Tools the document must not name
    ///
    /// Compliance bans, overlay-forbidden tools and canon recommendations the
    /// overlay replaced.
    #[must_use]
    pub fn excluded_tools(&self, input: &MergeInput<'_>) -> Vec<String> {
        let mut excluded = Vec::new();
        for banned in &self.banned {
            push_unique(&mut excluded, &banned.tool);
        }
        for tool in &input.overlay.tool_requirements.forbidden {
            push_unique(&mut excluded, tool);
        }
        for tool in &input.canon.recommended_tools.value {
            if !self.tools.iter().any(|t| t.eq_ignore_ascii_case(tool.trim())) {
                push_unique(&mut excluded, tool);
            }
        }
        excluded
    }

    /// Whether compliance has locked `tool` out
    #[must_use]
    pub fn is_locked(&self, tool: &str) -> bool {
        self.banned
            .iter()
            .any(|b| b.tool.eq_ignore_ascii_case(tool.trim()))
    }
}

/// Run the whole merge policy
#[must_use]
pub fn resolve(canon: &CanonExtract, overlay: &LocalOverlay) -> Resolution {
    let input = MergeInput { canon, overlay };
    let mut resolution = Resolution::seed(&input);
    for (_, resolver) in MERGE_POLICY {
        resolver(&input, &mut resolution);
    }
    resolution
}

/// Tier 1: prohibitions in compliance rules ban matching canon tools
pub fn resolve_compliance(input: &MergeInput<'_>, state: &mut Resolution) {
    let mut kept = Vec::with_capacity(state.tools.len());
    for tool in std::mem::take(&mut state.tools) {
        match input.overlay.compliance_ban(&tool) {
            Some(rule) => state.banned.push(BannedTool {
                tool,
                rule: rule.trim().to_string(),
            }),
            None => kept.push(tool),
        }
    }
    state.tools = kept;
}

/// Tier 2: required tools replace the canon set, forbidden tools are removed
///
/// Records a single "tool choice" conflict when the effective set differs
/// from a non-empty canon recommendation, whichever tier caused the change.
pub fn resolve_tooling(input: &MergeInput<'_>, state: &mut Resolution) {
    let requirements = &input.overlay.tool_requirements;
    if !requirements.required.is_empty() {
        let mut tools = Vec::new();
        for tool in &requirements.required {
            push_unique(&mut tools, tool);
        }
        state.tools = tools;
    }
    let locked: Vec<String> = state.banned.iter().map(|b| b.tool.clone()).collect();
    state.tools.retain(|t| {
        !requirements.forbids(t)
            && !locked.iter().any(|l| l.eq_ignore_ascii_case(t))
            && input.overlay.compliance_ban(t).is_none()
    });

    let recommended = Resolution::seed(input).tools;
    if recommended.is_empty() || same_set(&recommended, &state.tools) {
        return;
    }

    let reason = if let Some(banned) = state.banned.first() {
        format!("compliance rule '{}' bans {}", banned.rule, banned.tool)
    } else if !requirements.required.is_empty() {
        "local tooling is mandated".to_string()
    } else {
        "local policy forbids the canon tooling".to_string()
    };
    let override_value = if state.tools.is_empty() {
        "none permitted".to_string()
    } else {
        state.tools.join(", ")
    };
    state.conflicts.push(Conflict::new(
        TOPIC_TOOLS,
        recommended.join(", "),
        override_value,
        tradeoff(&reason, input.overlay.priority),
    ));
}

/// Tier 2: the overlay format spec replaces the canon output format
pub fn resolve_format(input: &MergeInput<'_>, state: &mut Resolution) {
    let Some(required) = input.overlay.format_spec.describe() else {
        return;
    };
    if let Some(default) = state.output_format.take() {
        if normalize(&default) != normalize(&required) {
            state.conflicts.push(Conflict::new(
                TOPIC_FORMAT,
                default,
                required.clone(),
                tradeoff("local format spec replaces the canon layout", input.overlay.priority),
            ));
        }
    }
    state.output_format = Some(required);
}

/// Tier 2: priority is an annotation only, never a conflict
pub fn resolve_priority(input: &MergeInput<'_>, state: &mut Resolution) {
    state.priority = input.overlay.priority;
}

fn tradeoff(reason: &str, priority: Priority) -> String {
    format!("{reason}; optimising for {priority}")
}

fn push_unique(tools: &mut Vec<String>, tool: &str) {
    let tool = tool.trim();
    if !tool.is_empty() && !tools.iter().any(|t| t.eq_ignore_ascii_case(tool)) {
        tools.push(tool.to_string());
    }
}

fn same_set(a: &[String], b: &[String]) -> bool {
    a.len() == b.len() && a.iter().all(|x| b.iter().any(|y| y.eq_ignore_ascii_case(x)))
}

fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
