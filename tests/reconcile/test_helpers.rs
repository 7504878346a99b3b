//! Shared fixtures and helpers for reconciliation BDD scenarios.

use std::collections::BTreeSet;

use rstest::fixture;

/// Mutable state threaded through reconciliation steps.
#[derive(Clone, Debug, Default)]
pub struct ReconcileContext {
    pub observed: BTreeSet<String>,
    pub previous: BTreeSet<String>,
    pub desired: BTreeSet<String>,
    pub result: Option<BTreeSet<String>>,
}

#[fixture]
pub fn reconcile_context() -> ReconcileContext {
    ReconcileContext::default()
}

/// Parses a comma-separated scenario list into a set.
pub fn parse_set(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .collect()
}
