//! BDD scenarios for attribute reconciliation.

use rstest_bdd_macros::scenario;

use super::test_helpers::{ReconcileContext, reconcile_context};

#[scenario(
    path = "tests/features/reconcile.feature",
    name = "Replace our contribution without touching foreign elements"
)]
fn scenario_replace_contribution(reconcile_context: ReconcileContext) {
    drop(reconcile_context);
}

#[scenario(
    path = "tests/features/reconcile.feature",
    name = "Re-asserting an unchanged contribution is a no-op"
)]
fn scenario_unchanged_contribution(reconcile_context: ReconcileContext) {
    drop(reconcile_context);
}

#[scenario(
    path = "tests/features/reconcile.feature",
    name = "Out-of-band removals narrow the desired view"
)]
fn scenario_out_of_band_removal(reconcile_context: ReconcileContext) {
    drop(reconcile_context);
}
