//! BDD step definitions for attribute reconciliation behaviour.

use rstest_bdd_macros::{given, then, when};
use stratus::{reconcile_for_read, reconcile_for_write};

use super::test_helpers::{ReconcileContext, parse_set};

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("assertion failed: {0}")]
    Assertion(String),
}

#[given("a remote set containing \"{values}\"")]
fn remote_set(mut reconcile_context: ReconcileContext, values: String) -> ReconcileContext {
    reconcile_context.observed = parse_set(&values);
    reconcile_context
}

#[given("our previous contribution was \"{values}\"")]
fn previous_contribution(
    mut reconcile_context: ReconcileContext,
    values: String,
) -> ReconcileContext {
    reconcile_context.previous = parse_set(&values);
    reconcile_context
}

#[given("our desired view is \"{values}\"")]
fn desired_view(mut reconcile_context: ReconcileContext, values: String) -> ReconcileContext {
    reconcile_context.desired = parse_set(&values);
    reconcile_context
}

#[when("we reconcile a new contribution of \"{values}\"")]
fn reconcile_new(mut reconcile_context: ReconcileContext, values: String) -> ReconcileContext {
    let desired_new = parse_set(&values);
    reconcile_context.result = Some(reconcile_for_write(
        &reconcile_context.observed,
        &reconcile_context.previous,
        &desired_new,
    ));
    reconcile_context
}

#[when("we compute the present subset")]
fn compute_present(mut reconcile_context: ReconcileContext) -> ReconcileContext {
    reconcile_context.result = Some(reconcile_for_read(
        &reconcile_context.observed,
        &reconcile_context.desired,
    ));
    reconcile_context
}

#[then("the written set is exactly \"{values}\"")]
fn written_set_is(reconcile_context: &ReconcileContext, values: String) -> Result<(), StepError> {
    expect_result(reconcile_context, &values)
}

#[then("the present subset is exactly \"{values}\"")]
fn present_subset_is(
    reconcile_context: &ReconcileContext,
    values: String,
) -> Result<(), StepError> {
    expect_result(reconcile_context, &values)
}

fn expect_result(reconcile_context: &ReconcileContext, values: &str) -> Result<(), StepError> {
    let Some(result) = reconcile_context.result.as_ref() else {
        return Err(StepError::Assertion(String::from("missing result")));
    };
    let expected = parse_set(values);
    if *result == expected {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected {expected:?}, got {result:?}"
        )))
    }
}
