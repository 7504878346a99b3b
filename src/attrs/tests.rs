//! Tests for non-destructive attribute reconciliation.

use std::collections::BTreeSet;

use rstest::rstest;

use super::*;

fn set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}

#[rstest]
#[case(&["a", "b", "x"], &["a"], &["c"], &["b", "c", "x"])]
#[case(&[], &[], &["a"], &["a"])]
#[case(&["a"], &["a"], &[], &[])]
#[case(&["a", "b"], &[], &[], &["a", "b"])]
fn write_replaces_only_our_contribution(
    #[case] observed: &[&str],
    #[case] previous: &[&str],
    #[case] desired: &[&str],
    #[case] expected: &[&str],
) {
    let result = reconcile_for_write(&set(observed), &set(previous), &set(desired));
    assert_eq!(result, set(expected));
}

#[rstest]
#[case(&["a", "b", "x"], &["a"], &["c"])]
#[case(&["one", "two"], &["two"], &["two", "three"])]
#[case(&[], &["gone"], &["new"])]
fn write_result_bounds_hold(
    #[case] observed: &[&str],
    #[case] previous: &[&str],
    #[case] desired: &[&str],
) {
    let observed_set = set(observed);
    let previous_set = set(previous);
    let desired_set = set(desired);
    let result = reconcile_for_write(&observed_set, &previous_set, &desired_set);

    assert!(desired_set.is_subset(&result), "desired must be in result");
    let foreign: BTreeSet<String> = observed_set.difference(&previous_set).cloned().collect();
    assert!(foreign.is_subset(&result), "foreign elements must survive");
    let bound: BTreeSet<String> = observed_set.union(&desired_set).cloned().collect();
    assert!(result.is_subset(&bound), "result must not invent elements");
}

#[rstest]
fn write_is_noop_when_desired_unchanged_and_present() {
    let observed = set(&["mine", "other", "extra"]);
    let desired = set(&["mine"]);
    let result = reconcile_for_write(&observed, &desired, &desired);
    assert_eq!(result, observed);
}

/// Accepted limitation: an element this tool previously desired that
/// another actor also contributed cannot be told apart from our own, so
/// dropping it from the desired set removes it outright.
#[rstest]
fn coincidental_overlap_is_removed_with_previous() {
    let observed = set(&["shared", "other"]);
    let previous = set(&["shared"]);
    let desired = set(&[]);
    let result = reconcile_for_write(&observed, &previous, &desired);
    assert_eq!(result, set(&["other"]));
}

#[rstest]
#[case(&["a", "b", "c"], &["b", "d"], &["b"])]
#[case(&[], &["a"], &[])]
#[case(&["a"], &[], &[])]
fn read_returns_present_subset(
    #[case] observed: &[&str],
    #[case] desired: &[&str],
    #[case] expected: &[&str],
) {
    let result = reconcile_for_read(&set(observed), &set(desired));
    assert_eq!(result, set(expected));
}

#[rstest]
fn read_result_is_subset_of_both_inputs() {
    let observed = set(&["a", "b", "x"]);
    let desired = set(&["b", "x", "z"]);
    let result = reconcile_for_read(&observed, &desired);
    assert!(result.is_subset(&observed));
    assert!(result.is_subset(&desired));
}

#[rstest]
fn read_detects_out_of_band_removal() {
    let observed = set(&["kept"]);
    let desired = set(&["kept", "removed-elsewhere"]);
    let result = reconcile_for_read(&observed, &desired);
    assert_eq!(result, set(&["kept"]));
    assert_ne!(result, desired, "drift must be visible to the caller");
}
