//! Non-destructive reconciliation of shared attribute sets.
//!
//! Tags and security-group memberships are writable only as a full
//! replacement, and other actors may add or remove elements at any time.
//! The write-side computation subtracts exactly what this tool previously
//! asked for, so elements contributed out-of-band survive a desired-state
//! update. Callers must read the observed set fresh for every write; a
//! stale snapshot silently breaks the subtraction.

use std::collections::BTreeSet;

/// Computes the full set to write back when the desired contribution
/// changes: `(all_observed − desired_previous) ∪ desired_new`.
///
/// Subtracting the previously-desired set, not the full observed set,
/// preserves every element owned by other actors. An element of
/// `desired_previous` that another actor coincidentally also wants is
/// removed with ours; the remote API offers no ownership primitive that
/// could distinguish the two contributions.
#[must_use]
pub fn reconcile_for_write(
    all_observed: &BTreeSet<String>,
    desired_previous: &BTreeSet<String>,
    desired_new: &BTreeSet<String>,
) -> BTreeSet<String> {
    let mut result: BTreeSet<String> = all_observed
        .difference(desired_previous)
        .cloned()
        .collect();
    result.extend(desired_new.iter().cloned());
    result
}

/// Computes the subset of `desired` actually present remotely:
/// `all_observed ∩ desired`.
///
/// Used to present "what of mine is still there" without asserting
/// ownership over anything outside `desired`. A result smaller than
/// `desired` means something was removed out-of-band; callers narrow their
/// stored desired set to the result instead of erroring.
#[must_use]
pub fn reconcile_for_read(
    all_observed: &BTreeSet<String>,
    desired: &BTreeSet<String>,
) -> BTreeSet<String> {
    all_observed.intersection(desired).cloned().collect()
}

#[cfg(test)]
mod tests;
