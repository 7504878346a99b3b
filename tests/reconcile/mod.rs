//! Module wiring for reconciliation behaviour tests.

mod bdd_steps;
mod scenarios;
mod test_helpers;
