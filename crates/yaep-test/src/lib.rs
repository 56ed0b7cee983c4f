//! Integration test suite: end-to-end scenarios and cross-cutting testable
//! properties, each exercised through the public `yaep` crate rather than
//! reaching into `yaep_core` internals.

mod utils;

#[cfg(test)]
mod scenario_s1_balanced;

#[cfg(test)]
mod scenario_s2_ambiguous_arithmetic;

#[cfg(test)]
mod scenario_s3_leo_right_recursive;

#[cfg(test)]
mod scenario_s4_error_recovery;

#[cfg(test)]
mod scenario_s5_cost_selection;

#[cfg(test)]
mod scenario_s6_nullable_heavy;

#[cfg(test)]
mod property_arena_bound;

#[cfg(test)]
mod property_dag_sharing;

#[cfg(test)]
mod property_determinism;

#[cfg(test)]
mod property_leo_equivalence;

#[cfg(test)]
mod property_lookahead_levels;
