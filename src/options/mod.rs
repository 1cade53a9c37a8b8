//! Option state, host policy, and the rules that reconcile them.

pub mod bounds;
pub mod policy;
pub mod reconcile;
pub mod state;

#[cfg(test)]
mod test_properties;
