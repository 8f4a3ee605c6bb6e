//! Probabilistic tracking of unseen card locations for one observer.
//!
//! This module is composed of:
//! - `location`: the nine tracked locations and their helpers.
//! - `model`: the probability table and its incremental update operations.

mod location;
mod model;

pub use location::Location;
pub use model::{BeliefError, BeliefModel, PlayableEstimate};
