//! Shared test utilities for logmux integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file. Monitor and session helpers run on real time with a
//! generous deadline, since they depend on filesystem notifications.

pub mod assertions;
pub mod builders;
pub mod fixtures;
pub mod recording;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
pub use recording::*;
