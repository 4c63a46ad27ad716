//! Application use cases. Orchestrate domain logic via ports.

pub mod dispatcher;

pub use dispatcher::{Dispatch, Route, TurnDispatcher};
