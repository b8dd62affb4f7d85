//! AI storyteller module.
//!
//! Contains the narrator trait, the live storyteller agent backed by the
//! Claude API, and the structured schemas the agent asks the model to fill.

mod agent;
mod schema;

pub use agent::{Narrator, Storyteller, TellerConfig, TellerError};
pub use schema::{NextActions, Scene};
