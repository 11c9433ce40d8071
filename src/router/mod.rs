//! Program delivery on one network.
//!
//! - `config`: deployment parameters
//! - `registry`: bridge, asset and contract tables
//! - `events`: the event log read-model layers subscribe to
//! - `service`: the [`Router`] itself

pub mod config;
pub mod errors;
pub mod events;
pub mod registry;
pub mod service;

pub use config::{DEFAULT_UNIT_SCALE, RouterConfig};
pub use errors::RouterError;
pub use events::RouterEvent;
pub use service::Router;
