//! Local/remote sync engine.

mod capability_prober;
mod id_remapper;
mod mutation_tracker;
mod pull_protocol;
mod push_protocol;
mod remote_rows;
mod sync_config;
mod sync_engine;
mod sync_model;
mod sync_scheduler;
mod user_lifecycle;

pub use capability_prober::*;
pub use id_remapper::*;
pub use mutation_tracker::*;
pub use pull_protocol::*;
pub use push_protocol::*;
pub use remote_rows::*;
pub use sync_config::*;
pub use sync_engine::*;
pub use sync_model::*;
pub use sync_scheduler::*;
pub use user_lifecycle::*;
