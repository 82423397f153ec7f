//! Store contracts consumed by the sync engine.
//!
//! The local command surface owns small sequential identifiers; the remote
//! relational service owns globally unique ones.

mod command;
mod local_store_traits;
mod remote_store_traits;

pub use command::*;
pub use local_store_traits::*;
pub use remote_store_traits::*;
