mod model;
mod repository;

pub use model::{AccountDB, NewAccountDB};
pub use repository::AccountRepository;
pub(crate) use repository::delete_owned_accounts;
