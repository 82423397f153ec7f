mod model;
mod repository;

pub use model::{CopyGroupDB, CopyMemberDB, NewCopyGroupDB, NewCopyMemberDB};
pub use repository::CopyGroupRepository;
pub(crate) use repository::delete_owned_copy_groups;
