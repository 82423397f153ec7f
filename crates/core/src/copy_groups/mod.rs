//! Trade-copier groups: one leader account mirrored by follower accounts.

mod copy_groups_model;

pub use copy_groups_model::*;
