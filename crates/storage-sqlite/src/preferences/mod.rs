mod model;
mod repository;

pub use model::{NewPillColorDB, PillColorDB, UserProfileDB};
pub use repository::PreferencesRepository;
pub(crate) use repository::delete_owned_pill_colors;
