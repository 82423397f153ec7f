mod model;
mod repository;

pub use model::{DailyJournalDB, NewDailyJournalDB};
pub use repository::JournalRepository;
pub(crate) use repository::delete_owned_journals;
