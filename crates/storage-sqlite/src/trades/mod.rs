mod model;
mod repository;

pub use model::{NewTradeDB, TradeDB};
pub use repository::TradeRepository;
pub(crate) use repository::delete_owned_trades;
