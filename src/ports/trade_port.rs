//! Trade source port trait.

use crate::domain::error::JournalError;
use crate::domain::trade::TradeRecord;

pub trait TradePort {
    fn fetch_trades(&self) -> Result<Vec<TradeRecord>, JournalError>;
}
