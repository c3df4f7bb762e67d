pub mod bets;
pub mod draw;
pub mod store;

pub type AgencyId = u32;

pub use bets::{parse_batch, BatchFormatError, Bet};
pub use draw::{DrawBarrier, NumberMatchEvaluator, WinEvaluator};
pub use store::{BetStore, MemoryBetStore, StorageError};
