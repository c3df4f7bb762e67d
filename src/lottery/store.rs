use std::sync::RwLock;

use async_trait::async_trait;

use super::Bet;

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("the bet store is unavailable: {0}")]
    Unavailable(String),
}

/// Durable home for accepted bets
///
/// implementations are free to write wherever they like, but `load_all`
/// must return every stored bet in the order the batches were accepted.
#[async_trait]
pub trait BetStore: Send + Sync {
    async fn store(&self, bets: Vec<Bet>) -> Result<(), StorageError>;

    async fn load_all(&self) -> Result<Vec<Bet>, StorageError>;
}

#[derive(Debug, Default)]
pub struct MemoryBetStore {
    bets: RwLock<Vec<Bet>>,
}

#[async_trait]
impl BetStore for MemoryBetStore {
    async fn store(&self, bets: Vec<Bet>) -> Result<(), StorageError> {
        self.bets.write().unwrap().extend(bets);
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<Bet>, StorageError> {
        Ok(self.bets.read().unwrap().clone())
    }
}
