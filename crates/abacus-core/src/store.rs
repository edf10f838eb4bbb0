use crate::error::AbacusResult;

/// Persistent backing for the result history.
///
/// The engine keeps the authoritative copy in memory; a store only sees
/// whole snapshots (most recent first) and is read once at startup.
pub trait HistoryStore: Send {
    fn load(&mut self) -> AbacusResult<Vec<f64>>;
    fn save(&mut self, values: &[f64]) -> AbacusResult<()>;
    fn clear(&mut self) -> AbacusResult<()>;
}
