use rusqlite::Connection;

use abacus_core::AbacusError;

pub fn init_db(conn: &Connection) -> Result<(), AbacusError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS results (
            position INTEGER PRIMARY KEY, -- 0 = most recent
            value REAL NOT NULL,
            saved_at TEXT NOT NULL
        );
        ",
    )
    .map_err(|e| AbacusError::Persistence(e.to_string()))?;

    Ok(())
}
