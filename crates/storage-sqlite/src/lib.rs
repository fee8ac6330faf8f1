//! Pocketwise SQLite storage.
//!
//! Implements the repository traits from `pocketwise-core` with diesel.
//! Reads go through the r2d2 pool; every write is funnelled through the
//! single writer thread behind [`db::WriteHandle`].

pub mod accounts;
pub mod db;
pub mod errors;
pub mod schema;
pub mod transactions;

pub use accounts::AccountRepository;
pub use db::{create_pool, get_connection, init, run_migrations, spawn_writer, DbPool, WriteHandle};
pub use errors::StorageError;
pub use transactions::TransactionRepository;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use tempfile::{tempdir, TempDir};

    use crate::db::{create_pool, init, run_migrations, spawn_writer, DbPool, WriteHandle};

    pub fn setup_db() -> (TempDir, Arc<DbPool>, WriteHandle) {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("pocketwise.db");
        let db_path = init(&path.to_string_lossy()).expect("init db");
        run_migrations(&db_path).expect("migrate db");
        let pool = create_pool(&db_path).expect("create pool");
        let writer = spawn_writer(pool.as_ref().clone());
        (dir, pool, writer)
    }
}
