//! Serializes every write through one connection on a dedicated thread.

use diesel::sqlite::SqliteConnection;
use log::{debug, error};
use tokio::sync::{mpsc, oneshot};

use pocketwise_core::{Error, Result};

use super::{DbConnection, DbPool};
use crate::errors::StorageError;

type Job = Box<dyn FnOnce(&mut SqliteConnection) + Send + 'static>;

/// Error raised inside a write transaction: either the job's own failure or
/// diesel failing to begin or commit.
enum TxError {
    Job(Error),
    Diesel(diesel::result::Error),
}

impl From<diesel::result::Error> for TxError {
    fn from(err: diesel::result::Error) -> Self {
        Self::Diesel(err)
    }
}

#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::UnboundedSender<Job>,
}

impl WriteHandle {
    /// Runs `job` inside an immediate transaction on the writer connection.
    /// An `Err` from the job rolls the transaction back.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel::<Result<T>>();
        let boxed: Job = Box::new(move |conn: &mut SqliteConnection| {
            let outcome = conn
                .immediate_transaction::<T, TxError, _>(|tx_conn| job(tx_conn).map_err(TxError::Job))
                .map_err(|e| match e {
                    TxError::Job(err) => err,
                    TxError::Diesel(err) => StorageError::from(err).into(),
                });
            // Receiver gone means the caller was cancelled; the write already happened.
            let _ = reply_tx.send(outcome);
        });

        self.tx
            .send(boxed)
            .map_err(|_| StorageError::WriterUnavailable("writer thread has stopped".to_string()))?;

        match reply_rx.await {
            Ok(outcome) => outcome,
            Err(_) => Err(StorageError::WriterUnavailable(
                "writer dropped the job without replying".to_string(),
            )
            .into()),
        }
    }
}

/// Starts the writer thread. It holds one pooled connection for its lifetime
/// and stops once every `WriteHandle` is dropped.
pub fn spawn_writer(pool: DbPool) -> WriteHandle {
    let (tx, mut rx) = mpsc::unbounded_channel::<Job>();

    let spawned = std::thread::Builder::new()
        .name("pocketwise-db-writer".to_string())
        .spawn(move || {
            let mut conn: Option<DbConnection> = None;
            while let Some(job) = rx.blocking_recv() {
                if conn.is_none() {
                    match pool.get() {
                        Ok(c) => conn = Some(c),
                        Err(e) => {
                            error!("Writer could not acquire a database connection: {}", e);
                            continue;
                        }
                    }
                }
                if let Some(c) = conn.as_mut() {
                    job(&mut **c);
                }
            }
            debug!("Database writer stopped");
        });

    if let Err(e) = spawned {
        error!("Failed to start database writer thread: {}", e);
    }

    WriteHandle { tx }
}
