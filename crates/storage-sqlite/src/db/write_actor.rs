//! Every write goes through one dedicated connection, one transaction per job.

use diesel::SqliteConnection;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

use super::DbPool;
use crate::errors::StorageError;
use tradejournal_core::{Error, Result};

type Job = Box<dyn FnOnce(&mut SqliteConnection) + Send + 'static>;

/// Error carried out of a write transaction.
enum TxError {
    Diesel(diesel::result::Error),
    Job(Error),
}

impl From<diesel::result::Error> for TxError {
    fn from(err: diesel::result::Error) -> Self {
        TxError::Diesel(err)
    }
}

/// Sender side of the write actor. Cheap to clone.
#[derive(Debug, Clone)]
pub struct WriteHandle {
    tx: mpsc::UnboundedSender<Job>,
}

impl WriteHandle {
    /// Runs `job` inside an immediate transaction on the writer connection.
    ///
    /// An `Err` from the job rolls the transaction back.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let boxed: Job = Box::new(move |conn: &mut SqliteConnection| {
            let result = conn
                .immediate_transaction::<T, TxError, _>(|conn| job(conn).map_err(TxError::Job))
                .map_err(|err| match err {
                    TxError::Diesel(err) => Error::from(StorageError::from(err)),
                    TxError::Job(err) => err,
                });
            // The caller may have gone away.
            let _ = reply_tx.send(result);
        });

        self.tx
            .send(boxed)
            .map_err(|_| StorageError::WriterUnavailable)?;
        reply_rx
            .await
            .map_err(|_| Error::from(StorageError::WriterUnavailable))?
    }
}

/// Starts the writer thread. It owns one pooled connection until every
/// handle is dropped.
pub fn spawn_writer(pool: Arc<DbPool>) -> Result<WriteHandle> {
    let mut conn = pool.get().map_err(StorageError::from)?;
    let (tx, mut rx) = mpsc::unbounded_channel::<Job>();

    std::thread::Builder::new()
        .name("sqlite-writer".to_string())
        .spawn(move || {
            while let Some(job) = rx.blocking_recv() {
                job(&mut *conn);
            }
            log::debug!("[Storage] Writer stopped");
        })
        .map_err(|e| StorageError::Pool(format!("Cannot start writer thread: {}", e)))?;

    Ok(WriteHandle { tx })
}
