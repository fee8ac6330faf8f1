//! Application state wiring.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use pocketwise_ai::ClassifierClient;
use pocketwise_core::accounts::AccountRepositoryTrait;
use pocketwise_core::sync::{SyncService, SyncServiceTrait};
use pocketwise_core::transactions::TransactionRepositoryTrait;
use pocketwise_ledger::LedgerClient;
use pocketwise_storage_sqlite::{
    create_pool, init, run_migrations, spawn_writer, AccountRepository, TransactionRepository,
};

use crate::config::Config;

pub struct AppState {
    pub account_repository: Arc<dyn AccountRepositoryTrait>,
    pub transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    pub sync_service: Arc<dyn SyncServiceTrait>,
}

pub fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = init(&config.database.path).context("preparing database directory")?;
    run_migrations(&db_path).context("running database migrations")?;
    let pool = create_pool(&db_path).context("opening database pool")?;
    let writer = spawn_writer(pool.as_ref().clone());
    info!("Database ready at {}", db_path);

    let account_repository = Arc::new(AccountRepository::new(pool.clone(), writer.clone()));
    let transaction_repository = Arc::new(TransactionRepository::new(pool, writer));

    let ledger_client =
        Arc::new(LedgerClient::new(config.ledger.clone()).context("building aggregator client")?);
    let classifier = Arc::new(
        ClassifierClient::new(config.classifier.clone()).context("building classifier client")?,
    );

    let sync_service = Arc::new(SyncService::new(
        account_repository.clone(),
        transaction_repository.clone(),
        ledger_client,
        classifier,
    ));

    Ok(Arc::new(AppState {
        account_repository,
        transaction_repository,
        sync_service,
    }))
}
