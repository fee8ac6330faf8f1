use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use log::debug;

use pocketwise_core::accounts::{Account, AccountBalanceUpdate, AccountRepositoryTrait};
use pocketwise_core::Result;

use super::model::{AccountBalanceDB, AccountDB, AccountRefreshDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::accounts;

pub struct AccountRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl AccountRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        AccountRepository { pool, writer }
    }
}

#[async_trait]
impl AccountRepositoryTrait for AccountRepository {
    fn get_account(&self, account_id: &str) -> Result<Option<Account>> {
        let mut conn = get_connection(&self.pool)?;
        let row = accounts::table
            .find(account_id)
            .select(AccountDB::as_select())
            .first::<AccountDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(Account::try_from).transpose()?)
    }

    fn list_accounts(&self, user_id: &str) -> Result<Vec<Account>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = accounts::table
            .filter(accounts::user_id.eq(user_id))
            .order(accounts::name.asc())
            .select(AccountDB::as_select())
            .load::<AccountDB>(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter()
            .map(|row| Account::try_from(row).map_err(Into::into))
            .collect()
    }

    async fn upsert_account(&self, account: Account) -> Result<Account> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Account> {
                let account_db = AccountDB::from(account);
                let refresh = AccountRefreshDB::from(&account_db);
                diesel::insert_into(accounts::table)
                    .values(&account_db)
                    .on_conflict(accounts::id)
                    .do_update()
                    .set(&refresh)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                let stored = accounts::table
                    .find(&account_db.id)
                    .select(AccountDB::as_select())
                    .first::<AccountDB>(conn)
                    .map_err(StorageError::from)?;
                Ok(Account::try_from(stored)?)
            })
            .await
    }

    async fn update_account_balance(&self, update: AccountBalanceUpdate) -> Result<bool> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<bool> {
                let changes = AccountBalanceDB::from(&update);
                let affected = diesel::update(accounts::table.find(&update.account_id))
                    .set(&changes)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                debug!(
                    "Balance update for account {} touched {} row(s)",
                    update.account_id, affected
                );
                Ok(affected > 0)
            })
            .await
    }
}
