//! User repository implementation, including the linked-wallet columns.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};
use tracing::info;

use chainnote_core::{
    validate_address, CreateUserRequest, Error, LinkWalletRequest, LinkedWallet, Result, User,
    UserRepository, WalletNetwork,
};

const USER_COLUMNS: &str = "user_id, username, email, password_hash,
    wallet_address, wallet_label, wallet_network, wallet_connected_at";

/// PostgreSQL implementation of UserRepository.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: Pool<Postgres>,
}

impl PgUserRepository {
    /// Create a new PgUserRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn map_row(row: &sqlx::postgres::PgRow) -> Result<User> {
        let address: Option<String> = row.get("wallet_address");
        let wallet = match address {
            Some(address) => {
                let network: Option<String> = row.get("wallet_network");
                let network: WalletNetwork = network
                    .as_deref()
                    .unwrap_or(WalletNetwork::Mainnet.as_str())
                    .parse()?;
                let connected_at: Option<DateTime<Utc>> = row.get("wallet_connected_at");
                Some(LinkedWallet {
                    address,
                    label: row.get("wallet_label"),
                    network,
                    connected_at: connected_at.unwrap_or_else(Utc::now),
                })
            }
            None => None,
        };

        Ok(User {
            id: row.get("user_id"),
            username: row.get("username"),
            email: row.get("email"),
            password_hash: row.get("password_hash"),
            wallet,
        })
    }

    async fn fetch_optional(&self, sql: &str, bind: i64) -> Result<Option<User>> {
        let row = sqlx::query(sql)
            .bind(bind)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        row.as_ref().map(Self::map_row).transpose()
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, req: CreateUserRequest) -> Result<User> {
        let email = req.email.trim().to_lowercase();
        let sql = format!(
            "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3)
             RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(req.username.trim())
            .bind(&email)
            .bind(&req.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::conflict_on_unique(e, format!("Email {} already registered", email)))?;

        let user = Self::map_row(&row)?;
        info!(
            subsystem = "db",
            component = "users",
            op = "create",
            user_id = user.id,
            "Registered user"
        );
        Ok(user)
    }

    async fn get(&self, id: i64) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE user_id = $1", USER_COLUMNS);
        self.fetch_optional(&sql, id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        row.as_ref().map(Self::map_row).transpose()
    }

    async fn link_wallet(&self, id: i64, req: LinkWalletRequest) -> Result<Option<User>> {
        let address = req.address.trim();
        validate_address(req.network, address)?;

        let sql = format!(
            "UPDATE users SET wallet_address = $2, wallet_label = $3,
                              wallet_network = $4, wallet_connected_at = now()
             WHERE user_id = $1
             RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(address)
            .bind(&req.label)
            .bind(req.network.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "users",
            op = "link_wallet",
            user_id = id,
            network = %req.network,
            found = row.is_some(),
            "Linked wallet"
        );
        row.as_ref().map(Self::map_row).transpose()
    }

    async fn unlink_wallet(&self, id: i64) -> Result<Option<User>> {
        let sql = format!(
            "UPDATE users SET wallet_address = NULL, wallet_label = NULL,
                              wallet_network = NULL, wallet_connected_at = NULL
             WHERE user_id = $1
             RETURNING {}",
            USER_COLUMNS
        );
        self.fetch_optional(&sql, id).await
    }
}
