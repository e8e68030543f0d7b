//! User records and device-token lookups.
//!
//! The dispatcher only ever needs the registered push destination token for a
//! recipient; the rest is plain keyed CRUD for the application surface.

use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UserRecord {
    pub user_id: String,
    pub name: String,
    /// Push destination token registered by the user's device. Absent until
    /// the device registers one.
    pub device_token: Option<String>,
    pub created_at: time::PrimitiveDateTime,
}

#[derive(Debug, Clone)]
/// Insert a new user with a server-minted id.
pub struct InsertUserRecord {
    pub name: String,
    pub device_token: Option<String>,
}

impl Processor<InsertUserRecord> for DatabaseProcessor {
    type Output = UserRecord;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertUserRecord")]
    async fn process(&self, insert: InsertUserRecord) -> Result<UserRecord, sqlx::Error> {
        sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (user_id, name, device_token) \
             VALUES ($1, $2, $3) \
             RETURNING user_id, name, device_token, created_at",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&insert.name)
        .bind(&insert.device_token)
        .fetch_one(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
pub struct GetUserRecordById {
    pub user_id: String,
}

impl Processor<GetUserRecordById> for DatabaseProcessor {
    type Output = Option<UserRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetUserRecordById")]
    async fn process(&self, query: GetUserRecordById) -> Result<Option<UserRecord>, sqlx::Error> {
        sqlx::query_as::<_, UserRecord>(
            "SELECT user_id, name, device_token, created_at FROM users WHERE user_id = $1",
        )
        .bind(&query.user_id)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// Reverse association: find the user who registered a destination token.
pub struct GetUserRecordByDeviceToken {
    pub device_token: String,
}

impl Processor<GetUserRecordByDeviceToken> for DatabaseProcessor {
    type Output = Option<UserRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetUserRecordByDeviceToken")]
    async fn process(
        &self,
        query: GetUserRecordByDeviceToken,
    ) -> Result<Option<UserRecord>, sqlx::Error> {
        sqlx::query_as::<_, UserRecord>(
            "SELECT user_id, name, device_token, created_at FROM users WHERE device_token = $1",
        )
        .bind(&query.device_token)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// The registered destination token for a user.
///
/// Outer `None` means the user does not exist; inner `None` means the user
/// exists but has not registered a device.
pub struct GetUserDeviceToken {
    pub user_id: String,
}

impl Processor<GetUserDeviceToken> for DatabaseProcessor {
    type Output = Option<Option<String>>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetUserDeviceToken")]
    async fn process(
        &self,
        query: GetUserDeviceToken,
    ) -> Result<Option<Option<String>>, sqlx::Error> {
        sqlx::query_scalar::<_, Option<String>>(
            "SELECT device_token FROM users WHERE user_id = $1",
        )
        .bind(&query.user_id)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// Replace a user's destination token. `None` unregisters the device.
///
/// Returns the number of rows updated; zero means the user does not exist.
pub struct UpdateUserDeviceToken {
    pub user_id: String,
    pub device_token: Option<String>,
}

impl Processor<UpdateUserDeviceToken> for DatabaseProcessor {
    type Output = u64;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:UpdateUserDeviceToken")]
    async fn process(&self, update: UpdateUserDeviceToken) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET device_token = $1 WHERE user_id = $2")
            .bind(&update.device_token)
            .bind(&update.user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
