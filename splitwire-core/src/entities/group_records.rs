//! Group records and membership.
//!
//! Membership drives recipient derivation for group-join notifications and
//! the per-user group listing.

use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct GroupRecord {
    pub group_id: String,
    pub name: String,
    pub created_at: time::PrimitiveDateTime,
}

#[derive(Debug, Clone)]
/// Insert a new group with a server-minted id.
pub struct InsertGroupRecord {
    pub name: String,
}

impl Processor<InsertGroupRecord> for DatabaseProcessor {
    type Output = GroupRecord;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertGroupRecord")]
    async fn process(&self, insert: InsertGroupRecord) -> Result<GroupRecord, sqlx::Error> {
        sqlx::query_as::<_, GroupRecord>(
            "INSERT INTO groups (group_id, name) \
             VALUES ($1, $2) \
             RETURNING group_id, name, created_at",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&insert.name)
        .fetch_one(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
pub struct GetGroupRecordById {
    pub group_id: String,
}

impl Processor<GetGroupRecordById> for DatabaseProcessor {
    type Output = Option<GroupRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetGroupRecordById")]
    async fn process(&self, query: GetGroupRecordById) -> Result<Option<GroupRecord>, sqlx::Error> {
        sqlx::query_as::<_, GroupRecord>(
            "SELECT group_id, name, created_at FROM groups WHERE group_id = $1",
        )
        .bind(&query.group_id)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// Add a user to a group. Re-joining is a no-op.
pub struct AddGroupMember {
    pub group_id: String,
    pub user_id: String,
}

impl Processor<AddGroupMember> for DatabaseProcessor {
    type Output = ();
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:AddGroupMember")]
    async fn process(&self, insert: AddGroupMember) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO group_members (group_id, user_id) \
             VALUES ($1, $2) \
             ON CONFLICT (group_id, user_id) DO NOTHING",
        )
        .bind(&insert.group_id)
        .bind(&insert.user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
/// Ids of all members of a group, in join order.
pub struct ListGroupMemberIds {
    pub group_id: String,
}

impl Processor<ListGroupMemberIds> for DatabaseProcessor {
    type Output = Vec<String>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListGroupMemberIds")]
    async fn process(&self, query: ListGroupMemberIds) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT user_id FROM group_members WHERE group_id = $1 ORDER BY joined_at ASC",
        )
        .bind(&query.group_id)
        .fetch_all(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// All groups a user belongs to, newest first.
pub struct ListGroupsByUser {
    pub user_id: String,
}

impl Processor<ListGroupsByUser> for DatabaseProcessor {
    type Output = Vec<GroupRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListGroupsByUser")]
    async fn process(&self, query: ListGroupsByUser) -> Result<Vec<GroupRecord>, sqlx::Error> {
        sqlx::query_as::<_, GroupRecord>(
            "SELECT g.group_id, g.name, g.created_at \
             FROM groups g \
             JOIN group_members m ON m.group_id = g.group_id \
             WHERE m.user_id = $1 \
             ORDER BY g.created_at DESC",
        )
        .bind(&query.user_id)
        .fetch_all(&self.pool)
        .await
    }
}
