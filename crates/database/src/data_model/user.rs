use async_trait::async_trait;
use flightlog::database::{Result, UserRepo};
use sqlx::prelude::FromRow;
use model::{
    user::{Credentials, User},
    WithId,
};
use utility::id::Id;

use super::DatabaseRow;
use crate::{
    queries::user::{delete, get, get_page, insert, insert_credentials, update, update_credentials},
    PgDatabaseAutocommit, PgDatabaseTransaction,
};

/// Table: users
///
/// Credentials live in their own table and are never read back.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl DatabaseRow for UserRow {
    type Model = User;

    fn get_id(&self) -> Id<Self::Model> {
        Id::new(self.id)
    }

    fn to_model(self) -> Self::Model {
        User {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
        }
    }
}

#[async_trait]
impl UserRepo for PgDatabaseAutocommit {
    async fn insert_user(&mut self, user: User) -> Result<WithId<User>> {
        insert(&self.pool, user).await
    }

    async fn insert_credentials(
        &mut self,
        user_id: &Id<User>,
        credentials: Credentials,
    ) -> Result<()> {
        insert_credentials(&self.pool, user_id, credentials).await
    }

    async fn get_user(&mut self, id: &Id<User>) -> Result<WithId<User>> {
        get(&self.pool, id).await
    }

    async fn get_users(&mut self, limit: i64, offset: i64) -> Result<Vec<WithId<User>>> {
        get_page(&self.pool, limit, offset).await
    }

    async fn update_user(&mut self, user: WithId<User>) -> Result<WithId<User>> {
        update(&self.pool, user).await
    }

    async fn update_credentials(
        &mut self,
        user_id: &Id<User>,
        credentials: Credentials,
    ) -> Result<()> {
        update_credentials(&self.pool, user_id, credentials).await
    }

    async fn delete_user(&mut self, id: &Id<User>) -> Result<()> {
        delete(&self.pool, id).await
    }
}

#[async_trait]
impl<'a> UserRepo for PgDatabaseTransaction<'a> {
    async fn insert_user(&mut self, user: User) -> Result<WithId<User>> {
        insert(&mut *self.tx, user).await
    }

    async fn insert_credentials(
        &mut self,
        user_id: &Id<User>,
        credentials: Credentials,
    ) -> Result<()> {
        insert_credentials(&mut *self.tx, user_id, credentials).await
    }

    async fn get_user(&mut self, id: &Id<User>) -> Result<WithId<User>> {
        get(&mut *self.tx, id).await
    }

    async fn get_users(&mut self, limit: i64, offset: i64) -> Result<Vec<WithId<User>>> {
        get_page(&mut *self.tx, limit, offset).await
    }

    async fn update_user(&mut self, user: WithId<User>) -> Result<WithId<User>> {
        update(&mut *self.tx, user).await
    }

    async fn update_credentials(
        &mut self,
        user_id: &Id<User>,
        credentials: Credentials,
    ) -> Result<()> {
        update_credentials(&mut *self.tx, user_id, credentials).await
    }

    async fn delete_user(&mut self, id: &Id<User>) -> Result<()> {
        delete(&mut *self.tx, id).await
    }
}
