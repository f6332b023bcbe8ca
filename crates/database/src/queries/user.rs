use flightlog::database::{DatabaseError, Result};
use model::{
    user::{Credentials, User},
    WithId,
};
use sqlx::{Executor, Postgres};
use utility::{id::Id, let_also::LetAlso};

use crate::data_model::{user::UserRow, with_id, with_ids};

use super::convert_error;

pub async fn insert<'c, E>(executor: E, user: User) -> Result<WithId<User>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        INSERT INTO users(
            first_name,
            last_name,
            email
        )
        VALUES ($1, $2, $3)
        RETURNING id, first_name, last_name, email;
        ",
    )
    .bind(user.first_name)
    .bind(user.last_name)
    .bind(user.email)
    .fetch_one(executor)
    .await
    .map(|row: UserRow| with_id(row))
    .map_err(convert_error)
}

pub async fn insert_credentials<'c, E>(
    executor: E,
    user_id: &Id<User>,
    credentials: Credentials,
) -> Result<()>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query(
        "
        INSERT INTO credentials(
            user_id,
            password_hash,
            password_salt
        )
        VALUES ($1, $2, $3);
        ",
    )
    .bind(user_id.raw())
    .bind(credentials.password_hash)
    .bind(credentials.password_salt)
    .execute(executor)
    .await
    .map(|_| ())
    .map_err(convert_error)
}

pub async fn get<'c, E>(executor: E, id: &Id<User>) -> Result<WithId<User>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        SELECT
            id, first_name, last_name, email
        FROM
            users
        WHERE id = $1;
        ",
    )
    .bind(id.raw())
    .fetch_one(executor)
    .await
    .map(|row: UserRow| with_id(row))
    .map_err(convert_error)
}

pub async fn get_page<'c, E>(
    executor: E,
    limit: i64,
    offset: i64,
) -> Result<Vec<WithId<User>>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        SELECT
            id, first_name, last_name, email
        FROM
            users
        ORDER BY id ASC
        LIMIT $1 OFFSET $2;
        ",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(executor)
    .await
    .map_err(convert_error)?
    .let_owned(|users: Vec<UserRow>| Ok(with_ids(users)))
}

pub async fn update<'c, E>(executor: E, user: WithId<User>) -> Result<WithId<User>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        UPDATE users
        SET first_name = $1,
            last_name = $2,
            email = $3
        WHERE id = $4
        RETURNING id, first_name, last_name, email;
        ",
    )
    .bind(user.content.first_name)
    .bind(user.content.last_name)
    .bind(user.content.email)
    .bind(user.id.raw())
    .fetch_one(executor)
    .await
    .map(|row: UserRow| with_id(row))
    .map_err(convert_error)
}

pub async fn update_credentials<'c, E>(
    executor: E,
    user_id: &Id<User>,
    credentials: Credentials,
) -> Result<()>
where
    E: Executor<'c, Database = Postgres>,
{
    let result = sqlx::query(
        "
        UPDATE credentials
        SET password_hash = $1,
            password_salt = $2
        WHERE user_id = $3;
        ",
    )
    .bind(credentials.password_hash)
    .bind(credentials.password_salt)
    .bind(user_id.raw())
    .execute(executor)
    .await
    .map_err(convert_error)?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound);
    }
    Ok(())
}

/// Credentials are removed by the cascading foreign key.
pub async fn delete<'c, E>(executor: E, id: &Id<User>) -> Result<()>
where
    E: Executor<'c, Database = Postgres>,
{
    let result = sqlx::query("DELETE FROM users WHERE id = $1;")
        .bind(id.raw())
        .execute(executor)
        .await
        .map_err(convert_error)?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound);
    }
    Ok(())
}
