use chrono::{DateTime, Local};
use flightlog::database::{DatabaseError, Result};
use model::{
    location::{CountryPart, Location},
    WithId,
};
use sqlx::{Executor, Postgres};
use utility::{
    id::{Id, IdWrapper},
    let_also::LetAlso,
};

use crate::data_model::{location::LocationRow, with_id, with_ids};

use super::{convert_error, like_prefix_pattern};

/// Selects locations joined with their coordinates and country part. Soft
/// deleted rows are excluded.
fn select_locations(condition: &str) -> String {
    format!(
        "
        SELECT
            l.id, l.name, l.coordinates_id, l.country_part_id,
            c.longitude, c.latitude,
            p.area_name, p.postal_code, p.country_part
        FROM
            locations l
            JOIN coordinates c ON c.id = l.coordinates_id
            LEFT JOIN country_parts p ON p.id = l.country_part_id
        WHERE
            l.deleted_at IS NULL AND {}
        ",
        condition
    )
}

pub async fn insert<'c, E>(executor: E, location: Location) -> Result<WithId<Location>>
where
    E: Executor<'c, Database = Postgres>,
{
    let coordinates_id = location
        .coordinates_id
        .raw()
        .ok_or(DatabaseError::IdMissing)?;
    sqlx::query_scalar(
        "
        INSERT INTO locations(
            name,
            coordinates_id,
            country_part_id
        )
        VALUES ($1, $2, $3)
        RETURNING id;
        ",
    )
    .bind(location.name.clone())
    .bind(coordinates_id)
    .bind(location.country_part_id.raw())
    .fetch_one(executor)
    .await
    .map(|id: i64| WithId::new(Id::new(id), location))
    .map_err(convert_error)
}

pub async fn get<'c, E>(executor: E, id: &Id<Location>) -> Result<WithId<Location>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(&select_locations("l.id = $1;"))
        .bind(id.raw())
        .fetch_one(executor)
        .await
        .map(|row: LocationRow| with_id(row))
        .map_err(convert_error)
}

pub async fn set_country_part<'c, E>(
    executor: E,
    id: &Id<Location>,
    country_part_id: Option<Id<CountryPart>>,
) -> Result<()>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_scalar(
        "
        UPDATE locations
        SET country_part_id = $1
        WHERE id = $2 AND deleted_at IS NULL
        RETURNING id;
        ",
    )
    .bind(country_part_id.raw())
    .bind(id.raw())
    .fetch_one(executor)
    .await
    .map(|_: i64| ())
    .map_err(convert_error)
}

pub async fn soft_delete<'c, E>(executor: E, id: &Id<Location>) -> Result<()>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_scalar(
        "
        UPDATE locations
        SET deleted_at = now()
        WHERE id = $1 AND deleted_at IS NULL
        RETURNING id;
        ",
    )
    .bind(id.raw())
    .fetch_one(executor)
    .await
    .map(|_: i64| ())
    .map_err(convert_error)
}

pub async fn deleted_at<'c, E>(
    executor: E,
    id: &Id<Location>,
) -> Result<Option<DateTime<Local>>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_scalar(
        "
        SELECT
            deleted_at
        FROM
            locations
        WHERE id = $1;
        ",
    )
    .bind(id.raw())
    .fetch_one(executor)
    .await
    .map_err(convert_error)
}

pub async fn get_by_name_prefix<'c, E>(
    executor: E,
    prefix: &str,
) -> Result<Vec<WithId<Location>>>
where
    E: Executor<'c, Database = Postgres>,
{
    let pattern = like_prefix_pattern(&prefix.to_lowercase());
    sqlx::query_as(&select_locations(
        "lower(l.name) LIKE $1 ESCAPE '\\' ORDER BY l.name, l.id;",
    ))
    .bind(pattern)
    .fetch_all(executor)
    .await
    .map_err(convert_error)?
    .let_owned(|locations: Vec<LocationRow>| Ok(with_ids(locations)))
}
