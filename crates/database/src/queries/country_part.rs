use flightlog::database::Result;
use model::{location::CountryPart, WithId};
use sqlx::{Executor, Postgres};
use utility::id::Id;

use crate::data_model::{country_part::CountryPartRow, with_id};

use super::convert_error;

pub async fn id_by_triple<'c, E>(
    executor: E,
    part: &CountryPart,
) -> Result<Option<Id<CountryPart>>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_scalar(
        "
        SELECT
            id
        FROM
            country_parts
        WHERE
            area_name = $1 AND postal_code = $2 AND country_part = $3;
        ",
    )
    .bind(&part.area_name)
    .bind(&part.postal_code)
    .bind(&part.country_part)
    .fetch_optional(executor)
    .await
    .map(|id: Option<i64>| id.map(Id::new))
    .map_err(convert_error)
}

/// Inserts the country part or fetches the row already holding the triple.
/// The no-op update makes `RETURNING` yield the existing row on conflict.
pub async fn put<'c, E>(executor: E, part: &CountryPart) -> Result<WithId<CountryPart>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        INSERT INTO country_parts(
            area_name,
            postal_code,
            country_part
        )
        VALUES ($1, $2, $3)
        ON CONFLICT (area_name, postal_code, country_part)
        DO UPDATE SET
            area_name = EXCLUDED.area_name
        RETURNING id, area_name, postal_code, country_part;
        ",
    )
    .bind(&part.area_name)
    .bind(&part.postal_code)
    .bind(&part.country_part)
    .fetch_one(executor)
    .await
    .map(|row: CountryPartRow| with_id(row))
    .map_err(convert_error)
}

pub async fn get<'c, E>(executor: E, id: &Id<CountryPart>) -> Result<WithId<CountryPart>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        SELECT
            id, area_name, postal_code, country_part
        FROM
            country_parts
        WHERE id = $1;
        ",
    )
    .bind(id.raw())
    .fetch_one(executor)
    .await
    .map(|row: CountryPartRow| with_id(row))
    .map_err(convert_error)
}
