use flightlog::database::Result;
use model::{location::Coordinates, WithId};
use sqlx::{Executor, Postgres};

use crate::data_model::{coordinates::CoordinatesRow, with_id};

use super::convert_error;

pub async fn insert<'c, E>(
    executor: E,
    coordinates: Coordinates,
) -> Result<WithId<Coordinates>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        INSERT INTO coordinates(
            longitude,
            latitude
        )
        VALUES ($1, $2)
        RETURNING id, longitude, latitude;
        ",
    )
    .bind(coordinates.longitude)
    .bind(coordinates.latitude)
    .fetch_one(executor)
    .await
    .map(|row: CoordinatesRow| with_id(row))
    .map_err(convert_error)
}
