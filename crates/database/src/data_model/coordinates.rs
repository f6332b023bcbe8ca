use async_trait::async_trait;
use flightlog::database::{CoordinatesRepo, Result};
use sqlx::prelude::FromRow;
use model::{location::Coordinates, WithId};
use utility::id::Id;

use super::DatabaseRow;
use crate::{
    queries::coordinates::insert,
    PgDatabaseAutocommit, PgDatabaseTransaction,
};

/// Table: coordinates
#[derive(Debug, Clone, FromRow)]
pub struct CoordinatesRow {
    pub id: i64,
    pub longitude: f64,
    pub latitude: f64,
}

impl DatabaseRow for CoordinatesRow {
    type Model = Coordinates;

    fn get_id(&self) -> Id<Self::Model> {
        Id::new(self.id)
    }

    fn to_model(self) -> Self::Model {
        Coordinates {
            longitude: self.longitude,
            latitude: self.latitude,
        }
    }
}

#[async_trait]
impl CoordinatesRepo for PgDatabaseAutocommit {
    async fn insert_coordinates(
        &mut self,
        coordinates: Coordinates,
    ) -> Result<WithId<Coordinates>> {
        insert(&self.pool, coordinates).await
    }
}

#[async_trait]
impl<'a> CoordinatesRepo for PgDatabaseTransaction<'a> {
    async fn insert_coordinates(
        &mut self,
        coordinates: Coordinates,
    ) -> Result<WithId<Coordinates>> {
        insert(&mut *self.tx, coordinates).await
    }
}
