use async_trait::async_trait;
use chrono::{DateTime, Local};
use flightlog::database::{LocationRepo, Result};
use sqlx::prelude::FromRow;
use model::{
    location::{Coordinates, CountryPart, Location},
    WithId,
};
use utility::id::Id;

use super::DatabaseRow;
use crate::{
    queries::location::{
        deleted_at, get, get_by_name_prefix, insert, set_country_part, soft_delete,
    },
    PgDatabaseAutocommit, PgDatabaseTransaction,
};

/// A row of `locations` joined with its coordinates and, if set, its
/// country part.
#[derive(Debug, Clone, FromRow)]
pub struct LocationRow {
    pub id: i64,
    pub name: String,
    pub coordinates_id: i64,
    pub country_part_id: Option<i64>,
    pub longitude: f64,
    pub latitude: f64,
    pub area_name: Option<String>,
    pub postal_code: Option<String>,
    pub country_part: Option<String>,
}

impl DatabaseRow for LocationRow {
    type Model = Location;

    fn get_id(&self) -> Id<Self::Model> {
        Id::new(self.id)
    }

    fn to_model(self) -> Self::Model {
        Location {
            name: self.name,
            coordinates: Coordinates::new(self.longitude, self.latitude),
            country_part: CountryPart {
                area_name: self.area_name.unwrap_or_default(),
                postal_code: self.postal_code.unwrap_or_default(),
                country_part: self.country_part.unwrap_or_default(),
            },
            coordinates_id: Some(Id::new(self.coordinates_id)),
            country_part_id: self.country_part_id.map(Id::new),
        }
    }
}

#[async_trait]
impl LocationRepo for PgDatabaseAutocommit {
    async fn insert_location(&mut self, location: Location) -> Result<WithId<Location>> {
        insert(&self.pool, location).await
    }

    async fn get_location(&mut self, id: &Id<Location>) -> Result<WithId<Location>> {
        get(&self.pool, id).await
    }

    async fn set_location_country_part(
        &mut self,
        id: &Id<Location>,
        country_part_id: Option<Id<CountryPart>>,
    ) -> Result<()> {
        set_country_part(&self.pool, id, country_part_id).await
    }

    async fn soft_delete_location(&mut self, id: &Id<Location>) -> Result<()> {
        soft_delete(&self.pool, id).await
    }

    async fn location_deleted_at(
        &mut self,
        id: &Id<Location>,
    ) -> Result<Option<DateTime<Local>>> {
        deleted_at(&self.pool, id).await
    }

    async fn locations_by_name_prefix(
        &mut self,
        prefix: &str,
    ) -> Result<Vec<WithId<Location>>> {
        get_by_name_prefix(&self.pool, prefix).await
    }
}

#[async_trait]
impl<'a> LocationRepo for PgDatabaseTransaction<'a> {
    async fn insert_location(&mut self, location: Location) -> Result<WithId<Location>> {
        insert(&mut *self.tx, location).await
    }

    async fn get_location(&mut self, id: &Id<Location>) -> Result<WithId<Location>> {
        get(&mut *self.tx, id).await
    }

    async fn set_location_country_part(
        &mut self,
        id: &Id<Location>,
        country_part_id: Option<Id<CountryPart>>,
    ) -> Result<()> {
        set_country_part(&mut *self.tx, id, country_part_id).await
    }

    async fn soft_delete_location(&mut self, id: &Id<Location>) -> Result<()> {
        soft_delete(&mut *self.tx, id).await
    }

    async fn location_deleted_at(
        &mut self,
        id: &Id<Location>,
    ) -> Result<Option<DateTime<Local>>> {
        deleted_at(&mut *self.tx, id).await
    }

    async fn locations_by_name_prefix(
        &mut self,
        prefix: &str,
    ) -> Result<Vec<WithId<Location>>> {
        get_by_name_prefix(&mut *self.tx, prefix).await
    }
}
