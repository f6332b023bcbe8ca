use async_trait::async_trait;
use flightlog::database::{CountryPartRepo, Result};
use sqlx::prelude::FromRow;
use model::{location::CountryPart, WithId};
use utility::id::Id;

use super::DatabaseRow;
use crate::{
    queries::country_part::{get, id_by_triple, put},
    PgDatabaseAutocommit, PgDatabaseTransaction,
};

/// Table: `country_parts`
#[derive(Debug, Clone, FromRow)]
pub struct CountryPartRow {
    pub id: i64,
    pub area_name: String,
    pub postal_code: String,
    pub country_part: String,
}

impl DatabaseRow for CountryPartRow {
    type Model = CountryPart;

    fn get_id(&self) -> Id<Self::Model> {
        Id::new(self.id)
    }

    fn to_model(self) -> Self::Model {
        CountryPart {
            area_name: self.area_name,
            postal_code: self.postal_code,
            country_part: self.country_part,
        }
    }
}

#[async_trait]
impl CountryPartRepo for PgDatabaseAutocommit {
    async fn country_part_by_triple(
        &mut self,
        part: &CountryPart,
    ) -> Result<Option<Id<CountryPart>>> {
        id_by_triple(&self.pool, part).await
    }

    async fn put_country_part(
        &mut self,
        part: &CountryPart,
    ) -> Result<WithId<CountryPart>> {
        put(&self.pool, part).await
    }

    async fn get_country_part(
        &mut self,
        id: &Id<CountryPart>,
    ) -> Result<WithId<CountryPart>> {
        get(&self.pool, id).await
    }
}

#[async_trait]
impl<'a> CountryPartRepo for PgDatabaseTransaction<'a> {
    async fn country_part_by_triple(
        &mut self,
        part: &CountryPart,
    ) -> Result<Option<Id<CountryPart>>> {
        id_by_triple(&mut *self.tx, part).await
    }

    async fn put_country_part(
        &mut self,
        part: &CountryPart,
    ) -> Result<WithId<CountryPart>> {
        put(&mut *self.tx, part).await
    }

    async fn get_country_part(
        &mut self,
        id: &Id<CountryPart>,
    ) -> Result<WithId<CountryPart>> {
        get(&mut *self.tx, id).await
    }
}
