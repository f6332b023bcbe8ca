use std::{error, result};

use async_trait::async_trait;
use chrono::{DateTime, Local};
use model::{
    location::{Coordinates, CountryPart, Location},
    user::{Credentials, User},
    WithId,
};
use thiserror::Error;
use utility::id::Id;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("no matching row")]
    NotFound,
    #[error("a referenced id is missing")]
    IdMissing,
    #[error(transparent)]
    Other(Box<dyn error::Error + Send + Sync>),
}

impl DatabaseError {
    pub fn other<E: error::Error + Send + Sync + 'static>(why: E) -> Self {
        Self::Other(Box::new(why))
    }
}

pub type Result<T> = result::Result<T, DatabaseError>;

#[async_trait]
pub trait CoordinatesRepo {
    async fn insert_coordinates(
        &mut self,
        coordinates: Coordinates,
    ) -> Result<WithId<Coordinates>>;
}

#[async_trait]
pub trait CountryPartRepo {
    /// Looks up the row with exactly this (area name, postal code, country part)
    /// triple.
    async fn country_part_by_triple(
        &mut self,
        part: &CountryPart,
    ) -> Result<Option<Id<CountryPart>>>;

    /// Inserts the country part. If a row with the same triple already exists,
    /// nothing is inserted and the existing row is returned instead.
    ///
    /// Implementations must make this atomic with respect to concurrent callers,
    /// e.g. through a unique constraint on the triple.
    async fn put_country_part(
        &mut self,
        part: &CountryPart,
    ) -> Result<WithId<CountryPart>>;

    async fn get_country_part(
        &mut self,
        id: &Id<CountryPart>,
    ) -> Result<WithId<CountryPart>>;
}

/// Locations are soft deleted. Every method except `location_deleted_at`
/// treats a deleted location as not existing.
#[async_trait]
pub trait LocationRepo {
    /// Inserts the location row. `location.coordinates_id` has to be set and
    /// reference existing coordinates, otherwise `IdMissing` is returned.
    async fn insert_location(&mut self, location: Location) -> Result<WithId<Location>>;

    /// Returns the location with its coordinates and country part resolved.
    async fn get_location(&mut self, id: &Id<Location>) -> Result<WithId<Location>>;

    async fn set_location_country_part(
        &mut self,
        id: &Id<Location>,
        country_part_id: Option<Id<CountryPart>>,
    ) -> Result<()>;

    async fn soft_delete_location(&mut self, id: &Id<Location>) -> Result<()>;

    /// Reads the soft delete marker, including deleted rows.
    async fn location_deleted_at(
        &mut self,
        id: &Id<Location>,
    ) -> Result<Option<DateTime<Local>>>;

    /// All locations whose name starts with `prefix`, compared
    /// case-insensitively. `%` and `_` in `prefix` match literally.
    async fn locations_by_name_prefix(
        &mut self,
        prefix: &str,
    ) -> Result<Vec<WithId<Location>>>;
}

#[async_trait]
pub trait UserRepo {
    async fn insert_user(&mut self, user: User) -> Result<WithId<User>>;

    async fn insert_credentials(
        &mut self,
        user_id: &Id<User>,
        credentials: Credentials,
    ) -> Result<()>;

    async fn get_user(&mut self, id: &Id<User>) -> Result<WithId<User>>;

    /// Users ordered by id.
    async fn get_users(&mut self, limit: i64, offset: i64) -> Result<Vec<WithId<User>>>;

    async fn update_user(&mut self, user: WithId<User>) -> Result<WithId<User>>;

    /// Replaces hash and salt. `NotFound` if the user has no credentials.
    async fn update_credentials(
        &mut self,
        user_id: &Id<User>,
        credentials: Credentials,
    ) -> Result<()>;

    /// Hard deletes the user together with its credentials.
    async fn delete_user(&mut self, id: &Id<User>) -> Result<()>;
}

pub trait DatabaseOperations:
    CoordinatesRepo + CountryPartRepo + LocationRepo + UserRepo + Send
{
}

/// A transaction is rolled back when dropped without calling `commit`.
#[async_trait]
pub trait DatabaseTransaction: DatabaseOperations {
    async fn commit(self) -> Result<()>;
}

pub trait DatabaseAutocommit: DatabaseOperations {}

/// trait to implement a flight log database.
/// multiple concurrent accesses should be possible by e.g. cloning the database object.
#[async_trait]
pub trait Database: Clone + Send + Sync + Sized {
    type Transaction: DatabaseTransaction + Send;
    type Autocommit: DatabaseAutocommit + Send;

    async fn transaction(&self) -> Result<Self::Transaction>;

    fn auto(&self) -> Self::Autocommit;
}
