use std::{future::Future, time::Duration};

use model::{
    location::{CountryPart, Location},
    user::{Credentials, User},
    WithId,
};
use utility::id::Id;

use crate::{
    database::{
        CoordinatesRepo, CountryPartRepo, Database, DatabaseOperations,
        DatabaseTransaction, LocationRepo, UserRepo,
    },
    Context, RequestError, RequestResult,
};

/// Entry point for callers of the data layer.
///
/// Writes spanning more than one row run in a single transaction. If a step
/// fails, the transaction is dropped and thereby rolled back.
#[derive(Debug, Clone)]
pub struct Client<D>
where
    D: Database,
{
    id: String,
    database: D,
    timeout: Option<Duration>,
}

impl<D> Client<D>
where
    D: Database,
{
    pub fn new<S>(id: S, database: D) -> Self
    where
        S: Into<String>,
    {
        Self {
            id: id.into(),
            database,
            timeout: None,
        }
    }

    /// Bounds every operation of this client. An operation running longer
    /// fails with [`RequestError::Timeout`]; a pending transaction is rolled
    /// back.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    async fn bounded<T, F>(&self, operation: &'static str, request: F) -> RequestResult<T>
    where
        F: Future<Output = RequestResult<T>>,
    {
        let Some(timeout) = self.timeout else {
            return request.await;
        };
        match tokio::time::timeout(timeout, request).await {
            Ok(result) => result,
            Err(_) => {
                log::warn!("[{}] {} timed out after {:?}", self.id, operation, timeout);
                Err(RequestError::Timeout { operation, timeout })
            }
        }
    }

    async fn transaction(&self) -> RequestResult<D::Transaction> {
        self.database
            .transaction()
            .await
            .context("could not begin transaction")
    }
}

// locations

/// Returns the id of the stored country part equal to `part`, storing it first
/// if needed. The empty country part resolves to `None` without touching the
/// database.
pub async fn resolve_country_part<O>(
    operations: &mut O,
    part: &CountryPart,
) -> RequestResult<Option<Id<CountryPart>>>
where
    O: DatabaseOperations + Send,
{
    if part.is_empty() {
        return Ok(None);
    }

    if let Some(id) = operations
        .country_part_by_triple(part)
        .await
        .context("unable to look up country part")?
    {
        return Ok(Some(id));
    }

    let stored = operations
        .put_country_part(part)
        .await
        .context("unable to store country part")?;
    log::debug!("stored country part {} ({:?})", stored.id, part);
    Ok(Some(stored.id))
}

impl<D> Client<D>
where
    D: Database,
{
    /// Stores a new location. The coordinates are stored first, then the
    /// country part is resolved, then the location row referencing both is
    /// inserted.
    pub async fn create_location(
        &self,
        location: Location,
    ) -> RequestResult<WithId<Location>> {
        self.bounded("create location", async {
            let mut tx = self.transaction().await?;

            let coordinates = tx
                .insert_coordinates(location.coordinates)
                .await
                .context("unable to store coordinates")?;
            let country_part_id =
                resolve_country_part(&mut tx, &location.country_part).await?;
            // a blank country part is returned the way it reads back
            let country_part = match country_part_id {
                Some(_) => location.country_part,
                None => CountryPart::default(),
            };

            let created = tx
                .insert_location(Location {
                    coordinates_id: Some(coordinates.id),
                    country_part_id,
                    country_part,
                    ..location
                })
                .await
                .context("could not create the location")?;

            tx.commit().await.context("could not commit the location")?;
            log::info!("[{}] created location {}", self.id, created.id);
            Ok(created)
        })
        .await
    }

    pub async fn get_location(&self, id: Id<Location>) -> RequestResult<WithId<Location>> {
        self.bounded("get location", async {
            self.database
                .auto()
                .get_location(&id)
                .await
                .context("unable to get location")
        })
        .await
    }

    /// Reassigns the country part of a location.
    ///
    /// Coordinates are immutable after creation: the coordinates passed in
    /// `location` are ignored and the stored ones are kept. So is the name.
    pub async fn update_location(
        &self,
        id: Id<Location>,
        location: Location,
    ) -> RequestResult<WithId<Location>> {
        self.bounded("update location", async {
            let mut tx = self.transaction().await?;

            let existing = tx
                .get_location(&id)
                .await
                .context("unable to get location")?;
            if existing.content.coordinates != location.coordinates {
                log::debug!(
                    "[{}] ignoring coordinate change of location {}",
                    self.id,
                    id
                );
            }

            let country_part_id =
                resolve_country_part(&mut tx, &location.country_part).await?;
            tx.set_location_country_part(&id, country_part_id)
                .await
                .context("unable to update the location")?;
            let updated = tx
                .get_location(&id)
                .await
                .context("unable to get location")?;

            tx.commit().await.context("could not commit the location")?;
            Ok(updated)
        })
        .await
    }

    /// Soft deletes a location. The row stays in the database but is no longer
    /// returned by `get_location` or `location_search_by_name`.
    pub async fn delete_location(&self, id: Id<Location>) -> RequestResult<()> {
        self.bounded("delete location", async {
            let mut tx = self.transaction().await?;
            tx.get_location(&id)
                .await
                .context("cannot delete a location we cannot find")?;
            tx.soft_delete_location(&id)
                .await
                .context("unable to delete the location")?;
            tx.commit().await.context("could not commit the deletion")?;
            log::info!("[{}] deleted location {}", self.id, id);
            Ok(())
        })
        .await
    }

    /// Locations whose name starts with `name`, ignoring case.
    pub async fn location_search_by_name(
        &self,
        name: &str,
    ) -> RequestResult<Vec<WithId<Location>>> {
        self.bounded("search locations", async {
            self.database
                .auto()
                .locations_by_name_prefix(name)
                .await
                .context("unable to find locations")
        })
        .await
    }

    pub async fn resolve_country_part(
        &self,
        part: &CountryPart,
    ) -> RequestResult<Option<Id<CountryPart>>> {
        self.bounded("resolve country part", async {
            let mut tx = self.transaction().await?;
            let id = resolve_country_part(&mut tx, part).await?;
            tx.commit().await.context("could not commit the country part")?;
            Ok(id)
        })
        .await
    }

    pub async fn get_country_part(
        &self,
        id: Id<CountryPart>,
    ) -> RequestResult<WithId<CountryPart>> {
        self.bounded("get country part", async {
            self.database
                .auto()
                .get_country_part(&id)
                .await
                .context("unable to get country part")
        })
        .await
    }

    /// When the location was soft deleted, if it was. Also sees deleted rows.
    pub async fn location_deleted_at(
        &self,
        id: Id<Location>,
    ) -> RequestResult<Option<chrono::DateTime<chrono::Local>>> {
        self.bounded("inspect location", async {
            self.database
                .auto()
                .location_deleted_at(&id)
                .await
                .context("unable to get location")
        })
        .await
    }
}

// users

impl<D> Client<D>
where
    D: Database,
{
    /// Stores a user together with its credentials.
    pub async fn create_user(
        &self,
        user: User,
        credentials: Credentials,
    ) -> RequestResult<WithId<User>> {
        self.bounded("create user", async {
            let mut tx = self.transaction().await?;
            let created = tx.insert_user(user).await.context("unable to create the user")?;
            tx.insert_credentials(&created.id, credentials)
                .await
                .context("unable to store credentials")?;
            tx.commit().await.context("could not commit the user")?;
            log::info!("[{}] created user {}", self.id, created.id);
            Ok(created)
        })
        .await
    }

    /// One page of users. Pages start at 1; page 0 is treated as page 1.
    /// An offset beyond what the store can address yields an empty page.
    pub async fn get_users(&self, limit: u32, page: u32) -> RequestResult<Vec<WithId<User>>> {
        let Some(offset) = i64::from(page.max(1) - 1).checked_mul(i64::from(limit)) else {
            log::debug!("[{}] user page {} of size {} is out of range", self.id, page, limit);
            return Ok(Vec::new());
        };
        self.bounded("get users", async {
            self.database
                .auto()
                .get_users(i64::from(limit), offset)
                .await
                .context("unable to get users")
        })
        .await
    }

    pub async fn get_user(&self, id: Id<User>) -> RequestResult<WithId<User>> {
        self.bounded("get user", async {
            self.database
                .auto()
                .get_user(&id)
                .await
                .context("unable to get user")
        })
        .await
    }

    /// Updates the user. Credentials are only replaced when given.
    pub async fn update_user(
        &self,
        id: Id<User>,
        user: User,
        credentials: Option<Credentials>,
    ) -> RequestResult<WithId<User>> {
        self.bounded("update user", async {
            let mut tx = self.transaction().await?;
            let updated = tx
                .update_user(WithId::new(id, user))
                .await
                .context("unable to update the user")?;
            if let Some(credentials) = credentials {
                tx.update_credentials(&updated.id, credentials)
                    .await
                    .context("unable to update password details")?;
            }
            tx.commit().await.context("could not commit the user")?;
            Ok(updated)
        })
        .await
    }

    /// Removes the user and all its credentials permanently.
    pub async fn delete_user(&self, id: Id<User>) -> RequestResult<()> {
        self.bounded("delete user", async {
            let mut tx = self.transaction().await?;
            tx.delete_user(&id).await.context("unable to delete the user")?;
            tx.commit().await.context("could not commit the deletion")?;
            log::info!("[{}] deleted user {}", self.id, id);
            Ok(())
        })
        .await
    }
}
