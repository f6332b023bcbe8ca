//! In-memory implementation of the storage traits.
//!
//! Transactions work on a copy of the state which replaces the shared state on
//! commit. Only one transaction runs at a time, which makes every transaction
//! serializable. A database built with `without_isolation` instead applies
//! every call directly to the shared state, so concurrent transactions
//! interleave call by call and only the store's own conflict handling keeps
//! rows unique.

#![allow(dead_code)]

use std::{
    collections::BTreeMap,
    io,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, Local};
use flightlog::database::{
    CoordinatesRepo, CountryPartRepo, Database, DatabaseAutocommit, DatabaseError,
    DatabaseOperations, DatabaseTransaction, LocationRepo, Result, UserRepo,
};
use model::{
    location::{Coordinates, CountryPart, Location},
    user::{Credentials, User},
    WithId,
};
use tokio::sync::OwnedMutexGuard;
use utility::id::Id;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Clone)]
pub struct LocationRow {
    pub name: String,
    pub coordinates_id: i64,
    pub country_part_id: Option<i64>,
    pub deleted_at: Option<DateTime<Local>>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    last_id: i64,
    pub coordinates: BTreeMap<i64, Coordinates>,
    pub country_parts: BTreeMap<i64, CountryPart>,
    pub locations: BTreeMap<i64, LocationRow>,
    pub users: BTreeMap<i64, User>,
    /// keyed by user id
    pub credentials: BTreeMap<i64, Credentials>,
    pub fail_location_inserts: bool,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    pub fn country_parts_matching(&self, part: &CountryPart) -> usize {
        self.country_parts.values().filter(|p| *p == part).count()
    }

    fn live_location(&self, id: i64) -> Option<&LocationRow> {
        self.locations.get(&id).filter(|row| row.deleted_at.is_none())
    }

    fn assemble(&self, id: i64, row: &LocationRow) -> WithId<Location> {
        let coordinates = self.coordinates[&row.coordinates_id];
        let country_part = row
            .country_part_id
            .and_then(|part_id| self.country_parts.get(&part_id).cloned())
            .unwrap_or_default();
        WithId::new(
            Id::new(id),
            Location {
                name: row.name.clone(),
                coordinates,
                country_part,
                coordinates_id: Some(Id::new(row.coordinates_id)),
                country_part_id: row.country_part_id.map(Id::new),
            },
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    state: Arc<Mutex<MemoryState>>,
    writer: Arc<tokio::sync::Mutex<()>>,
    latency: Option<Duration>,
    unisolated: bool,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every storage call sleeps for `latency` first.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    /// Transactions neither copy nor lock the state. Each call still sleeps
    /// for `latency`, which lets concurrent callers interleave.
    pub fn without_isolation(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            unisolated: true,
            ..Self::default()
        }
    }

    /// Copy of the committed state, for inspection.
    pub fn snapshot(&self) -> MemoryState {
        self.state.lock().unwrap().clone()
    }

    pub fn fail_location_inserts(&self) {
        self.state.lock().unwrap().fail_location_inserts = true;
    }
}

pub struct MemorySession {
    shared: Arc<Mutex<MemoryState>>,
    writer: Arc<tokio::sync::Mutex<()>>,
    latency: Option<Duration>,
    /// Set for transactions: the working copy and the writer lock.
    working: Option<(MemoryState, OwnedMutexGuard<()>)>,
}

impl MemorySession {
    async fn with_state<R, F>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut MemoryState) -> R + Send,
        R: Send,
    {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match &mut self.working {
            Some((state, _)) => f(state),
            None => {
                let _writer = self.writer.lock().await;
                let result = {
                    let mut state = self.shared.lock().unwrap();
                    f(&mut state)
                };
                result
            }
        }
    }
}

fn injected_failure() -> DatabaseError {
    DatabaseError::other(io::Error::other("injected failure"))
}

#[async_trait]
impl CoordinatesRepo for MemorySession {
    async fn insert_coordinates(
        &mut self,
        coordinates: Coordinates,
    ) -> Result<WithId<Coordinates>> {
        self.with_state(|state| {
            let id = state.next_id();
            state.coordinates.insert(id, coordinates);
            Ok(WithId::new(Id::new(id), coordinates))
        })
        .await
    }
}

#[async_trait]
impl CountryPartRepo for MemorySession {
    async fn country_part_by_triple(
        &mut self,
        part: &CountryPart,
    ) -> Result<Option<Id<CountryPart>>> {
        self.with_state(|state| {
            Ok(state
                .country_parts
                .iter()
                .find(|(_, stored)| *stored == part)
                .map(|(id, _)| Id::new(*id)))
        })
        .await
    }

    async fn put_country_part(
        &mut self,
        part: &CountryPart,
    ) -> Result<WithId<CountryPart>> {
        self.with_state(|state| {
            if let Some((id, stored)) =
                state.country_parts.iter().find(|(_, stored)| *stored == part)
            {
                return Ok(WithId::new(Id::new(*id), stored.clone()));
            }
            let id = state.next_id();
            state.country_parts.insert(id, part.clone());
            Ok(WithId::new(Id::new(id), part.clone()))
        })
        .await
    }

    async fn get_country_part(
        &mut self,
        id: &Id<CountryPart>,
    ) -> Result<WithId<CountryPart>> {
        let id = id.raw();
        self.with_state(|state| {
            state
                .country_parts
                .get(&id)
                .map(|part| WithId::new(Id::new(id), part.clone()))
                .ok_or(DatabaseError::NotFound)
        })
        .await
    }
}

#[async_trait]
impl LocationRepo for MemorySession {
    async fn insert_location(&mut self, location: Location) -> Result<WithId<Location>> {
        self.with_state(|state| {
            if state.fail_location_inserts {
                return Err(injected_failure());
            }
            let coordinates_id = location
                .coordinates_id
                .map(|id| id.raw())
                .filter(|id| state.coordinates.contains_key(id))
                .ok_or(DatabaseError::IdMissing)?;
            let country_part_id = location.country_part_id.map(|id| id.raw());
            if let Some(part_id) = country_part_id {
                if !state.country_parts.contains_key(&part_id) {
                    return Err(DatabaseError::IdMissing);
                }
            }
            let id = state.next_id();
            state.locations.insert(
                id,
                LocationRow {
                    name: location.name.clone(),
                    coordinates_id,
                    country_part_id,
                    deleted_at: None,
                },
            );
            Ok(WithId::new(Id::new(id), location))
        })
        .await
    }

    async fn get_location(&mut self, id: &Id<Location>) -> Result<WithId<Location>> {
        let id = id.raw();
        self.with_state(|state| {
            state
                .live_location(id)
                .map(|row| state.assemble(id, row))
                .ok_or(DatabaseError::NotFound)
        })
        .await
    }

    async fn set_location_country_part(
        &mut self,
        id: &Id<Location>,
        country_part_id: Option<Id<CountryPart>>,
    ) -> Result<()> {
        let id = id.raw();
        self.with_state(|state| {
            let row = state
                .locations
                .get_mut(&id)
                .filter(|row| row.deleted_at.is_none())
                .ok_or(DatabaseError::NotFound)?;
            row.country_part_id = country_part_id.map(|part_id| part_id.raw());
            Ok(())
        })
        .await
    }

    async fn soft_delete_location(&mut self, id: &Id<Location>) -> Result<()> {
        let id = id.raw();
        self.with_state(|state| {
            let row = state
                .locations
                .get_mut(&id)
                .filter(|row| row.deleted_at.is_none())
                .ok_or(DatabaseError::NotFound)?;
            row.deleted_at = Some(Local::now());
            Ok(())
        })
        .await
    }

    async fn location_deleted_at(
        &mut self,
        id: &Id<Location>,
    ) -> Result<Option<DateTime<Local>>> {
        let id = id.raw();
        self.with_state(|state| {
            state
                .locations
                .get(&id)
                .map(|row| row.deleted_at)
                .ok_or(DatabaseError::NotFound)
        })
        .await
    }

    async fn locations_by_name_prefix(
        &mut self,
        prefix: &str,
    ) -> Result<Vec<WithId<Location>>> {
        let prefix = prefix.to_lowercase();
        self.with_state(|state| {
            let mut found = state
                .locations
                .iter()
                .filter(|(_, row)| row.deleted_at.is_none())
                .filter(|(_, row)| row.name.to_lowercase().starts_with(&prefix))
                .map(|(id, row)| state.assemble(*id, row))
                .collect::<Vec<_>>();
            found.sort_by(|a, b| a.content.name.cmp(&b.content.name));
            Ok(found)
        })
        .await
    }
}

#[async_trait]
impl UserRepo for MemorySession {
    async fn insert_user(&mut self, user: User) -> Result<WithId<User>> {
        self.with_state(|state| {
            let id = state.next_id();
            state.users.insert(id, user.clone());
            Ok(WithId::new(Id::new(id), user))
        })
        .await
    }

    async fn insert_credentials(
        &mut self,
        user_id: &Id<User>,
        credentials: Credentials,
    ) -> Result<()> {
        let user_id = user_id.raw();
        self.with_state(|state| {
            if !state.users.contains_key(&user_id) {
                return Err(DatabaseError::IdMissing);
            }
            if state.credentials.contains_key(&user_id) {
                return Err(DatabaseError::other(io::Error::other(
                    "duplicate credentials",
                )));
            }
            state.credentials.insert(user_id, credentials);
            Ok(())
        })
        .await
    }

    async fn get_user(&mut self, id: &Id<User>) -> Result<WithId<User>> {
        let id = id.raw();
        self.with_state(|state| {
            state
                .users
                .get(&id)
                .map(|user| WithId::new(Id::new(id), user.clone()))
                .ok_or(DatabaseError::NotFound)
        })
        .await
    }

    async fn get_users(&mut self, limit: i64, offset: i64) -> Result<Vec<WithId<User>>> {
        self.with_state(|state| {
            Ok(state
                .users
                .iter()
                .skip(offset as usize)
                .take(limit as usize)
                .map(|(id, user)| WithId::new(Id::new(*id), user.clone()))
                .collect())
        })
        .await
    }

    async fn update_user(&mut self, user: WithId<User>) -> Result<WithId<User>> {
        self.with_state(|state| {
            let stored = state
                .users
                .get_mut(&user.id.raw())
                .ok_or(DatabaseError::NotFound)?;
            *stored = user.content.clone();
            Ok(user)
        })
        .await
    }

    async fn update_credentials(
        &mut self,
        user_id: &Id<User>,
        credentials: Credentials,
    ) -> Result<()> {
        let user_id = user_id.raw();
        self.with_state(|state| {
            let stored = state
                .credentials
                .get_mut(&user_id)
                .ok_or(DatabaseError::NotFound)?;
            *stored = credentials;
            Ok(())
        })
        .await
    }

    async fn delete_user(&mut self, id: &Id<User>) -> Result<()> {
        let id = id.raw();
        self.with_state(|state| {
            state.users.remove(&id).ok_or(DatabaseError::NotFound)?;
            state.credentials.remove(&id);
            Ok(())
        })
        .await
    }
}

impl DatabaseOperations for MemorySession {}

impl DatabaseAutocommit for MemorySession {}

#[async_trait]
impl DatabaseTransaction for MemorySession {
    async fn commit(mut self) -> Result<()> {
        // without a working copy every call was applied already
        if let Some((working, _writer)) = self.working.take() {
            *self.shared.lock().unwrap() = working;
        }
        Ok(())
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    type Transaction = MemorySession;
    type Autocommit = MemorySession;

    async fn transaction(&self) -> Result<Self::Transaction> {
        if self.unisolated {
            return Ok(self.auto());
        }
        let writer = self.writer.clone().lock_owned().await;
        let working = self.state.lock().unwrap().clone();
        Ok(MemorySession {
            shared: self.state.clone(),
            writer: self.writer.clone(),
            latency: self.latency,
            working: Some((working, writer)),
        })
    }

    fn auto(&self) -> Self::Autocommit {
        MemorySession {
            shared: self.state.clone(),
            writer: self.writer.clone(),
            latency: self.latency,
            working: None,
        }
    }
}
