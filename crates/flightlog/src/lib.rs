use std::time::Duration;

use thiserror::Error;

pub mod client;
pub mod database;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("not found")]
    NotFound,
    #[error("{context}")]
    Persistence {
        context: &'static str,
        #[source]
        source: database::DatabaseError,
    },
    #[error("{operation} did not complete within {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },
}

impl RequestError {
    /// Wraps a storage error with the operation it occurred in. `NotFound` is
    /// passed through unwrapped.
    pub fn persistence(context: &'static str, why: database::DatabaseError) -> Self {
        match why {
            database::DatabaseError::NotFound => Self::NotFound,
            why => Self::Persistence {
                context,
                source: why,
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

pub type RequestResult<O> = Result<O, RequestError>;

pub(crate) trait Context<T> {
    fn context(self, context: &'static str) -> RequestResult<T>;
}

impl<T> Context<T> for database::Result<T> {
    fn context(self, context: &'static str) -> RequestResult<T> {
        self.map_err(|why| RequestError::persistence(context, why))
    }
}

pub fn not_found_to_none<O>(result: RequestResult<O>) -> RequestResult<Option<O>> {
    if let Err(RequestError::NotFound) = result {
        Ok(None)
    } else {
        result.map(Some)
    }
}
