use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::id::HasId;

use crate::ExampleData;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl HasId for User {
    type IdType = i64;
}

impl ExampleData for User {
    fn example_data() -> Self {
        User {
            first_name: "Kari".to_owned(),
            last_name: "Nordmann".to_owned(),
            email: "kari@example.org".to_owned(),
        }
    }
}

/// Password material of a user. Never serialized.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub password_hash: Vec<u8>,
    pub password_salt: Vec<u8>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("password_hash", &"<redacted>")
            .field("password_salt", &"<redacted>")
            .finish()
    }
}
