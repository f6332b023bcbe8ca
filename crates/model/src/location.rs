use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::id::{HasId, Id};

use crate::ExampleData;

/// A point on the map. Owned by exactly one [`Location`] and never shared.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinates {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

impl HasId for Coordinates {
    type IdType = i64;
}

/// An administrative area a location lies in.
///
/// Country parts are shared between locations and identified by the triple
/// (`area_name`, `postal_code`, `country_part`). The store keeps at most one
/// row per triple.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "camelCase")]
pub struct CountryPart {
    #[serde(default)]
    pub area_name: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub country_part: String,
}

impl CountryPart {
    pub fn new<A, P, C>(area_name: A, postal_code: P, country_part: C) -> Self
    where
        A: Into<String>,
        P: Into<String>,
        C: Into<String>,
    {
        Self {
            area_name: area_name.into(),
            postal_code: postal_code.into(),
            country_part: country_part.into(),
        }
    }

    /// The empty country part means "no country part". It is never stored.
    pub fn is_empty(&self) -> bool {
        self.area_name.trim().is_empty()
            && self.postal_code.trim().is_empty()
            && self.country_part.trim().is_empty()
    }
}

impl HasId for CountryPart {
    type IdType = i64;
}

/// A named place, e.g. a start site or a landing field.
///
/// The coordinate and country part fields are embedded. The `*_id` fields
/// are filled in by the store and ignored on input.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub name: String,
    pub coordinates: Coordinates,
    #[serde(flatten)]
    pub country_part: CountryPart,
    #[serde(default, skip_deserializing)]
    pub coordinates_id: Option<Id<Coordinates>>,
    #[serde(default, skip_deserializing)]
    pub country_part_id: Option<Id<CountryPart>>,
}

impl Location {
    pub fn new<S: Into<String>>(
        name: S,
        coordinates: Coordinates,
        country_part: CountryPart,
    ) -> Self {
        Self {
            name: name.into(),
            coordinates,
            country_part,
            coordinates_id: None,
            country_part_id: None,
        }
    }
}

impl HasId for Location {
    type IdType = i64;
}

impl ExampleData for Location {
    fn example_data() -> Self {
        Location::new(
            "Oslo Vest",
            Coordinates::new(10.0, 59.9),
            CountryPart::new("Oslo", "0150", "East"),
        )
    }
}
