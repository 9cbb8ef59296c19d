#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Location identifiers and population registry record types.
//!
//! The population registry is a key-value store: the key is the integer
//! location identifier rendered as a string, the value a JSON document
//! describing the commune. [`LocationRecord::decode`] turns one such
//! key/value pair into a typed record or explains why it is unusable.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Canonical integer code of a commune.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LocationId(pub i64);

impl LocationId {
    /// Returns the raw integer code.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for LocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for LocationId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Which name field of a [`LocationRecord`] a query targets.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LocationKind {
    /// Smallest administrative unit.
    Commune,
    /// Grouping of communes.
    Region,
}

/// A commune as stored in the population registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    /// Unique primary key.
    pub id: LocationId,
    /// Commune name, for display and matching.
    pub commune: String,
    /// Name of the region the commune belongs to.
    pub region: String,
    /// Resident population.
    pub population: u64,
    /// Year the population figure refers to, when known.
    pub population_year: Option<i32>,
}

impl LocationRecord {
    /// Returns the name field selected by `kind`.
    #[must_use]
    pub fn name(&self, kind: LocationKind) -> &str {
        match kind {
            LocationKind::Commune => &self.commune,
            LocationKind::Region => &self.region,
        }
    }

    /// Decodes a registry key/value pair.
    ///
    /// Accepts both the English field names and the Spanish ones written
    /// by the CSV loader of earlier snapshots (`comuna`, `poblacion`, `anio_poblacion`).
    /// Population may be a JSON integer or a numeric string.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedRecord`] if the key is not an integer, the value
    /// is not a JSON object, a name is missing or blank, or the population
    /// is missing, negative or non-numeric.
    pub fn decode(key: &str, value: &str) -> Result<Self, MalformedRecord> {
        let id: LocationId = key.parse().map_err(|_| MalformedRecord::NonNumericId {
            key: key.to_string(),
        })?;

        let raw: RawRegistryValue =
            serde_json::from_str(value).map_err(|e| MalformedRecord::InvalidValue {
                message: e.to_string(),
            })?;

        let commune = non_blank(raw.commune).ok_or(MalformedRecord::MissingField("commune"))?;
        let region = non_blank(raw.region).ok_or(MalformedRecord::MissingField("region"))?;
        let population = raw
            .population
            .ok_or(MalformedRecord::MissingField("population"))
            .and_then(|p| parse_population(&p))?;

        Ok(Self {
            id,
            commune,
            region,
            population,
            population_year: raw.population_year,
        })
    }

    /// Serializes the registry value for this record (the key is
    /// [`Self::id`]).
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn encode_value(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&RawRegistryValue {
            commune: Some(self.commune.clone()),
            region: Some(self.region.clone()),
            population: Some(serde_json::Value::from(self.population)),
            population_year: self.population_year,
        })
    }
}

/// Shape of a registry value before validation.
#[derive(Debug, Serialize, Deserialize)]
struct RawRegistryValue {
    #[serde(default, alias = "comuna")]
    commune: Option<String>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default, alias = "poblacion")]
    population: Option<serde_json::Value>,
    #[serde(default, alias = "anio_poblacion", skip_serializing_if = "Option::is_none")]
    population_year: Option<i32>,
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_population(value: &serde_json::Value) -> Result<u64, MalformedRecord> {
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| MalformedRecord::InvalidPopulation {
        value: value.to_string(),
    })
}

/// Reason a registry entry could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedRecord {
    /// The key is not an integer location code.
    NonNumericId {
        /// The offending key.
        key: String,
    },
    /// The value is not a JSON object of the expected shape.
    InvalidValue {
        /// Parser message.
        message: String,
    },
    /// A required field is absent or blank.
    MissingField(&'static str),
    /// Population is negative, fractional or not a number.
    InvalidPopulation {
        /// The raw JSON value.
        value: String,
    },
}

impl std::fmt::Display for MalformedRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonNumericId { key } => write!(f, "non-numeric location id '{key}'"),
            Self::InvalidValue { message } => write!(f, "invalid registry value: {message}"),
            Self::MissingField(field) => write!(f, "missing field '{field}'"),
            Self::InvalidPopulation { value } => write!(f, "invalid population {value}"),
        }
    }
}

impl std::error::Error for MalformedRecord {}
