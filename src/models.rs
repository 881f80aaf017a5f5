use serde::{Deserialize, Serialize};

use crate::entities::movie;

/// A numeric field as it arrived on the wire.
///
/// Anything that is not a JSON integer fitting in an `i64` lands in
/// `Invalid`, so validation can reject it with a 409 instead of the
/// extractor failing the whole body.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum IntField {
    Int(i64),
    Invalid(serde_json::Value),
}

impl IntField {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            IntField::Int(value) => Some(*value),
            IntField::Invalid(_) => None,
        }
    }
}

/// Body of `POST /movie` and `PUT /movie/{id}`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MoviePayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub release_year: Option<IntField>,
    #[serde(default)]
    pub duration_minutes: Option<IntField>,
    #[serde(default)]
    pub rating: Option<IntField>,
}

/// Body of `PATCH /movie/{id}`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MoviePatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub release_year: Option<IntField>,
    #[serde(default)]
    pub duration_minutes: Option<IntField>,
    #[serde(default)]
    pub rating: Option<IntField>,
}

#[derive(Debug, Deserialize)]
pub struct TitleQuery {
    pub title: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub release_year: i32,
    pub duration_minutes: i64,
    pub rating: i64,
}

impl From<movie::Model> for Movie {
    fn from(model: movie::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            release_year: model.release_year,
            duration_minutes: model.duration_minutes,
            rating: model.rating,
        }
    }
}

/// Fully validated values for a new or replaced movie.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewMovie {
    pub title: String,
    pub description: String,
    pub release_year: i32,
    pub duration_minutes: i64,
    pub rating: i64,
}
