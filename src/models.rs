use crate::db::Row;
use crate::error::{ApiError, StorageError};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body accepted by user create/update. Every field may be absent on the
/// wire; [`UserPayload::validate`] decides what is required.
#[derive(Debug, Default, Deserialize)]
pub struct UserPayload {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct VideoPayload {
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, PartialEq)]
pub struct NewVideo {
    pub title: String,
    pub url: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl UserPayload {
    pub fn validate(self) -> Result<NewUser, ApiError> {
        match (present(self.name), present(self.email)) {
            (Some(name), Some(email)) => Ok(NewUser { name, email }),
            _ => Err(ApiError::Validation(
                "Name and email are required".to_string(),
            )),
        }
    }
}

impl VideoPayload {
    pub fn validate(self) -> Result<NewVideo, ApiError> {
        match (present(self.title), present(self.url)) {
            (Some(title), Some(url)) => Ok(NewVideo {
                title,
                url,
                description: self.description,
            }),
            _ => Err(ApiError::Validation(
                "Title and url are required".to_string(),
            )),
        }
    }
}

// Blank strings count as missing.
fn present(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.trim().is_empty())
}

/// Decodes an executor row into a record type.
pub fn from_row<T: DeserializeOwned>(row: Row) -> Result<T, StorageError> {
    Ok(serde_json::from_value(serde_json::Value::Object(row))?)
}
