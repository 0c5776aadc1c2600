//! Student domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Student {
    pub id: Uuid,
    pub name: String,
    pub age: u32,
    pub grade: String,
    pub email: String,
    /// Username of the principal that created the record.
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// Client-supplied student fields, used for both create and full update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentInput {
    pub name: String,
    pub age: u32,
    pub grade: String,
    pub email: String,
}
