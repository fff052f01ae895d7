use chrono::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// A freelancer: browses jobs and submits proposals.
    JobSeeker,
    /// An employer: posts jobs and hires freelancers.
    WorkerSeeker,
}

impl UserRole {
    pub fn to_str(&self) -> &str {
        match self {
            UserRole::JobSeeker => "job_seeker",
            UserRole::WorkerSeeker => "worker_seeker",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct User {
    pub id: uuid::Uuid,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}
