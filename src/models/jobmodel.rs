use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "job_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Open,
    InProgress,
    Completed,
    Cancelled,
}

impl JobStatus {
    pub fn to_str(&self) -> &str {
        match self {
            JobStatus::Open => "open",
            JobStatus::InProgress => "in_progress",
            JobStatus::Completed => "completed",
            JobStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub budget: f64,
    pub skills: Vec<String>,
    pub posted_by: Uuid,
    pub assigned_to: Option<Uuid>,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A job row with its user references resolved, as listing and detail
/// endpoints return it. assigned_to columns are null until a proposal
/// has been accepted.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct JobWithUsers {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub budget: f64,
    pub skills: Vec<String>,
    pub status: JobStatus,
    pub posted_by: Uuid,
    pub posted_by_name: String,
    pub posted_by_email: String,
    pub assigned_to: Option<Uuid>,
    pub assigned_to_name: Option<String>,
    pub assigned_to_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
