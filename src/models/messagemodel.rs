use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single message on a job thread. Immutable after creation except for
/// the read flag, which only ever moves false -> true.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Message {
    pub id: Uuid,
    pub job_id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// A message with sender, receiver and job resolved, as the conversation
/// and thread queries return it.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct MessageWithParties {
    pub id: Uuid,
    pub job_id: Uuid,
    pub job_title: String,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub sender_email: String,
    pub receiver_id: Uuid,
    pub receiver_name: String,
    pub receiver_email: String,
    pub content: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
