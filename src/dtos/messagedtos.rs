use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::userdtos::UserSummaryDto;
use crate::models::messagemodel::MessageWithParties;

// The ids stay optional so an absent field reaches the handler's own
// missing-field response instead of bouncing off the extractor.
#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageDto {
    pub job_id: Option<Uuid>,
    pub receiver_id: Option<Uuid>,

    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MessageDto {
    pub id: Uuid,
    pub job_id: Uuid,
    pub sender: UserSummaryDto,
    pub receiver: UserSummaryDto,
    pub message: String,
    pub read: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl MessageDto {
    pub fn from_row(row: &MessageWithParties) -> Self {
        MessageDto {
            id: row.id,
            job_id: row.job_id,
            sender: UserSummaryDto {
                id: row.sender_id,
                name: row.sender_name.clone(),
                email: row.sender_email.clone(),
            },
            receiver: UserSummaryDto {
                id: row.receiver_id,
                name: row.receiver_name.clone(),
                email: row.receiver_email.clone(),
            },
            message: row.content.clone(),
            read: row.read,
            created_at: row.created_at,
        }
    }
}

/// The job half of a conversation key, resolved to what the client needs
/// to render the thread list.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ConversationJobDto {
    pub id: Uuid,
    pub title: String,
}

/// One derived conversation: never persisted, recomputed on every read.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ConversationDto {
    pub job: ConversationJobDto,
    pub other_user: UserSummaryDto,
    pub last_message: String,
    pub last_message_time: DateTime<Utc>,
    pub unread_count: i64,
}
