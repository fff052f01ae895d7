use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jobmodel::JobStatus;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "proposal_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ProposalStatus {
    pub fn to_str(&self) -> &str {
        match self {
            ProposalStatus::Pending => "pending",
            ProposalStatus::Accepted => "accepted",
            ProposalStatus::Rejected => "rejected",
        }
    }

    /// Accepted and rejected are terminal; only a pending proposal may
    /// transition.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProposalStatus::Pending)
    }
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Proposal {
    pub id: Uuid,
    pub job_id: Uuid,
    pub freelancer_id: Uuid,
    pub cover_letter: String,
    pub proposed_budget: f64,
    pub status: ProposalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A proposal row with the job and freelancer references resolved.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct ProposalWithDetails {
    pub id: Uuid,
    pub job_id: Uuid,
    pub job_title: String,
    pub job_budget: f64,
    pub job_status: JobStatus,
    pub job_posted_by: Uuid,
    pub freelancer_id: Uuid,
    pub freelancer_name: String,
    pub freelancer_email: String,
    pub cover_letter: String,
    pub proposed_budget: f64,
    pub status: ProposalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_is_the_only_open_state() {
        assert!(!ProposalStatus::Pending.is_terminal());
        assert!(ProposalStatus::Accepted.is_terminal());
        assert!(ProposalStatus::Rejected.is_terminal());
    }

    #[test]
    fn status_strings_match_the_database_enum() {
        assert_eq!(ProposalStatus::Pending.to_str(), "pending");
        assert_eq!(ProposalStatus::Accepted.to_str(), "accepted");
        assert_eq!(ProposalStatus::Rejected.to_str(), "rejected");
    }
}
