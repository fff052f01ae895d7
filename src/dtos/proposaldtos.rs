use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::userdtos::UserSummaryDto;
use crate::models::proposalmodel::ProposalWithDetails;

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct CreateProposalDto {
    pub job_id: Uuid,

    #[validate(length(min = 1, message = "Cover letter is required"))]
    pub cover_letter: String,

    #[validate(range(min = 0.01, message = "Proposed budget must be greater than zero"))]
    pub proposed_budget: f64,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct UpdateProposalStatusDto {
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,
}

/// Job fields a proposal response carries alongside the freelancer summary.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProposalJobDto {
    pub id: Uuid,
    pub title: String,
    pub budget: f64,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProposalDto {
    pub id: Uuid,
    pub job: ProposalJobDto,
    pub freelancer: UserSummaryDto,
    pub cover_letter: String,
    pub proposed_budget: f64,
    pub status: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl ProposalDto {
    pub fn from_row(row: &ProposalWithDetails) -> Self {
        ProposalDto {
            id: row.id,
            job: ProposalJobDto {
                id: row.job_id,
                title: row.job_title.clone(),
                budget: row.job_budget,
                status: row.job_status.to_str().to_string(),
            },
            freelancer: UserSummaryDto {
                id: row.freelancer_id,
                name: row.freelancer_name.clone(),
                email: row.freelancer_email.clone(),
            },
            cover_letter: row.cover_letter.clone(),
            proposed_budget: row.proposed_budget,
            status: row.status.to_str().to_string(),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProposalListResponseDto {
    pub status: String,
    pub proposals: Vec<ProposalDto>,
    pub results: i64,
}
