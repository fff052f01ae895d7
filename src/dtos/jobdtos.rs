use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::userdtos::UserSummaryDto;
use crate::models::jobmodel::{JobStatus, JobWithUsers};

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct CreateJobDto {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    #[validate(range(min = 0.01, message = "Budget must be greater than zero"))]
    pub budget: f64,

    pub skills: Option<Vec<String>>,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct UpdateJobDto {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,

    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: Option<String>,

    #[validate(range(min = 0.01, message = "Budget must be greater than zero"))]
    pub budget: Option<f64>,

    pub skills: Option<Vec<String>>,
    pub status: Option<JobStatus>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JobDto {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub budget: f64,
    pub skills: Vec<String>,
    pub status: String,
    pub posted_by: UserSummaryDto,
    pub assigned_to: Option<UserSummaryDto>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl JobDto {
    pub fn from_row(row: &JobWithUsers) -> Self {
        let assigned_to = match (row.assigned_to, &row.assigned_to_name, &row.assigned_to_email) {
            (Some(id), Some(name), Some(email)) => Some(UserSummaryDto {
                id,
                name: name.clone(),
                email: email.clone(),
            }),
            _ => None,
        };

        JobDto {
            id: row.id,
            title: row.title.clone(),
            description: row.description.clone(),
            budget: row.budget,
            skills: row.skills.clone(),
            status: row.status.to_str().to_string(),
            posted_by: UserSummaryDto {
                id: row.posted_by,
                name: row.posted_by_name.clone(),
                email: row.posted_by_email.clone(),
            },
            assigned_to,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JobResponseDto {
    pub status: String,
    pub data: JobDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JobListResponseDto {
    pub status: String,
    pub jobs: Vec<JobDto>,
    pub results: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(assigned: bool) -> JobWithUsers {
        JobWithUsers {
            id: Uuid::new_v4(),
            title: "Build a landing page".to_string(),
            description: "Single page, responsive".to_string(),
            budget: 500.0,
            skills: vec!["html".to_string(), "css".to_string()],
            status: if assigned {
                JobStatus::InProgress
            } else {
                JobStatus::Open
            },
            posted_by: Uuid::new_v4(),
            posted_by_name: "Erin Employer".to_string(),
            posted_by_email: "erin@example.com".to_string(),
            assigned_to: assigned.then(Uuid::new_v4),
            assigned_to_name: assigned.then(|| "Fay Freelancer".to_string()),
            assigned_to_email: assigned.then(|| "fay@example.com".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn unassigned_job_has_no_assignee_summary() {
        let dto = JobDto::from_row(&row(false));
        assert!(dto.assigned_to.is_none());
        assert_eq!(dto.status, "open");
        assert_eq!(dto.posted_by.email, "erin@example.com");
    }

    #[test]
    fn assigned_job_resolves_the_assignee() {
        let dto = JobDto::from_row(&row(true));
        let assignee = dto.assigned_to.expect("assignee should be resolved");
        assert_eq!(assignee.name, "Fay Freelancer");
        assert_eq!(dto.status, "in_progress");
    }
}
