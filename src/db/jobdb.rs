use async_trait::async_trait;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::jobmodel::{Job, JobStatus, JobWithUsers};

const JOB_WITH_USERS_SELECT: &str = r#"
    SELECT j.id, j.title, j.description, j.budget, j.skills, j.status,
           j.posted_by, p.name AS posted_by_name, p.email AS posted_by_email,
           j.assigned_to, a.name AS assigned_to_name, a.email AS assigned_to_email,
           j.created_at, j.updated_at
    FROM jobs j
    INNER JOIN users p ON p.id = j.posted_by
    LEFT JOIN users a ON a.id = j.assigned_to
"#;

#[async_trait]
pub trait JobExt {
    async fn get_job_by_id(&self, job_id: Uuid) -> Result<Option<Job>, sqlx::Error>;

    async fn get_job_with_users(&self, job_id: Uuid)
        -> Result<Option<JobWithUsers>, sqlx::Error>;

    /// Every job on the board, newest first. What a freelancer sees.
    async fn get_all_jobs(&self) -> Result<Vec<JobWithUsers>, sqlx::Error>;

    /// Only the jobs a given employer posted. What an employer sees.
    async fn get_jobs_by_employer(
        &self,
        employer_id: Uuid,
    ) -> Result<Vec<JobWithUsers>, sqlx::Error>;

    async fn save_job(
        &self,
        posted_by: Uuid,
        title: String,
        description: String,
        budget: f64,
        skills: Vec<String>,
    ) -> Result<Job, sqlx::Error>;

    async fn update_job(
        &self,
        job_id: Uuid,
        title: Option<String>,
        description: Option<String>,
        budget: Option<f64>,
        skills: Option<Vec<String>>,
        status: Option<JobStatus>,
    ) -> Result<Job, sqlx::Error>;

    async fn delete_job(&self, job_id: Uuid) -> Result<(), sqlx::Error>;
}

#[async_trait]
impl JobExt for DBClient {
    async fn get_job_by_id(&self, job_id: Uuid) -> Result<Option<Job>, sqlx::Error> {
        sqlx::query_as::<_, Job>(
            r#"
            SELECT id, title, description, budget, skills, posted_by, assigned_to,
                   status, created_at, updated_at
            FROM jobs
            WHERE id = $1
            "#,
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_job_with_users(
        &self,
        job_id: Uuid,
    ) -> Result<Option<JobWithUsers>, sqlx::Error> {
        let query = format!("{} WHERE j.id = $1", JOB_WITH_USERS_SELECT);

        sqlx::query_as::<_, JobWithUsers>(&query)
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_all_jobs(&self) -> Result<Vec<JobWithUsers>, sqlx::Error> {
        let query = format!("{} ORDER BY j.created_at DESC", JOB_WITH_USERS_SELECT);

        sqlx::query_as::<_, JobWithUsers>(&query)
            .fetch_all(&self.pool)
            .await
    }

    async fn get_jobs_by_employer(
        &self,
        employer_id: Uuid,
    ) -> Result<Vec<JobWithUsers>, sqlx::Error> {
        let query = format!(
            "{} WHERE j.posted_by = $1 ORDER BY j.created_at DESC",
            JOB_WITH_USERS_SELECT
        );

        sqlx::query_as::<_, JobWithUsers>(&query)
            .bind(employer_id)
            .fetch_all(&self.pool)
            .await
    }

    async fn save_job(
        &self,
        posted_by: Uuid,
        title: String,
        description: String,
        budget: f64,
        skills: Vec<String>,
    ) -> Result<Job, sqlx::Error> {
        sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs (title, description, budget, skills, posted_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, description, budget, skills, posted_by, assigned_to,
                      status, created_at, updated_at
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(budget)
        .bind(skills)
        .bind(posted_by)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_job(
        &self,
        job_id: Uuid,
        title: Option<String>,
        description: Option<String>,
        budget: Option<f64>,
        skills: Option<Vec<String>>,
        status: Option<JobStatus>,
    ) -> Result<Job, sqlx::Error> {
        sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                budget = COALESCE($4, budget),
                skills = COALESCE($5, skills),
                status = COALESCE($6, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, description, budget, skills, posted_by, assigned_to,
                      status, created_at, updated_at
            "#,
        )
        .bind(job_id)
        .bind(title)
        .bind(description)
        .bind(budget)
        .bind(skills)
        .bind(status)
        .fetch_one(&self.pool)
        .await
    }

    async fn delete_job(&self, job_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(job_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
