use async_trait::async_trait;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::proposalmodel::{Proposal, ProposalStatus, ProposalWithDetails};

const PROPOSAL_WITH_DETAILS_SELECT: &str = r#"
    SELECT pr.id, pr.job_id, j.title AS job_title, j.budget AS job_budget,
           j.status AS job_status, j.posted_by AS job_posted_by,
           pr.freelancer_id, u.name AS freelancer_name, u.email AS freelancer_email,
           pr.cover_letter, pr.proposed_budget, pr.status, pr.created_at, pr.updated_at
    FROM proposals pr
    INNER JOIN jobs j ON j.id = pr.job_id
    INNER JOIN users u ON u.id = pr.freelancer_id
"#;

#[async_trait]
pub trait ProposalExt {
    async fn get_proposal_by_id(
        &self,
        proposal_id: Uuid,
    ) -> Result<Option<Proposal>, sqlx::Error>;

    /// The one-proposal-per-(job, freelancer) lookup. The unique index on
    /// (job_id, freelancer_id) backs this up under concurrent creation.
    async fn find_proposal(
        &self,
        job_id: Uuid,
        freelancer_id: Uuid,
    ) -> Result<Option<Proposal>, sqlx::Error>;

    async fn get_proposals_by_freelancer(
        &self,
        freelancer_id: Uuid,
    ) -> Result<Vec<ProposalWithDetails>, sqlx::Error>;

    async fn get_proposals_for_employer(
        &self,
        employer_id: Uuid,
    ) -> Result<Vec<ProposalWithDetails>, sqlx::Error>;

    async fn save_proposal(
        &self,
        job_id: Uuid,
        freelancer_id: Uuid,
        cover_letter: String,
        proposed_budget: f64,
    ) -> Result<Proposal, sqlx::Error>;

    /// Flips a pending proposal to accepted and assigns the freelancer to
    /// the job in one transaction. Returns None if the proposal is gone or
    /// no longer pending.
    async fn accept_proposal(&self, proposal_id: Uuid) -> Result<Option<Proposal>, sqlx::Error>;

    /// Flips a pending proposal to rejected. Returns None if the proposal
    /// is gone or already responded to.
    async fn reject_proposal(&self, proposal_id: Uuid) -> Result<Option<Proposal>, sqlx::Error>;

    async fn delete_proposal(&self, proposal_id: Uuid) -> Result<(), sqlx::Error>;
}

#[async_trait]
impl ProposalExt for DBClient {
    async fn get_proposal_by_id(
        &self,
        proposal_id: Uuid,
    ) -> Result<Option<Proposal>, sqlx::Error> {
        sqlx::query_as::<_, Proposal>(
            r#"
            SELECT id, job_id, freelancer_id, cover_letter, proposed_budget, status,
                   created_at, updated_at
            FROM proposals
            WHERE id = $1
            "#,
        )
        .bind(proposal_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn find_proposal(
        &self,
        job_id: Uuid,
        freelancer_id: Uuid,
    ) -> Result<Option<Proposal>, sqlx::Error> {
        sqlx::query_as::<_, Proposal>(
            r#"
            SELECT id, job_id, freelancer_id, cover_letter, proposed_budget, status,
                   created_at, updated_at
            FROM proposals
            WHERE job_id = $1 AND freelancer_id = $2
            "#,
        )
        .bind(job_id)
        .bind(freelancer_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_proposals_by_freelancer(
        &self,
        freelancer_id: Uuid,
    ) -> Result<Vec<ProposalWithDetails>, sqlx::Error> {
        let query = format!(
            "{} WHERE pr.freelancer_id = $1 ORDER BY pr.created_at DESC",
            PROPOSAL_WITH_DETAILS_SELECT
        );

        sqlx::query_as::<_, ProposalWithDetails>(&query)
            .bind(freelancer_id)
            .fetch_all(&self.pool)
            .await
    }

    async fn get_proposals_for_employer(
        &self,
        employer_id: Uuid,
    ) -> Result<Vec<ProposalWithDetails>, sqlx::Error> {
        let query = format!(
            "{} WHERE j.posted_by = $1 ORDER BY pr.created_at DESC",
            PROPOSAL_WITH_DETAILS_SELECT
        );

        sqlx::query_as::<_, ProposalWithDetails>(&query)
            .bind(employer_id)
            .fetch_all(&self.pool)
            .await
    }

    async fn save_proposal(
        &self,
        job_id: Uuid,
        freelancer_id: Uuid,
        cover_letter: String,
        proposed_budget: f64,
    ) -> Result<Proposal, sqlx::Error> {
        sqlx::query_as::<_, Proposal>(
            r#"
            INSERT INTO proposals (job_id, freelancer_id, cover_letter, proposed_budget)
            VALUES ($1, $2, $3, $4)
            RETURNING id, job_id, freelancer_id, cover_letter, proposed_budget, status,
                      created_at, updated_at
            "#,
        )
        .bind(job_id)
        .bind(freelancer_id)
        .bind(cover_letter)
        .bind(proposed_budget)
        .fetch_one(&self.pool)
        .await
    }

    async fn accept_proposal(&self, proposal_id: Uuid) -> Result<Option<Proposal>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let proposal = match sqlx::query_as::<_, Proposal>(
            r#"
            SELECT id, job_id, freelancer_id, cover_letter, proposed_budget, status,
                   created_at, updated_at
            FROM proposals
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(proposal_id)
        .fetch_optional(&mut *tx)
        .await?
        {
            Some(proposal) if proposal.status == ProposalStatus::Pending => proposal,
            _ => return Ok(None),
        };

        let updated = sqlx::query_as::<_, Proposal>(
            r#"
            UPDATE proposals
            SET status = 'accepted'::proposal_status, updated_at = NOW()
            WHERE id = $1
            RETURNING id, job_id, freelancer_id, cover_letter, proposed_budget, status,
                      created_at, updated_at
            "#,
        )
        .bind(proposal_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE jobs
            SET assigned_to = $2, status = 'in_progress'::job_status, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(proposal.job_id)
        .bind(proposal.freelancer_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(updated))
    }

    async fn reject_proposal(&self, proposal_id: Uuid) -> Result<Option<Proposal>, sqlx::Error> {
        sqlx::query_as::<_, Proposal>(
            r#"
            UPDATE proposals
            SET status = 'rejected'::proposal_status, updated_at = NOW()
            WHERE id = $1 AND status = 'pending'::proposal_status
            RETURNING id, job_id, freelancer_id, cover_letter, proposed_budget, status,
                      created_at, updated_at
            "#,
        )
        .bind(proposal_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_proposal(&self, proposal_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM proposals WHERE id = $1")
            .bind(proposal_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;

    use super::*;
    use crate::db::jobdb::JobExt;
    use crate::db::userdb::UserExt;
    use crate::models::jobmodel::JobStatus;
    use crate::models::usermodel::UserRole;

    async fn seed_pending_proposal(db: &DBClient) -> Proposal {
        let employer = db
            .save_user(
                "Ada",
                "ada@example.com",
                "hashed-password",
                UserRole::WorkerSeeker,
            )
            .await
            .unwrap();
        let freelancer = db
            .save_user(
                "Fay",
                "fay@example.com",
                "hashed-password",
                UserRole::JobSeeker,
            )
            .await
            .unwrap();
        let job = db
            .save_job(
                employer.id,
                "Build a landing page".to_string(),
                "One page, responsive".to_string(),
                500.0,
                vec!["html".to_string()],
            )
            .await
            .unwrap();

        db.save_proposal(job.id, freelancer.id, "I can do this".to_string(), 450.0)
            .await
            .unwrap()
    }

    #[sqlx::test]
    async fn accepting_a_pending_proposal_assigns_the_job(pool: PgPool) {
        let db = DBClient::new(pool);
        let proposal = seed_pending_proposal(&db).await;

        let accepted = db.accept_proposal(proposal.id).await.unwrap().unwrap();
        assert_eq!(accepted.status, ProposalStatus::Accepted);

        let job = db.get_job_by_id(proposal.job_id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::InProgress);
        assert_eq!(job.assigned_to, Some(proposal.freelancer_id));
    }

    #[sqlx::test]
    async fn a_decided_proposal_cannot_be_decided_again(pool: PgPool) {
        let db = DBClient::new(pool);
        let proposal = seed_pending_proposal(&db).await;

        db.accept_proposal(proposal.id).await.unwrap().unwrap();

        assert!(db.accept_proposal(proposal.id).await.unwrap().is_none());
        assert!(db.reject_proposal(proposal.id).await.unwrap().is_none());

        let stored = db.get_proposal_by_id(proposal.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ProposalStatus::Accepted);
    }

    #[sqlx::test]
    async fn rejecting_a_proposal_leaves_the_job_open(pool: PgPool) {
        let db = DBClient::new(pool);
        let proposal = seed_pending_proposal(&db).await;

        let rejected = db.reject_proposal(proposal.id).await.unwrap().unwrap();
        assert_eq!(rejected.status, ProposalStatus::Rejected);

        let job = db.get_job_by_id(proposal.job_id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Open);
        assert_eq!(job.assigned_to, None);
    }
}
