use async_trait::async_trait;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::messagemodel::{Message, MessageWithParties};

const MESSAGE_WITH_PARTIES_SELECT: &str = r#"
    SELECT m.id, m.job_id, j.title AS job_title,
           m.sender_id, s.name AS sender_name, s.email AS sender_email,
           m.receiver_id, r.name AS receiver_name, r.email AS receiver_email,
           m.content, m.read, m.created_at
    FROM messages m
    INNER JOIN jobs j ON j.id = m.job_id
    INNER JOIN users s ON s.id = m.sender_id
    INNER JOIN users r ON r.id = m.receiver_id
"#;

#[async_trait]
pub trait MessageExt {
    /// Every message the user sent or received, newest first, with all
    /// references resolved. Feeds the conversation deriver.
    async fn get_user_messages(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<MessageWithParties>, sqlx::Error>;

    /// The thread between two users on one job, oldest first.
    async fn get_thread_messages(
        &self,
        job_id: Uuid,
        user_a: Uuid,
        user_b: Uuid,
    ) -> Result<Vec<MessageWithParties>, sqlx::Error>;

    async fn save_message(
        &self,
        job_id: Uuid,
        sender_id: Uuid,
        receiver_id: Uuid,
        content: String,
    ) -> Result<Message, sqlx::Error>;

    async fn get_message_with_parties(
        &self,
        message_id: Uuid,
    ) -> Result<Option<MessageWithParties>, sqlx::Error>;

    /// Marks every unread message sent by `sender_id` to `receiver_id` on
    /// the job as read. Idempotent; the flag never reverts.
    async fn mark_thread_read(
        &self,
        job_id: Uuid,
        sender_id: Uuid,
        receiver_id: Uuid,
    ) -> Result<(), sqlx::Error>;

    async fn get_unread_count(&self, user_id: Uuid) -> Result<i64, sqlx::Error>;
}

#[async_trait]
impl MessageExt for DBClient {
    async fn get_user_messages(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<MessageWithParties>, sqlx::Error> {
        let query = format!(
            "{} WHERE m.sender_id = $1 OR m.receiver_id = $1 ORDER BY m.created_at DESC",
            MESSAGE_WITH_PARTIES_SELECT
        );

        sqlx::query_as::<_, MessageWithParties>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
    }

    async fn get_thread_messages(
        &self,
        job_id: Uuid,
        user_a: Uuid,
        user_b: Uuid,
    ) -> Result<Vec<MessageWithParties>, sqlx::Error> {
        let query = format!(
            r#"{}
            WHERE m.job_id = $1
              AND ((m.sender_id = $2 AND m.receiver_id = $3)
                OR (m.sender_id = $3 AND m.receiver_id = $2))
            ORDER BY m.created_at ASC
            "#,
            MESSAGE_WITH_PARTIES_SELECT
        );

        sqlx::query_as::<_, MessageWithParties>(&query)
            .bind(job_id)
            .bind(user_a)
            .bind(user_b)
            .fetch_all(&self.pool)
            .await
    }

    async fn save_message(
        &self,
        job_id: Uuid,
        sender_id: Uuid,
        receiver_id: Uuid,
        content: String,
    ) -> Result<Message, sqlx::Error> {
        sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (job_id, sender_id, receiver_id, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id, job_id, sender_id, receiver_id, content, read, created_at
            "#,
        )
        .bind(job_id)
        .bind(sender_id)
        .bind(receiver_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_message_with_parties(
        &self,
        message_id: Uuid,
    ) -> Result<Option<MessageWithParties>, sqlx::Error> {
        let query = format!("{} WHERE m.id = $1", MESSAGE_WITH_PARTIES_SELECT);

        sqlx::query_as::<_, MessageWithParties>(&query)
            .bind(message_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn mark_thread_read(
        &self,
        job_id: Uuid,
        sender_id: Uuid,
        receiver_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE messages
            SET read = true
            WHERE job_id = $1
              AND sender_id = $2
              AND receiver_id = $3
              AND read = false
            "#,
        )
        .bind(job_id)
        .bind(sender_id)
        .bind(receiver_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_unread_count(&self, user_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM messages
            WHERE receiver_id = $1
              AND read = false
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;

    use super::*;
    use crate::db::jobdb::JobExt;
    use crate::db::userdb::UserExt;
    use crate::models::usermodel::UserRole;

    async fn seed_user(db: &DBClient, name: &str, email: &str, role: UserRole) -> Uuid {
        db.save_user(name, email, "hashed-password", role)
            .await
            .unwrap()
            .id
    }

    async fn seed_job(db: &DBClient, employer_id: Uuid) -> Uuid {
        db.save_job(
            employer_id,
            "Translate a brochure".to_string(),
            "Twelve pages, EN to FR".to_string(),
            300.0,
            vec![],
        )
        .await
        .unwrap()
        .id
    }

    #[sqlx::test]
    async fn marking_a_thread_read_resets_the_unread_count(pool: PgPool) {
        let db = DBClient::new(pool);
        let employer = seed_user(&db, "Ada", "ada@example.com", UserRole::WorkerSeeker).await;
        let fay = seed_user(&db, "Fay", "fay@example.com", UserRole::JobSeeker).await;
        let job_id = seed_job(&db, employer).await;

        db.save_message(job_id, fay, employer, "Is this still open?".to_string())
            .await
            .unwrap();
        db.save_message(job_id, fay, employer, "I sent a proposal".to_string())
            .await
            .unwrap();
        db.save_message(job_id, employer, fay, "It is, thanks".to_string())
            .await
            .unwrap();

        assert_eq!(db.get_unread_count(employer).await.unwrap(), 2);

        // The employer opens the thread with Fay.
        db.mark_thread_read(job_id, fay, employer).await.unwrap();

        assert_eq!(db.get_unread_count(employer).await.unwrap(), 0);
        // Messages the employer sent stay unread on Fay's side.
        assert_eq!(db.get_unread_count(fay).await.unwrap(), 1);
    }

    #[sqlx::test]
    async fn mark_thread_read_only_touches_the_given_thread(pool: PgPool) {
        let db = DBClient::new(pool);
        let employer = seed_user(&db, "Ada", "ada@example.com", UserRole::WorkerSeeker).await;
        let fay = seed_user(&db, "Fay", "fay@example.com", UserRole::JobSeeker).await;
        let gus = seed_user(&db, "Gus", "gus@example.com", UserRole::JobSeeker).await;
        let job_id = seed_job(&db, employer).await;

        db.save_message(job_id, fay, employer, "Hello from Fay".to_string())
            .await
            .unwrap();
        db.save_message(job_id, gus, employer, "Hello from Gus".to_string())
            .await
            .unwrap();

        db.mark_thread_read(job_id, fay, employer).await.unwrap();

        assert_eq!(db.get_unread_count(employer).await.unwrap(), 1);

        // Repeating the call changes nothing.
        db.mark_thread_read(job_id, fay, employer).await.unwrap();
        assert_eq!(db.get_unread_count(employer).await.unwrap(), 1);
    }
}
