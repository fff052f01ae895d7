use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    dtos::messagedtos::{ConversationDto, ConversationJobDto},
    dtos::userdtos::UserSummaryDto,
    models::messagemodel::MessageWithParties,
};

/// Groups a user's messages into conversations keyed by (job, counterparty).
///
/// The fold walks the messages newest-first. The first message seen for a
/// key fixes last_message and last_message_time; older messages for the
/// same key never overwrite them. The unread counter accumulates for every
/// message addressed to the viewer that is still unread, wherever it sits
/// in the thread. Conversations come out in first-encounter order, so the
/// most recently active one is first.
///
/// Store return order does not matter: the input is re-sorted here before
/// the fold so the summary always reflects the chronologically newest
/// message of each group.
pub fn derive_conversations(
    viewer_id: Uuid,
    messages: &[MessageWithParties],
) -> Vec<ConversationDto> {
    let mut ordered: Vec<&MessageWithParties> = messages.iter().collect();
    ordered.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let mut conversations: Vec<ConversationDto> = Vec::new();
    let mut index: HashMap<(Uuid, Uuid), usize> = HashMap::new();

    for msg in ordered {
        let other_user = if msg.sender_id == viewer_id {
            UserSummaryDto {
                id: msg.receiver_id,
                name: msg.receiver_name.clone(),
                email: msg.receiver_email.clone(),
            }
        } else {
            UserSummaryDto {
                id: msg.sender_id,
                name: msg.sender_name.clone(),
                email: msg.sender_email.clone(),
            }
        };

        let key = (msg.job_id, other_user.id);
        let pos = match index.get(&key) {
            Some(pos) => *pos,
            None => {
                conversations.push(ConversationDto {
                    job: ConversationJobDto {
                        id: msg.job_id,
                        title: msg.job_title.clone(),
                    },
                    other_user,
                    last_message: msg.content.clone(),
                    last_message_time: msg.created_at,
                    unread_count: 0,
                });
                let pos = conversations.len() - 1;
                index.insert(key, pos);
                pos
            }
        };

        if msg.receiver_id == viewer_id && !msg.read {
            conversations[pos].unread_count += 1;
        }
    }

    conversations
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};

    struct Party {
        id: Uuid,
        name: &'static str,
        email: &'static str,
    }

    fn party(name: &'static str, email: &'static str) -> Party {
        Party {
            id: Uuid::new_v4(),
            name,
            email,
        }
    }

    fn message(
        job_id: Uuid,
        job_title: &str,
        sender: &Party,
        receiver: &Party,
        content: &str,
        read: bool,
        created_at: DateTime<Utc>,
    ) -> MessageWithParties {
        MessageWithParties {
            id: Uuid::new_v4(),
            job_id,
            job_title: job_title.to_string(),
            sender_id: sender.id,
            sender_name: sender.name.to_string(),
            sender_email: sender.email.to_string(),
            receiver_id: receiver.id,
            receiver_name: receiver.name.to_string(),
            receiver_email: receiver.email.to_string(),
            content: content.to_string(),
            read,
            created_at,
        }
    }

    #[test]
    fn groups_by_job_and_counterparty() {
        let employer = party("Erin", "erin@example.com");
        let fay = party("Fay", "fay@example.com");
        let gus = party("Gus", "gus@example.com");
        let job_a = Uuid::new_v4();
        let job_b = Uuid::new_v4();
        let t0 = Utc::now();

        let messages = vec![
            message(job_a, "Job A", &fay, &employer, "hi on A", false, t0),
            message(job_a, "Job A", &gus, &employer, "me too on A", false, t0 + Duration::seconds(1)),
            message(job_b, "Job B", &fay, &employer, "hi on B", false, t0 + Duration::seconds(2)),
        ];

        let conversations = derive_conversations(employer.id, &messages);

        assert_eq!(conversations.len(), 3);
        let keys: Vec<(Uuid, Uuid)> = conversations
            .iter()
            .map(|c| (c.job.id, c.other_user.id))
            .collect();
        assert!(keys.contains(&(job_a, fay.id)));
        assert!(keys.contains(&(job_a, gus.id)));
        assert!(keys.contains(&(job_b, fay.id)));
    }

    #[test]
    fn newest_message_wins_the_summary_regardless_of_input_order() {
        let employer = party("Erin", "erin@example.com");
        let fay = party("Fay", "fay@example.com");
        let job = Uuid::new_v4();
        let t0 = Utc::now();

        let oldest = message(job, "Job", &fay, &employer, "first", true, t0);
        let middle = message(job, "Job", &employer, &fay, "second", true, t0 + Duration::seconds(5));
        let newest = message(job, "Job", &fay, &employer, "third", false, t0 + Duration::seconds(10));

        let orders: Vec<Vec<MessageWithParties>> = vec![
            vec![newest.clone(), middle.clone(), oldest.clone()],
            vec![oldest.clone(), middle.clone(), newest.clone()],
            vec![middle.clone(), newest.clone(), oldest.clone()],
        ];

        for messages in orders {
            let conversations = derive_conversations(employer.id, &messages);
            assert_eq!(conversations.len(), 1);
            assert_eq!(conversations[0].last_message, "third");
            assert_eq!(conversations[0].last_message_time, newest.created_at);
        }
    }

    #[test]
    fn unread_counts_only_messages_addressed_to_the_viewer() {
        let employer = party("Erin", "erin@example.com");
        let fay = party("Fay", "fay@example.com");
        let job = Uuid::new_v4();
        let t0 = Utc::now();

        let messages = vec![
            // unread, addressed to the viewer: counts
            message(job, "Job", &fay, &employer, "one", false, t0),
            // already read: does not count
            message(job, "Job", &fay, &employer, "two", true, t0 + Duration::seconds(1)),
            // unread but sent by the viewer: does not count
            message(job, "Job", &employer, &fay, "three", false, t0 + Duration::seconds(2)),
            // unread, addressed to the viewer, oldest in the thread: counts
            message(job, "Job", &fay, &employer, "four", false, t0 - Duration::seconds(60)),
        ];

        let conversations = derive_conversations(employer.id, &messages);

        assert_eq!(conversations.len(), 1);
        assert_eq!(conversations[0].unread_count, 2);
    }

    #[test]
    fn emission_order_is_most_recently_active_first() {
        let employer = party("Erin", "erin@example.com");
        let fay = party("Fay", "fay@example.com");
        let gus = party("Gus", "gus@example.com");
        let job = Uuid::new_v4();
        let t0 = Utc::now();

        let messages = vec![
            message(job, "Job", &fay, &employer, "older thread", false, t0),
            message(job, "Job", &gus, &employer, "newer thread", false, t0 + Duration::seconds(30)),
            message(job, "Job", &fay, &employer, "oldest of all", false, t0 - Duration::seconds(30)),
        ];

        let conversations = derive_conversations(employer.id, &messages);

        assert_eq!(conversations.len(), 2);
        assert_eq!(conversations[0].other_user.id, gus.id);
        assert_eq!(conversations[1].other_user.id, fay.id);
    }

    #[test]
    fn permuted_input_derives_identical_conversations() {
        let employer = party("Erin", "erin@example.com");
        let fay = party("Fay", "fay@example.com");
        let gus = party("Gus", "gus@example.com");
        let job_a = Uuid::new_v4();
        let job_b = Uuid::new_v4();
        let t0 = Utc::now();

        let mut messages = vec![
            message(job_a, "Job A", &fay, &employer, "a1", false, t0),
            message(job_a, "Job A", &employer, &fay, "a2", true, t0 + Duration::seconds(1)),
            message(job_b, "Job B", &gus, &employer, "b1", false, t0 + Duration::seconds(2)),
            message(job_a, "Job A", &fay, &employer, "a3", false, t0 + Duration::seconds(3)),
        ];

        let expected = derive_conversations(employer.id, &messages);

        messages.reverse();
        let from_reversed = derive_conversations(employer.id, &messages);

        messages.swap(0, 2);
        let from_swapped = derive_conversations(employer.id, &messages);

        for derived in [from_reversed, from_swapped] {
            assert_eq!(derived.len(), expected.len());
            for (a, b) in expected.iter().zip(derived.iter()) {
                assert_eq!(a.job, b.job);
                assert_eq!(a.other_user, b.other_user);
                assert_eq!(a.last_message, b.last_message);
                assert_eq!(a.last_message_time, b.last_message_time);
                assert_eq!(a.unread_count, b.unread_count);
            }
        }
    }

    #[test]
    fn empty_input_yields_no_conversations() {
        let viewer = Uuid::new_v4();
        assert!(derive_conversations(viewer, &[]).is_empty());
    }
}
