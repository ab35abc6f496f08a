use crate::database::models::MessageRecord;
use crate::database::repositories::{MessageRepository, UserRepository};
use crate::database::Database;
use crate::error::{ServiceError, ServiceResult};
use crate::users::UserView;
use crate::utils::now_utc_iso;
use crate::views::{DeleteStatus, Reference};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone)]
pub struct MessageService {
    database: Database,
}

impl MessageService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Messages sent by `user_id`, oldest first, recipient joined in.
    pub fn list_sent(&self, user_id: &str) -> ServiceResult<Vec<MessageView>> {
        self.database.with_repositories(|repos| {
            let rows = repos.messages().list_sent(user_id)?;
            Ok(rows
                .into_iter()
                .map(|(message, recipient)| MessageView {
                    message_sent_to: Reference::Populated(UserView::from_record(recipient)),
                    ..MessageView::from_record(message)
                })
                .collect())
        })
    }

    /// Messages addressed to `user_id`, oldest first, sender joined in.
    pub fn list_received(&self, user_id: &str) -> ServiceResult<Vec<MessageView>> {
        self.database.with_repositories(|repos| {
            let rows = repos.messages().list_received(user_id)?;
            Ok(rows
                .into_iter()
                .map(|(message, sender)| MessageView {
                    message_sent_by: Reference::Populated(UserView::from_record(sender)),
                    ..MessageView::from_record(message)
                })
                .collect())
        })
    }

    pub fn send(&self, sender_id: &str, recipient_id: &str, input: SendMessageInput) -> ServiceResult<MessageView> {
        if input.message.trim().is_empty() {
            return Err(ServiceError::Validation("message may not be empty".into()));
        }
        let record = MessageRecord {
            id: Uuid::new_v4().to_string(),
            message: input.message,
            sent_by: sender_id.to_string(),
            sent_to: recipient_id.to_string(),
            sent_on: now_utc_iso(),
        };
        self.database.with_transaction(|repos| {
            for user_id in [sender_id, recipient_id] {
                if repos.users().get(user_id)?.is_none() {
                    return Err(ServiceError::not_found("user", user_id));
                }
            }
            repos.messages().create(&record)?;
            Ok(())
        })?;
        tracing::debug!(message_id = %record.id, sender_id, recipient_id, "message sent");
        Ok(MessageView::from_record(record))
    }

    /// Deletes one message sent by `sender_id`. There is a single stored
    /// record, so it vanishes from the recipient's inbox as well.
    pub fn delete(&self, sender_id: &str, message_id: &str) -> ServiceResult<DeleteStatus> {
        let deleted = self.database.with_repositories(|repos| {
            Ok::<_, ServiceError>(repos.messages().delete(sender_id, message_id)?)
        })?;
        Ok(DeleteStatus::deleted(deleted))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendMessageInput {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    #[serde(rename = "_id")]
    pub id: String,
    pub message: String,
    pub message_sent_by: Reference<UserView>,
    pub message_sent_to: Reference<UserView>,
    pub message_sent_on: String,
}

impl MessageView {
    fn from_record(record: MessageRecord) -> Self {
        Self {
            id: record.id,
            message: record.message,
            message_sent_by: Reference::Id(record.sent_by),
            message_sent_to: Reference::Id(record.sent_to),
            message_sent_on: record.sent_on,
        }
    }
}
