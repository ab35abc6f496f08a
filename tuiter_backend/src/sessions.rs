use crate::database::models::SessionRecord;
use crate::database::repositories::{SessionRepository, UserRepository};
use crate::database::Database;
use crate::error::{ServiceError, ServiceResult};
use crate::users::UserView;
use crate::utils::now_utc_iso;
use uuid::Uuid;

/// Path segments that stand for the logged-in user.
const SELF_ALIASES: [&str; 2] = ["me", "my"];

/// Server-side login sessions. The id returned by [`SessionService::open`]
/// is what the session cookie carries.
#[derive(Clone)]
pub struct SessionService {
    database: Database,
}

impl SessionService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    pub fn open(&self, user_id: &str) -> ServiceResult<String> {
        let record = SessionRecord {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            created_at: now_utc_iso(),
        };
        self.database.with_repositories(|repos| {
            if repos.users().get(user_id)?.is_none() {
                return Err(ServiceError::not_found("user", user_id));
            }
            repos.sessions().create(&record)?;
            Ok(())
        })?;
        tracing::debug!(user_id, "session opened");
        Ok(record.id)
    }

    /// The user behind `session_id`, or `None` for unknown sessions and
    /// sessions whose user has since been deleted.
    pub fn profile(&self, session_id: &str) -> ServiceResult<Option<UserView>> {
        self.database.with_repositories(|repos| {
            let Some(session) = repos.sessions().get(session_id)? else {
                return Ok(None);
            };
            Ok(repos.users().get(&session.user_id)?.map(UserView::from_record))
        })
    }

    /// Returns whether a session was actually removed.
    pub fn close(&self, session_id: &str) -> ServiceResult<bool> {
        let deleted = self.database.with_repositories(|repos| {
            Ok::<_, ServiceError>(repos.sessions().delete(session_id)?)
        })?;
        Ok(deleted > 0)
    }
}

/// Maps the `me`/`my` path aliases to the session user. Without a session
/// the raw segment is returned unchanged and later lookups simply miss.
pub fn resolve_user_id(raw: &str, session_user_id: Option<&str>) -> String {
    match session_user_id {
        Some(user_id) if is_self_alias(raw) => user_id.to_string(),
        _ => raw.to_string(),
    }
}

pub fn is_self_alias(raw: &str) -> bool {
    SELF_ALIASES.contains(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::tests::{new_user, setup_db};
    use crate::users::UserService;

    #[test]
    fn aliases_resolve_only_with_session() {
        assert_eq!(resolve_user_id("me", Some("u1")), "u1");
        assert_eq!(resolve_user_id("my", Some("u1")), "u1");
        assert_eq!(resolve_user_id("u2", Some("u1")), "u2");
        assert_eq!(resolve_user_id("me", None), "me");
        assert_eq!(resolve_user_id("my", None), "my");
    }

    #[test]
    fn sessions_open_lookup_and_close() {
        let db = setup_db();
        let users = UserService::new(db.clone());
        let sessions = SessionService::new(db);
        let alice = users.create_user(new_user("alice")).unwrap();

        let sid = sessions.open(&alice.id).unwrap();
        let profile = sessions.profile(&sid).unwrap().unwrap();
        assert_eq!(profile.id, alice.id);

        assert!(sessions.close(&sid).unwrap());
        assert!(!sessions.close(&sid).unwrap());
        assert!(sessions.profile(&sid).unwrap().is_none());
    }

    #[test]
    fn deleting_user_ends_their_sessions() {
        let db = setup_db();
        let users = UserService::new(db.clone());
        let sessions = SessionService::new(db);
        let alice = users.create_user(new_user("alice")).unwrap();
        let sid = sessions.open(&alice.id).unwrap();

        users.delete_user(&alice.id).unwrap();
        assert!(sessions.profile(&sid).unwrap().is_none());
        assert!(matches!(
            sessions.open(&alice.id).unwrap_err(),
            ServiceError::NotFound(_)
        ));
    }
}
