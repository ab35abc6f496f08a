mod bookmarks;
mod follows;
mod messages;
mod reactions;
mod sessions;
mod tuits;
mod users;

use super::models::{
    BookmarkRecord, FollowRecord, MessageRecord, ReactionKind, ReactionRecord, SessionRecord,
    TuitPatch, TuitRecord, TuitStats, UserPatch, UserRecord,
};
use anyhow::Result;
use rusqlite::Connection;

/// Mutating calls that can match zero rows return the number of affected
/// rows instead of failing.
pub trait UserRepository {
    fn create(&self, record: &UserRecord) -> Result<()>;
    fn get(&self, id: &str) -> Result<Option<UserRecord>>;
    fn get_by_username(&self, username: &str) -> Result<Option<UserRecord>>;
    fn list(&self) -> Result<Vec<UserRecord>>;
    fn update(&self, id: &str, patch: &UserPatch) -> Result<usize>;
    fn delete(&self, id: &str) -> Result<usize>;
    fn delete_all(&self) -> Result<usize>;
    fn delete_by_username(&self, username: &str) -> Result<usize>;
}

pub trait TuitRepository {
    fn create(&self, record: &TuitRecord) -> Result<()>;
    fn get(&self, id: &str) -> Result<Option<TuitRecord>>;
    /// Most recent first.
    fn list(&self) -> Result<Vec<TuitRecord>>;
    /// Most recent first, each tuit joined with its author.
    fn list_by_author(&self, user_id: &str) -> Result<Vec<(TuitRecord, UserRecord)>>;
    fn update(&self, id: &str, patch: &TuitPatch) -> Result<usize>;
    fn update_stats(&self, id: &str, stats: &TuitStats) -> Result<usize>;
    fn delete(&self, id: &str) -> Result<usize>;
}

pub trait FollowRepository {
    /// Inserts unless the (follower, followee) pair already exists. Returns
    /// whether a row was written.
    fn create_if_absent(&self, record: &FollowRecord) -> Result<bool>;
    fn get(&self, follower_id: &str, followee_id: &str) -> Result<Option<FollowRecord>>;
    /// Follows made by `follower_id`, joined with the followed user.
    fn list_following(&self, follower_id: &str) -> Result<Vec<(FollowRecord, UserRecord)>>;
    /// Follows targeting `followee_id`, joined with the following user.
    fn list_followers(&self, followee_id: &str) -> Result<Vec<(FollowRecord, UserRecord)>>;
    fn delete(&self, follower_id: &str, followee_id: &str) -> Result<usize>;
}

pub trait BookmarkRepository {
    fn create_if_absent(&self, record: &BookmarkRecord) -> Result<bool>;
    fn get(&self, user_id: &str, tuit_id: &str) -> Result<Option<BookmarkRecord>>;
    fn list_for_user(&self, user_id: &str) -> Result<Vec<(BookmarkRecord, TuitRecord)>>;
    fn list_for_tuit(&self, tuit_id: &str) -> Result<Vec<(BookmarkRecord, UserRecord)>>;
    fn delete(&self, user_id: &str, tuit_id: &str) -> Result<usize>;
}

pub trait MessageRepository {
    fn create(&self, record: &MessageRecord) -> Result<()>;
    fn get(&self, id: &str) -> Result<Option<MessageRecord>>;
    /// Messages sent by `user_id`, joined with the recipient.
    fn list_sent(&self, user_id: &str) -> Result<Vec<(MessageRecord, UserRecord)>>;
    /// Messages addressed to `user_id`, joined with the sender.
    fn list_received(&self, user_id: &str) -> Result<Vec<(MessageRecord, UserRecord)>>;
    fn delete(&self, sender_id: &str, message_id: &str) -> Result<usize>;
}

pub trait ReactionRepository {
    fn get(&self, user_id: &str, tuit_id: &str) -> Result<Option<ReactionRecord>>;
    /// Writes the reaction, replacing whatever the user held on that tuit.
    fn upsert(&self, record: &ReactionRecord) -> Result<()>;
    fn delete(&self, user_id: &str, tuit_id: &str) -> Result<usize>;
    fn list_tuits_for_user(
        &self,
        user_id: &str,
        kind: ReactionKind,
    ) -> Result<Vec<(ReactionRecord, TuitRecord)>>;
    fn list_users_for_tuit(
        &self,
        tuit_id: &str,
        kind: ReactionKind,
    ) -> Result<Vec<(ReactionRecord, UserRecord)>>;
    fn count_for_tuit(&self, tuit_id: &str, kind: ReactionKind) -> Result<i64>;
    /// Distinct tuits the user holds any reaction on.
    fn tuit_ids_for_user(&self, user_id: &str) -> Result<Vec<String>>;
}

pub trait SessionRepository {
    fn create(&self, record: &SessionRecord) -> Result<()>;
    fn get(&self, id: &str) -> Result<Option<SessionRecord>>;
    fn delete(&self, id: &str) -> Result<usize>;
}

/// Borrowed view over a connection handing out the rusqlite-backed
/// repositories.
pub struct SqliteRepositories<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRepositories<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn users(&self) -> impl UserRepository + '_ {
        users::SqliteUserRepository { conn: self.conn }
    }

    pub fn tuits(&self) -> impl TuitRepository + '_ {
        tuits::SqliteTuitRepository { conn: self.conn }
    }

    pub fn follows(&self) -> impl FollowRepository + '_ {
        follows::SqliteFollowRepository { conn: self.conn }
    }

    pub fn bookmarks(&self) -> impl BookmarkRepository + '_ {
        bookmarks::SqliteBookmarkRepository { conn: self.conn }
    }

    pub fn messages(&self) -> impl MessageRepository + '_ {
        messages::SqliteMessageRepository { conn: self.conn }
    }

    pub fn reactions(&self) -> impl ReactionRepository + '_ {
        reactions::SqliteReactionRepository { conn: self.conn }
    }

    pub fn sessions(&self) -> impl SessionRepository + '_ {
        sessions::SqliteSessionRepository { conn: self.conn }
    }

    pub fn conn(&self) -> &'conn Connection {
        self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MIGRATIONS;

    fn setup_conn() -> Connection {
        let conn = Connection::open_in_memory().expect("in-memory db");
        conn.execute_batch(MIGRATIONS).expect("migrations");
        conn
    }

    fn user(id: &str, username: &str) -> UserRecord {
        UserRecord {
            id: id.into(),
            username: username.into(),
            password_hash: "hash".into(),
            email: format!("{username}@example.com"),
            first_name: None,
            last_name: None,
            profile_photo: None,
            header_image: None,
            biography: None,
            date_of_birth: None,
            account_type: None,
            marital_status: None,
            latitude: None,
            longitude: None,
            salary: None,
            joined: "2024-01-01T00:00:00.000Z".into(),
        }
    }

    fn tuit(id: &str, author: &str, posted_on: &str) -> TuitRecord {
        TuitRecord {
            id: id.into(),
            tuit: format!("tuit {id}"),
            posted_by: author.into(),
            posted_on: posted_on.into(),
            image: None,
            youtube: None,
            avatar_logo: None,
            image_overlay: None,
            stats: TuitStats::default(),
        }
    }

    #[test]
    fn user_and_tuit_repositories_work() {
        let conn = setup_conn();
        let repos = SqliteRepositories::new(&conn);

        repos.users().create(&user("u1", "alice")).unwrap();
        let fetched = repos.users().get_by_username("alice").unwrap().unwrap();
        assert_eq!(fetched.id, "u1");

        repos
            .tuits()
            .create(&tuit("t1", "u1", "2024-01-01T00:00:00.000Z"))
            .unwrap();
        repos
            .tuits()
            .create(&tuit("t2", "u1", "2024-01-02T00:00:00.000Z"))
            .unwrap();

        let by_author = repos.tuits().list_by_author("u1").unwrap();
        let ids: Vec<_> = by_author.iter().map(|(t, _)| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t2", "t1"]);
        assert_eq!(by_author[0].1.username, "alice");
    }

    #[test]
    fn deleting_user_cascades_to_relationships() {
        let conn = setup_conn();
        let repos = SqliteRepositories::new(&conn);

        repos.users().create(&user("u1", "alice")).unwrap();
        repos.users().create(&user("u2", "bob")).unwrap();
        repos
            .tuits()
            .create(&tuit("t1", "u2", "2024-01-01T00:00:00.000Z"))
            .unwrap();
        repos
            .bookmarks()
            .create_if_absent(&BookmarkRecord {
                id: "b1".into(),
                tuit_id: "t1".into(),
                bookmarked_by: "u1".into(),
                bookmarked_on: "2024-01-01T00:00:00.000Z".into(),
            })
            .unwrap();

        assert_eq!(repos.users().delete("u2").unwrap(), 1);
        assert!(repos.tuits().get("t1").unwrap().is_none());
        assert!(repos.bookmarks().list_for_user("u1").unwrap().is_empty());
    }

    #[test]
    fn unique_indexes_guard_relationships() {
        let conn = setup_conn();
        let repos = SqliteRepositories::new(&conn);
        repos.users().create(&user("u1", "alice")).unwrap();
        repos.users().create(&user("u2", "bob")).unwrap();

        let follow = FollowRecord {
            id: "f1".into(),
            follower_id: "u1".into(),
            followee_id: "u2".into(),
            followed_on: "2024-01-01T00:00:00.000Z".into(),
        };
        assert!(repos.follows().create_if_absent(&follow).unwrap());
        let again = FollowRecord {
            id: "f2".into(),
            ..follow.clone()
        };
        assert!(!repos.follows().create_if_absent(&again).unwrap());
        assert_eq!(repos.follows().list_following("u1").unwrap().len(), 1);

        let self_follow = FollowRecord {
            id: "f3".into(),
            follower_id: "u1".into(),
            followee_id: "u1".into(),
            followed_on: "2024-01-01T00:00:00.000Z".into(),
        };
        assert!(repos.follows().create_if_absent(&self_follow).is_err());
    }
}
