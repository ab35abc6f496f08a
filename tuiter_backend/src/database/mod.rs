pub mod models;
pub mod repositories;

use crate::config::TuiterPaths;
use anyhow::anyhow;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

pub(crate) const MIGRATIONS: &str = r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        email TEXT NOT NULL,
        first_name TEXT,
        last_name TEXT,
        profile_photo TEXT,
        header_image TEXT,
        biography TEXT,
        date_of_birth TEXT,
        account_type TEXT,
        marital_status TEXT,
        latitude REAL,
        longitude REAL,
        salary REAL,
        joined TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS tuits (
        id TEXT PRIMARY KEY,
        tuit TEXT NOT NULL,
        posted_by TEXT NOT NULL,
        posted_on TEXT NOT NULL,
        image TEXT,
        youtube TEXT,
        avatar_logo TEXT,
        image_overlay TEXT,
        replies INTEGER NOT NULL DEFAULT 0,
        retuits INTEGER NOT NULL DEFAULT 0,
        likes INTEGER NOT NULL DEFAULT 0,
        dislikes INTEGER NOT NULL DEFAULT 0,
        FOREIGN KEY (posted_by) REFERENCES users(id) ON DELETE CASCADE
    );

    CREATE INDEX IF NOT EXISTS idx_tuits_posted_by ON tuits(posted_by, posted_on);
    CREATE INDEX IF NOT EXISTS idx_tuits_posted_on ON tuits(posted_on);

    CREATE TABLE IF NOT EXISTS follows (
        id TEXT PRIMARY KEY,
        follower_id TEXT NOT NULL,
        followee_id TEXT NOT NULL,
        followed_on TEXT NOT NULL,
        UNIQUE (follower_id, followee_id),
        CHECK (follower_id <> followee_id),
        FOREIGN KEY (follower_id) REFERENCES users(id) ON DELETE CASCADE,
        FOREIGN KEY (followee_id) REFERENCES users(id) ON DELETE CASCADE
    );

    CREATE INDEX IF NOT EXISTS idx_follows_followee ON follows(followee_id);

    CREATE TABLE IF NOT EXISTS bookmarks (
        id TEXT PRIMARY KEY,
        tuit_id TEXT NOT NULL,
        bookmarked_by TEXT NOT NULL,
        bookmarked_on TEXT NOT NULL,
        UNIQUE (bookmarked_by, tuit_id),
        FOREIGN KEY (tuit_id) REFERENCES tuits(id) ON DELETE CASCADE,
        FOREIGN KEY (bookmarked_by) REFERENCES users(id) ON DELETE CASCADE
    );

    CREATE INDEX IF NOT EXISTS idx_bookmarks_tuit ON bookmarks(tuit_id);

    CREATE TABLE IF NOT EXISTS messages (
        id TEXT PRIMARY KEY,
        message TEXT NOT NULL,
        sent_by TEXT NOT NULL,
        sent_to TEXT NOT NULL,
        sent_on TEXT NOT NULL,
        FOREIGN KEY (sent_by) REFERENCES users(id) ON DELETE CASCADE,
        FOREIGN KEY (sent_to) REFERENCES users(id) ON DELETE CASCADE
    );

    CREATE INDEX IF NOT EXISTS idx_messages_sent_by ON messages(sent_by, sent_on);
    CREATE INDEX IF NOT EXISTS idx_messages_sent_to ON messages(sent_to, sent_on);

    -- One row per (user, tuit): a like or a dislike, never both.
    CREATE TABLE IF NOT EXISTS reactions (
        id TEXT PRIMARY KEY,
        tuit_id TEXT NOT NULL,
        user_id TEXT NOT NULL,
        kind TEXT NOT NULL CHECK (kind IN ('like', 'dislike')),
        reacted_on TEXT NOT NULL,
        UNIQUE (user_id, tuit_id),
        FOREIGN KEY (tuit_id) REFERENCES tuits(id) ON DELETE CASCADE,
        FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
    );

    CREATE INDEX IF NOT EXISTS idx_reactions_tuit ON reactions(tuit_id, kind);

    CREATE TABLE IF NOT EXISTS sessions (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        created_at TEXT NOT NULL,
        FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
    );
"#;

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    newly_created: bool,
}

impl Database {
    pub fn connect(paths: &TuiterPaths) -> anyhow::Result<Self> {
        let newly_created = !paths.db_path.exists();
        let conn = Connection::open(&paths.db_path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        Ok(Self::from_connection(conn, newly_created))
    }

    pub fn from_connection(conn: Connection, newly_created: bool) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            newly_created,
        }
    }

    /// Applies the schema. Returns whether the database file was created by
    /// this process.
    pub fn ensure_migrations(&self) -> anyhow::Result<bool> {
        self.with_conn(|conn| {
            conn.execute_batch(MIGRATIONS)?;
            Ok::<_, anyhow::Error>(())
        })?;
        Ok(self.newly_created)
    }

    pub fn with_repositories<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(repositories::SqliteRepositories<'_>) -> Result<T, E>,
        E: From<anyhow::Error>,
    {
        self.with_conn(|conn| {
            let repos = repositories::SqliteRepositories::new(conn);
            f(repos)
        })
    }

    /// Like [`Database::with_repositories`], but every statement issued by `f`
    /// commits or rolls back together.
    pub fn with_transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(repositories::SqliteRepositories<'_>) -> Result<T, E>,
        E: From<anyhow::Error>,
    {
        self.with_conn(|conn| {
            let tx = conn
                .unchecked_transaction()
                .map_err(|err| E::from(anyhow::Error::from(err)))?;
            let value = f(repositories::SqliteRepositories::new(&tx))?;
            tx.commit().map_err(|err| E::from(anyhow::Error::from(err)))?;
            Ok(value)
        })
    }

    fn with_conn<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Connection) -> Result<T, E>,
        E: From<anyhow::Error>,
    {
        let guard = self
            .conn
            .lock()
            .map_err(|_| E::from(anyhow!("database mutex poisoned")))?;
        f(&guard)
    }
}
