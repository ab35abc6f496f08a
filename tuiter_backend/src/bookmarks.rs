use crate::database::models::BookmarkRecord;
use crate::database::repositories::{BookmarkRepository, TuitRepository, UserRepository};
use crate::database::Database;
use crate::error::{ServiceError, ServiceResult};
use crate::tuits::TuitView;
use crate::users::UserView;
use crate::utils::now_utc_iso;
use crate::views::{DeleteStatus, Reference};
use anyhow::Context;
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone)]
pub struct BookmarkService {
    database: Database,
}

impl BookmarkService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Bookmarks held by `user_id`, each with its tuit joined in.
    pub fn list_bookmarks(&self, user_id: &str) -> ServiceResult<Vec<BookmarkView>> {
        self.database.with_repositories(|repos| {
            let rows = repos.bookmarks().list_for_user(user_id)?;
            Ok(rows
                .into_iter()
                .map(|(bookmark, tuit)| BookmarkView {
                    tuit: Reference::Populated(TuitView::from_record(tuit)),
                    ..BookmarkView::from_record(bookmark)
                })
                .collect())
        })
    }

    /// Users who bookmarked `tuit_id`.
    pub fn list_bookmarkers(&self, tuit_id: &str) -> ServiceResult<Vec<BookmarkView>> {
        self.database.with_repositories(|repos| {
            let rows = repos.bookmarks().list_for_tuit(tuit_id)?;
            Ok(rows
                .into_iter()
                .map(|(bookmark, user)| BookmarkView {
                    book_marked_by: Reference::Populated(UserView::from_record(user)),
                    ..BookmarkView::from_record(bookmark)
                })
                .collect())
        })
    }

    pub fn find_bookmark(&self, user_id: &str, tuit_id: &str) -> ServiceResult<Option<BookmarkView>> {
        self.database.with_repositories(|repos| {
            Ok(repos
                .bookmarks()
                .get(user_id, tuit_id)?
                .map(BookmarkView::from_record))
        })
    }

    /// Bookmarks `tuit_id` for `user_id`; repeating the call is a no-op that
    /// returns the stored bookmark.
    pub fn bookmark(&self, user_id: &str, tuit_id: &str) -> ServiceResult<BookmarkView> {
        let candidate = BookmarkRecord {
            id: Uuid::new_v4().to_string(),
            tuit_id: tuit_id.to_string(),
            bookmarked_by: user_id.to_string(),
            bookmarked_on: now_utc_iso(),
        };
        let record = self.database.with_transaction(|repos| {
            if repos.users().get(user_id)?.is_none() {
                return Err(ServiceError::not_found("user", user_id));
            }
            if repos.tuits().get(tuit_id)?.is_none() {
                return Err(ServiceError::not_found("tuit", tuit_id));
            }
            let bookmarks = repos.bookmarks();
            if bookmarks.create_if_absent(&candidate)? {
                tracing::debug!(user_id, tuit_id, "tuit bookmarked");
            }
            let record = bookmarks
                .get(user_id, tuit_id)?
                .context("bookmark missing right after insert")?;
            Ok(record)
        })?;
        Ok(BookmarkView::from_record(record))
    }

    pub fn unbookmark(&self, user_id: &str, tuit_id: &str) -> ServiceResult<DeleteStatus> {
        let deleted = self.database.with_repositories(|repos| {
            Ok::<_, ServiceError>(repos.bookmarks().delete(user_id, tuit_id)?)
        })?;
        Ok(DeleteStatus::deleted(deleted))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkView {
    #[serde(rename = "_id")]
    pub id: String,
    pub tuit: Reference<TuitView>,
    pub book_marked_by: Reference<UserView>,
    pub book_marked_on: String,
}

impl BookmarkView {
    fn from_record(record: BookmarkRecord) -> Self {
        Self {
            id: record.id,
            tuit: Reference::Id(record.tuit_id),
            book_marked_by: Reference::Id(record.bookmarked_by),
            book_marked_on: record.bookmarked_on,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuits::tests::post;
    use crate::tuits::TuitService;
    use crate::users::tests::{new_user, setup_db};
    use crate::users::UserService;

    #[test]
    fn bookmarking_twice_stores_one_record() {
        let db = setup_db();
        let users = UserService::new(db.clone());
        let tuits = TuitService::new(db.clone());
        let bookmarks = BookmarkService::new(db);
        let alice = users.create_user(new_user("alice")).unwrap();
        let tuit = post(&tuits, &alice.id, "save me", "2024-01-01T00:00:00Z");

        let first = bookmarks.bookmark(&alice.id, &tuit.id).unwrap();
        let second = bookmarks.bookmark(&alice.id, &tuit.id).unwrap();
        assert_eq!(first.id, second.id);

        let listed = bookmarks.list_bookmarks(&alice.id).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(
            listed[0].tuit.populated().map(|t| t.tuit.as_str()),
            Some("save me")
        );

        let bookmarkers = bookmarks.list_bookmarkers(&tuit.id).unwrap();
        assert_eq!(bookmarkers.len(), 1);
        assert_eq!(
            bookmarkers[0].book_marked_by.populated().map(|u| u.id.as_str()),
            Some(alice.id.as_str())
        );
    }

    #[test]
    fn unbookmark_reports_zero_when_absent() {
        let db = setup_db();
        let users = UserService::new(db.clone());
        let tuits = TuitService::new(db.clone());
        let bookmarks = BookmarkService::new(db);
        let alice = users.create_user(new_user("alice")).unwrap();
        let tuit = post(&tuits, &alice.id, "hi", "2024-01-01T00:00:00Z");

        assert_eq!(bookmarks.unbookmark(&alice.id, &tuit.id).unwrap().deleted_count, 0);
        bookmarks.bookmark(&alice.id, &tuit.id).unwrap();
        assert_eq!(bookmarks.unbookmark(&alice.id, &tuit.id).unwrap().deleted_count, 1);
        assert!(bookmarks.find_bookmark(&alice.id, &tuit.id).unwrap().is_none());
    }

    #[test]
    fn unknown_tuit_is_not_found() {
        let db = setup_db();
        let users = UserService::new(db.clone());
        let bookmarks = BookmarkService::new(db);
        let alice = users.create_user(new_user("alice")).unwrap();
        assert!(matches!(
            bookmarks.bookmark(&alice.id, "ghost").unwrap_err(),
            ServiceError::NotFound(_)
        ));
    }
}
