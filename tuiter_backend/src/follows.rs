use crate::database::models::FollowRecord;
use crate::database::repositories::{FollowRepository, UserRepository};
use crate::database::Database;
use crate::error::{ServiceError, ServiceResult};
use crate::users::UserView;
use crate::utils::now_utc_iso;
use crate::views::{DeleteStatus, Reference};
use anyhow::Context;
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone)]
pub struct FollowService {
    database: Database,
}

impl FollowService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Users `user_id` follows.
    pub fn list_following(&self, user_id: &str) -> ServiceResult<Vec<FollowView>> {
        self.database.with_repositories(|repos| {
            let rows = repos.follows().list_following(user_id)?;
            Ok(rows
                .into_iter()
                .map(|(follow, followee)| FollowView {
                    user_following: Reference::Populated(UserView::from_record(followee)),
                    ..FollowView::from_record(follow)
                })
                .collect())
        })
    }

    /// Users following `user_id`.
    pub fn list_followers(&self, user_id: &str) -> ServiceResult<Vec<FollowView>> {
        self.database.with_repositories(|repos| {
            let rows = repos.follows().list_followers(user_id)?;
            Ok(rows
                .into_iter()
                .map(|(follow, follower)| FollowView {
                    user_follower: Reference::Populated(UserView::from_record(follower)),
                    ..FollowView::from_record(follow)
                })
                .collect())
        })
    }

    pub fn find_follow(&self, follower_id: &str, followee_id: &str) -> ServiceResult<Option<FollowView>> {
        self.database.with_repositories(|repos| {
            Ok(repos
                .follows()
                .get(follower_id, followee_id)?
                .map(FollowView::from_record))
        })
    }

    /// Records that `follower_id` follows `followee_id`. Following twice
    /// returns the existing relationship instead of creating another.
    pub fn follow(&self, follower_id: &str, followee_id: &str) -> ServiceResult<FollowView> {
        if follower_id == followee_id {
            return Err(ServiceError::Validation("users cannot follow themselves".into()));
        }
        let candidate = FollowRecord {
            id: Uuid::new_v4().to_string(),
            follower_id: follower_id.to_string(),
            followee_id: followee_id.to_string(),
            followed_on: now_utc_iso(),
        };
        let (record, created) = self.database.with_transaction(|repos| {
            for user_id in [follower_id, followee_id] {
                if repos.users().get(user_id)?.is_none() {
                    return Err(ServiceError::not_found("user", user_id));
                }
            }
            let follows = repos.follows();
            let created = follows.create_if_absent(&candidate)?;
            let record = follows
                .get(follower_id, followee_id)?
                .context("follow missing right after insert")?;
            Ok((record, created))
        })?;
        if created {
            tracing::info!(follower_id, followee_id, "user followed");
        }
        Ok(FollowView::from_record(record))
    }

    pub fn unfollow(&self, follower_id: &str, followee_id: &str) -> ServiceResult<DeleteStatus> {
        let deleted = self.database.with_repositories(|repos| {
            Ok::<_, ServiceError>(repos.follows().delete(follower_id, followee_id)?)
        })?;
        Ok(DeleteStatus::deleted(deleted))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowView {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_follower: Reference<UserView>,
    pub user_following: Reference<UserView>,
    pub followed_on: String,
}

impl FollowView {
    fn from_record(record: FollowRecord) -> Self {
        Self {
            id: record.id,
            user_follower: Reference::Id(record.follower_id),
            user_following: Reference::Id(record.followee_id),
            followed_on: record.followed_on,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::tests::{new_user, setup_db};
    use crate::users::UserService;

    #[test]
    fn follow_is_idempotent_and_listed_both_ways() {
        let db = setup_db();
        let users = UserService::new(db.clone());
        let follows = FollowService::new(db);
        let alice = users.create_user(new_user("alice")).unwrap();
        let bob = users.create_user(new_user("bob")).unwrap();

        let first = follows.follow(&alice.id, &bob.id).unwrap();
        let second = follows.follow(&alice.id, &bob.id).unwrap();
        assert_eq!(first.id, second.id);

        let following = follows.list_following(&alice.id).unwrap();
        assert_eq!(following.len(), 1);
        assert_eq!(
            following[0].user_following.populated().map(|u| u.username.as_str()),
            Some("bob")
        );
        assert_eq!(following[0].user_follower, Reference::Id(alice.id.clone()));

        let followers = follows.list_followers(&bob.id).unwrap();
        assert_eq!(followers.len(), 1);
        assert_eq!(
            followers[0].user_follower.populated().map(|u| u.username.as_str()),
            Some("alice")
        );
        assert!(follows.list_followers(&alice.id).unwrap().is_empty());
    }

    #[test]
    fn unfollowing_nothing_is_zero_not_error() {
        let db = setup_db();
        let users = UserService::new(db.clone());
        let follows = FollowService::new(db);
        let alice = users.create_user(new_user("alice")).unwrap();
        let bob = users.create_user(new_user("bob")).unwrap();

        assert_eq!(follows.unfollow(&alice.id, &bob.id).unwrap(), DeleteStatus::deleted(0));
        follows.follow(&alice.id, &bob.id).unwrap();
        assert_eq!(follows.unfollow(&alice.id, &bob.id).unwrap().deleted_count, 1);
        assert!(follows.find_follow(&alice.id, &bob.id).unwrap().is_none());
    }

    #[test]
    fn rejects_self_and_unknown_users() {
        let db = setup_db();
        let users = UserService::new(db.clone());
        let follows = FollowService::new(db);
        let alice = users.create_user(new_user("alice")).unwrap();

        assert!(matches!(
            follows.follow(&alice.id, &alice.id).unwrap_err(),
            ServiceError::Validation(_)
        ));
        assert!(matches!(
            follows.follow(&alice.id, "ghost").unwrap_err(),
            ServiceError::NotFound(_)
        ));
    }
}
