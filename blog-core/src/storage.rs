//! Ports through which the services reach persistent storage.
//!
//! Adapters must enforce username and title uniqueness and the post author reference
//! themselves, reporting violations as [`StorageError::Conflict`] and
//! [`StorageError::MissingReference`]. The services check these invariants before writing, but
//! only the adapter can do so atomically with the write.

use async_trait::async_trait;
use blog_common::model::{
    Id,
    post::{CreatePost, Post, PostContent, PostMarker, PostTitle},
    user::{User, UserContent, UserMarker, Username},
};
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("A uniqueness constraint was violated")]
    Conflict,
    #[error("A referenced entity does not exist")]
    MissingReference,
    #[error("Storage backend failed: {0}")]
    Backend(#[source] BoxError),
}

impl StorageError {
    pub fn backend(error: impl Into<BoxError>) -> Self {
        Self::Backend(error.into())
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// All users, in the order they were created.
    async fn fetch_users(&self) -> Result<Vec<User>, StorageError>;

    async fn fetch_user(&self, id: Id<UserMarker>) -> Result<Option<User>, StorageError>;

    async fn fetch_user_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, StorageError>;

    async fn create_user(&self, user: &UserContent) -> Result<User, StorageError>;

    /// Overwrites the stored user with the same id. Returns `None` if no such user exists.
    async fn update_user(&self, user: &User) -> Result<Option<User>, StorageError>;

    /// Deletes the user and everything they authored as one atomic write.
    async fn delete_user(&self, id: Id<UserMarker>) -> Result<(), StorageError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// All posts, in the order they were created.
    async fn fetch_posts(&self) -> Result<Vec<Post>, StorageError>;

    async fn fetch_post(&self, id: Id<PostMarker>) -> Result<Option<Post>, StorageError>;

    async fn fetch_post_by_title(&self, title: &PostTitle) -> Result<Option<Post>, StorageError>;

    async fn fetch_user_posts(&self, author: Id<UserMarker>) -> Result<Vec<Post>, StorageError>;

    async fn create_post(&self, post: &CreatePost) -> Result<Post, StorageError>;

    /// Overwrites title and body, keeping the author. Returns `None` if no such post exists.
    async fn update_post(
        &self,
        id: Id<PostMarker>,
        content: &PostContent,
    ) -> Result<Option<Post>, StorageError>;

    async fn delete_post(&self, id: Id<PostMarker>) -> Result<(), StorageError>;
}
