use crate::storage::StorageError;
use blog_common::model::{
    Id,
    post::{PostMarker, PostTitle},
    user::{UserMarker, Username},
};
use thiserror::Error;

pub type Result<T, E = ServiceError> = std::result::Result<T, E>;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub enum FailureKind {
    NotFound,
    NotUnique,
    /// Not a domain failure: storage broke underneath the service.
    Internal,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("User with id:{0} not found.")]
    UserNotFound(Id<UserMarker>),
    #[error("Post with id:{0} not found.")]
    PostNotFound(Id<PostMarker>),
    #[error("User with name {0} already exists")]
    UsernameNotUnique(Username),
    #[error("Post with title '{0}' already exists")]
    TitleNotUnique(PostTitle),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ServiceError {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            ServiceError::UserNotFound(_) | ServiceError::PostNotFound(_) => FailureKind::NotFound,
            ServiceError::UsernameNotUnique(_) | ServiceError::TitleNotUnique(_) => {
                FailureKind::NotUnique
            }
            ServiceError::Storage(_) => FailureKind::Internal,
        }
    }
}
