//! Domain services for the blog: the rules that hold between users and posts, written against
//! the storage ports in [`storage`].

pub mod error;
pub mod service;
pub mod storage;

pub use error::{FailureKind, ServiceError};
pub use service::{post::PostService, user::UserService};
