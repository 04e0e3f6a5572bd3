use crate::model::{
    Id, non_empty_string,
    user::{User, UserMarker},
};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PostMarker;

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct Post {
    pub id: Id<PostMarker>,
    #[serde(flatten)]
    pub content: PostContent,
    pub author: User,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct PostContent {
    pub title: PostTitle,
    pub body: PostBody,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct CreatePost {
    pub author: Id<UserMarker>,
    pub content: PostContent,
}

/// Replacement title and body for the post with the given id. The author is not editable.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct EditPost {
    pub id: Id<PostMarker>,
    pub content: PostContent,
}

non_empty_string!(
    /// A post title, unique across all posts.
    PostTitle => EmptyTitle
);

non_empty_string!(PostBody => EmptyBody);
