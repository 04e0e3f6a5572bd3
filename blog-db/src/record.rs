use blog_common::model::{
    ModelValidationError,
    post::{Post, PostBody, PostContent, PostTitle},
    user::{User, Username},
};
use sqlx::FromRow;

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, FromRow)]
pub(crate) struct UserRecord {
    pub user_id: i64,
    pub username: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, FromRow)]
pub(crate) struct FullPostRecord {
    pub post_id: i64,
    pub title: String,
    pub body: String,
    pub user_id: i64,
    pub username: String,
}

impl TryFrom<UserRecord> for User {
    type Error = ModelValidationError;

    fn try_from(value: UserRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.user_id.cast_unsigned().into(),
            username: Username::new(value.username)?,
        })
    }
}

impl TryFrom<FullPostRecord> for Post {
    type Error = ModelValidationError;

    fn try_from(value: FullPostRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.post_id.cast_unsigned().into(),
            content: PostContent {
                title: PostTitle::new(value.title)?,
                body: PostBody::new(value.body)?,
            },
            author: User {
                id: value.user_id.cast_unsigned().into(),
                username: Username::new(value.username)?,
            },
        })
    }
}
