//! Optional example data, created through the services so every rule applies.

use blog_common::model::{
    ModelValidationError,
    post::{PostBody, PostContent, PostTitle},
    user::{UserContent, Username},
};
use blog_core::{PostService, ServiceError, UserService};
use thiserror::Error;
use tracing::{debug, info};

pub const EXAMPLE_USERNAME: &str = "pa6ata";
pub const EXAMPLE_TITLE: &str = "Po Gore6toto";
pub const EXAMPLE_BODY: &str = "Da se nahusva6 ot zlove6toto";

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Example data is invalid: {0}")]
    Invalid(#[from] ModelValidationError),
    #[error("Could not store example data: {0}")]
    Service(#[from] ServiceError),
}

/// Creates the example user and their post. Data that already exists is left alone, so this can
/// run on every startup.
pub async fn seed_example_data(users: &UserService, posts: &PostService) -> Result<(), SeedError> {
    let user = UserContent {
        username: Username::new(EXAMPLE_USERNAME)?,
    };
    let author = match users.create_user(user).await {
        Ok(author) => author,
        Err(ServiceError::UsernameNotUnique(username)) => {
            debug!(%username, "Example user already exists, skipping seeding");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    let content = PostContent {
        title: PostTitle::new(EXAMPLE_TITLE)?,
        body: PostBody::new(EXAMPLE_BODY)?,
    };
    match posts.create_post(content, author.id).await {
        Ok(post) => info!(post_id = %post.id, author_id = %author.id, "Seeded example data"),
        Err(ServiceError::TitleNotUnique(title)) => {
            debug!(%title, "Example post already exists");
        }
        Err(err) => return Err(err.into()),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::seed::{EXAMPLE_TITLE, EXAMPLE_USERNAME, seed_example_data};
    use blog_core::{PostService, UserService};
    use blog_db::MemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn seeding_twice_creates_one_user_and_one_post() {
        let store = Arc::new(MemoryStore::new());
        let users = UserService::new(store.clone(), store.clone());
        let posts = PostService::new(store.clone(), store);

        seed_example_data(&users, &posts).await.unwrap();
        seed_example_data(&users, &posts).await.unwrap();

        let all_users = users.list_users().await.unwrap();
        assert_eq!(all_users.len(), 1);
        assert_eq!(all_users[0].id.get(), 1);
        assert_eq!(all_users[0].username.get(), EXAMPLE_USERNAME);

        let all_posts = posts.list_posts().await.unwrap();
        assert_eq!(all_posts.len(), 1);
        assert_eq!(all_posts[0].content.title.get(), EXAMPLE_TITLE);
        assert_eq!(all_posts[0].author, all_users[0]);
    }
}
