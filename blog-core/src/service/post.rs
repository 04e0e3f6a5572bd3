use crate::{
    error::{Result, ServiceError},
    storage::{PostRepository, StorageError, UserRepository},
};
use blog_common::model::{
    Id,
    post::{CreatePost, EditPost, Post, PostContent, PostMarker},
    user::UserMarker,
};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone)]
pub struct PostService {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
}

impl PostService {
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self { users, posts }
    }

    pub async fn get_post(&self, id: Id<PostMarker>) -> Result<Post> {
        self.posts
            .fetch_post(id)
            .await?
            .ok_or(ServiceError::PostNotFound(id))
    }

    pub async fn list_posts(&self) -> Result<Vec<Post>> {
        Ok(self.posts.fetch_posts().await?)
    }

    /// Publishes a post for an existing author.
    ///
    /// The author is resolved before the title is checked, so a missing author is reported even
    /// when the title is also taken.
    pub async fn create_post(
        &self,
        content: PostContent,
        author_id: Id<UserMarker>,
    ) -> Result<Post> {
        let author = self
            .users
            .fetch_user(author_id)
            .await?
            .ok_or(ServiceError::UserNotFound(author_id))?;

        if self
            .posts
            .fetch_post_by_title(&content.title)
            .await?
            .is_some()
        {
            return Err(ServiceError::TitleNotUnique(content.title));
        }

        let post = CreatePost {
            author: author.id,
            content,
        };
        let created = match self.posts.create_post(&post).await {
            Ok(created) => created,
            Err(StorageError::Conflict) => {
                return Err(ServiceError::TitleNotUnique(post.content.title));
            }
            Err(StorageError::MissingReference) => {
                return Err(ServiceError::UserNotFound(author_id));
            }
            Err(err) => return Err(err.into()),
        };

        info!(post_id = %created.id, author_id = %author.id, "Created post");
        Ok(created)
    }

    /// Replaces title and body of the post named by `edit.id`. The author never changes, and
    /// the new title is not checked against other posts before the write.
    pub async fn edit_post(&self, edit: EditPost) -> Result<Post> {
        let existing = self.get_post(edit.id).await?;

        match self.posts.update_post(existing.id, &edit.content).await {
            Ok(Some(updated)) => Ok(updated),
            Ok(None) => Err(ServiceError::PostNotFound(edit.id)),
            Err(StorageError::Conflict) => Err(ServiceError::TitleNotUnique(edit.content.title)),
            Err(err) => Err(err.into()),
        }
    }

    /// Deleting an unknown id does nothing.
    pub async fn delete_post(&self, id: Id<PostMarker>) -> Result<()> {
        let Some(post) = self.posts.fetch_post(id).await? else {
            debug!(post_id = %id, "Post to delete does not exist");
            return Ok(());
        };

        self.posts.delete_post(post.id).await?;

        info!(post_id = %post.id, "Deleted post");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        error::ServiceError,
        service::post::PostService,
        storage::{MockPostRepository, MockUserRepository, StorageError},
    };
    use blog_common::model::{
        Id,
        post::{EditPost, Post, PostBody, PostContent, PostTitle},
        user::{User, Username},
    };
    use mockall::predicate::eq;
    use std::sync::Arc;

    const TITLE: &str = "Po Gore6toto";
    const BODY: &str = "Da se nahusva6 ot zlove6toto";

    fn service(users: MockUserRepository, posts: MockPostRepository) -> PostService {
        PostService::new(Arc::new(users), Arc::new(posts))
    }

    fn author(id: u64) -> User {
        User {
            id: id.into(),
            username: Username::new("pa6ata").unwrap(),
        }
    }

    fn content(title: &str, body: &str) -> PostContent {
        PostContent {
            title: PostTitle::new(title).unwrap(),
            body: PostBody::new(body).unwrap(),
        }
    }

    fn post(id: u64, author_id: u64, title: &str, body: &str) -> Post {
        Post {
            id: id.into(),
            content: content(title, body),
            author: author(author_id),
        }
    }

    #[tokio::test]
    async fn create_post_attaches_resolved_author() {
        let mut users = MockUserRepository::new();
        let mut posts = MockPostRepository::new();
        users
            .expect_fetch_user()
            .with(eq(Id::new(1)))
            .returning(|id| Ok(Some(author(id.get()))));
        posts.expect_fetch_post_by_title().returning(|_| Ok(None));
        posts
            .expect_create_post()
            .withf(|create| create.author.get() == 1 && create.content.title.get() == TITLE)
            .times(1)
            .returning(|create| {
                Ok(Post {
                    id: Id::new(7),
                    content: create.content.clone(),
                    author: author(create.author.get()),
                })
            });

        let created = service(users, posts)
            .create_post(content(TITLE, BODY), Id::new(1))
            .await
            .unwrap();

        assert_eq!(created.author, author(1));
        assert_eq!(created.content, content(TITLE, BODY));
    }

    #[tokio::test]
    async fn create_post_checks_author_before_title() {
        let mut users = MockUserRepository::new();
        let mut posts = MockPostRepository::new();
        users.expect_fetch_user().returning(|_| Ok(None));
        posts.expect_fetch_post_by_title().times(0);
        posts.expect_create_post().times(0);

        let result = service(users, posts)
            .create_post(content(TITLE, BODY), Id::new(2))
            .await;

        assert!(matches!(result, Err(ServiceError::UserNotFound(id)) if id.get() == 2));
    }

    #[tokio::test]
    async fn create_post_rejects_taken_title() {
        let mut users = MockUserRepository::new();
        let mut posts = MockPostRepository::new();
        users
            .expect_fetch_user()
            .returning(|id| Ok(Some(author(id.get()))));
        posts
            .expect_fetch_post_by_title()
            .withf(|title| title.get() == TITLE)
            .returning(|_| Ok(Some(post(1, 1, TITLE, BODY))));
        posts.expect_create_post().times(0);

        let result = service(users, posts)
            .create_post(content(TITLE, "another body"), Id::new(1))
            .await;

        assert!(matches!(result, Err(ServiceError::TitleNotUnique(title)) if title.get() == TITLE));
    }

    #[tokio::test]
    async fn create_post_maps_storage_failures() {
        for (storage_error, expect_user_not_found) in [
            (StorageError::Conflict, false),
            (StorageError::MissingReference, true),
        ] {
            let mut users = MockUserRepository::new();
            let mut posts = MockPostRepository::new();
            users
                .expect_fetch_user()
                .returning(|id| Ok(Some(author(id.get()))));
            posts.expect_fetch_post_by_title().returning(|_| Ok(None));
            posts
                .expect_create_post()
                .return_once(move |_| Err(storage_error));

            let result = service(users, posts)
                .create_post(content(TITLE, BODY), Id::new(1))
                .await;

            if expect_user_not_found {
                assert!(matches!(result, Err(ServiceError::UserNotFound(_))));
            } else {
                assert!(matches!(result, Err(ServiceError::TitleNotUnique(_))));
            }
        }
    }

    #[tokio::test]
    async fn edit_post_keeps_author_and_skips_title_lookup() {
        let mut posts = MockPostRepository::new();
        posts
            .expect_fetch_post()
            .returning(|id| Ok(Some(post(id.get(), 1, TITLE, BODY))));
        posts.expect_fetch_post_by_title().times(0);
        posts
            .expect_update_post()
            .withf(|id, content| id.get() == 4 && content.title.get() == "New title")
            .times(1)
            .returning(|id, content| {
                Ok(Some(Post {
                    id,
                    content: content.clone(),
                    author: author(1),
                }))
            });

        let edited = service(MockUserRepository::new(), posts)
            .edit_post(EditPost {
                id: Id::new(4),
                content: content("New title", "New body"),
            })
            .await
            .unwrap();

        assert_eq!(edited, post(4, 1, "New title", "New body"));
    }

    #[tokio::test]
    async fn edit_post_reports_missing_post() {
        let mut posts = MockPostRepository::new();
        posts.expect_fetch_post().returning(|_| Ok(None));
        posts.expect_update_post().times(0);

        let result = service(MockUserRepository::new(), posts)
            .edit_post(EditPost {
                id: Id::new(4),
                content: content(TITLE, BODY),
            })
            .await;

        assert!(matches!(result, Err(ServiceError::PostNotFound(id)) if id.get() == 4));
    }

    #[tokio::test]
    async fn edit_post_surfaces_storage_conflict() {
        let mut posts = MockPostRepository::new();
        posts
            .expect_fetch_post()
            .returning(|id| Ok(Some(post(id.get(), 1, TITLE, BODY))));
        posts
            .expect_update_post()
            .returning(|_, _| Err(StorageError::Conflict));

        let result = service(MockUserRepository::new(), posts)
            .edit_post(EditPost {
                id: Id::new(4),
                content: content("Taken", BODY),
            })
            .await;

        assert!(matches!(
            result,
            Err(ServiceError::TitleNotUnique(title)) if title.get() == "Taken"
        ));
    }

    #[tokio::test]
    async fn get_post_reports_missing_post() {
        let mut posts = MockPostRepository::new();
        posts.expect_fetch_post().returning(|_| Ok(None));

        let result = service(MockUserRepository::new(), posts)
            .get_post(Id::new(8))
            .await;

        assert!(matches!(result, Err(ServiceError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn delete_missing_post_is_a_no_op() {
        let mut posts = MockPostRepository::new();
        posts.expect_fetch_post().returning(|_| Ok(None));
        posts.expect_delete_post().times(0);

        service(MockUserRepository::new(), posts)
            .delete_post(Id::new(8))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn delete_existing_post() {
        let mut posts = MockPostRepository::new();
        posts
            .expect_fetch_post()
            .returning(|id| Ok(Some(post(id.get(), 1, TITLE, BODY))));
        posts
            .expect_delete_post()
            .with(eq(Id::new(8)))
            .times(1)
            .returning(|_| Ok(()));

        service(MockUserRepository::new(), posts)
            .delete_post(Id::new(8))
            .await
            .unwrap();
    }
}
