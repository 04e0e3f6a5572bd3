use crate::{
    error::{Result, ServiceError},
    storage::{PostRepository, StorageError, UserRepository},
};
use blog_common::model::{
    Id,
    post::Post,
    user::{User, UserContent, UserMarker},
};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
}

impl UserService {
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self { users, posts }
    }

    pub async fn get_user(&self, id: Id<UserMarker>) -> Result<User> {
        self.users
            .fetch_user(id)
            .await?
            .ok_or(ServiceError::UserNotFound(id))
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.users.fetch_users().await?)
    }

    pub async fn list_user_posts(&self, id: Id<UserMarker>) -> Result<Vec<Post>> {
        let user = self.get_user(id).await?;

        Ok(self.posts.fetch_user_posts(user.id).await?)
    }

    pub async fn create_user(&self, user: UserContent) -> Result<User> {
        if self
            .users
            .fetch_user_by_username(&user.username)
            .await?
            .is_some()
        {
            return Err(ServiceError::UsernameNotUnique(user.username));
        }

        let created = match self.users.create_user(&user).await {
            Ok(created) => created,
            Err(StorageError::Conflict) => {
                return Err(ServiceError::UsernameNotUnique(user.username));
            }
            Err(err) => return Err(err.into()),
        };

        info!(user_id = %created.id, username = %created.username, "Created user");
        Ok(created)
    }

    /// Replaces the username of an existing user.
    ///
    /// Unlike [`create_user`](Self::create_user) there is no up-front uniqueness check; a
    /// collision is only reported when the storage constraint rejects the write.
    pub async fn update_user(&self, id: Id<UserMarker>, update: UserContent) -> Result<User> {
        let mut user = self.get_user(id).await?;
        user.username = update.username;

        match self.users.update_user(&user).await {
            Ok(Some(updated)) => Ok(updated),
            Ok(None) => Err(ServiceError::UserNotFound(id)),
            Err(StorageError::Conflict) => Err(ServiceError::UsernameNotUnique(user.username)),
            Err(err) => Err(err.into()),
        }
    }

    /// Deletes a user together with all of their posts. Deleting an unknown id does nothing.
    pub async fn delete_user(&self, id: Id<UserMarker>) -> Result<()> {
        let Some(user) = self.users.fetch_user(id).await? else {
            debug!(user_id = %id, "User to delete does not exist");
            return Ok(());
        };

        self.users.delete_user(user.id).await?;

        info!(user_id = %user.id, "Deleted user and their posts");
        Ok(())
    }
}
