use crate::record::{FullPostRecord, UserRecord};
use async_trait::async_trait;
use blog_common::model::{
    Id, ModelValidationError,
    post::{CreatePost, Post, PostContent, PostMarker, PostTitle},
    user::{User, UserContent, UserMarker, Username},
};
use blog_core::storage::{PostRepository, StorageError, UserRepository};
use sqlx::{PgPool, migrate::Migrator, postgres::PgPoolOptions, query, query_as};
use thiserror::Error;
use tracing::{debug, info};

pub type Result<T, E = DbError> = std::result::Result<T, E>;

static MIGRATOR: Migrator = sqlx::migrate!();

#[derive(Debug, Error)]
pub enum DbError {
    #[error("An object in the database was invalid: {0}")]
    Data(#[from] ModelValidationError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error("Running migrations failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Sqlx(sqlx::Error::Database(err)) if err.is_unique_violation() => {
                StorageError::Conflict
            }
            DbError::Sqlx(sqlx::Error::Database(err)) if err.is_foreign_key_violation() => {
                StorageError::MissingReference
            }
            other => StorageError::backend(other),
        }
    }
}

/// `PostgreSQL` storage. Uniqueness of usernames and titles, the post author reference, and the
/// cascade from users to posts are all enforced by the schema in `migrations/`.
#[derive(Clone, Debug)]
pub struct DbClient {
    pool: PgPool,
}

impl DbClient {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        debug!(max_connections, "Connected to database");

        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await?;
        info!("Database migrations are up to date");

        Ok(())
    }

    async fn fetch_users(&self) -> Result<Vec<User>> {
        let records = query_as::<_, UserRecord>(
            "
            SELECT
                users.user_id,
                users.username
            FROM
                users
            ORDER BY
                users.user_id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        let users = records
            .into_iter()
            .map(User::try_from)
            .collect::<Result<_, _>>()?;
        Ok(users)
    }

    async fn fetch_user(&self, user_id: Id<UserMarker>) -> Result<Option<User>> {
        let record = query_as::<_, UserRecord>(
            "
            SELECT
                users.user_id,
                users.username
            FROM
                users
            WHERE
                users.user_id = $1
            ",
        )
        .bind(user_id.get().cast_signed())
        .fetch_optional(&self.pool)
        .await?;

        let user = record.map(User::try_from).transpose()?;
        Ok(user)
    }

    async fn fetch_user_by_username(&self, username: &Username) -> Result<Option<User>> {
        let record = query_as::<_, UserRecord>(
            "
            SELECT
                users.user_id,
                users.username
            FROM
                users
            WHERE
                users.username = $1
            ",
        )
        .bind(username.get())
        .fetch_optional(&self.pool)
        .await?;

        let user = record.map(User::try_from).transpose()?;
        Ok(user)
    }

    async fn create_user(&self, user: &UserContent) -> Result<User> {
        let record = query_as::<_, UserRecord>(
            "
            INSERT INTO users (username)
            VALUES ($1)
            RETURNING user_id, username
            ",
        )
        .bind(user.username.get())
        .fetch_one(&self.pool)
        .await?;

        Ok(record.try_into()?)
    }

    async fn update_user(&self, user: &User) -> Result<Option<User>> {
        let record = query_as::<_, UserRecord>(
            "
            UPDATE users
            SET username = $2
            WHERE user_id = $1
            RETURNING user_id, username
            ",
        )
        .bind(user.id.get().cast_signed())
        .bind(user.username.get())
        .fetch_optional(&self.pool)
        .await?;

        let user = record.map(User::try_from).transpose()?;
        Ok(user)
    }

    async fn delete_user(&self, user_id: Id<UserMarker>) -> Result<()> {
        query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id.get().cast_signed())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn fetch_posts(&self) -> Result<Vec<Post>> {
        let records = query_as::<_, FullPostRecord>(
            "
            SELECT
                posts.post_id,
                posts.title,
                posts.body,
                users.user_id,
                users.username
            FROM
                posts NATURAL JOIN users
            ORDER BY
                posts.post_id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        let posts = records
            .into_iter()
            .map(Post::try_from)
            .collect::<Result<_, _>>()?;
        Ok(posts)
    }

    async fn fetch_post(&self, post_id: Id<PostMarker>) -> Result<Option<Post>> {
        let record = query_as::<_, FullPostRecord>(
            "
            SELECT
                posts.post_id,
                posts.title,
                posts.body,
                users.user_id,
                users.username
            FROM
                posts NATURAL JOIN users
            WHERE
                posts.post_id = $1
            ",
        )
        .bind(post_id.get().cast_signed())
        .fetch_optional(&self.pool)
        .await?;

        let post = record.map(Post::try_from).transpose()?;
        Ok(post)
    }

    async fn fetch_post_by_title(&self, title: &PostTitle) -> Result<Option<Post>> {
        let record = query_as::<_, FullPostRecord>(
            "
            SELECT
                posts.post_id,
                posts.title,
                posts.body,
                users.user_id,
                users.username
            FROM
                posts NATURAL JOIN users
            WHERE
                posts.title = $1
            ",
        )
        .bind(title.get())
        .fetch_optional(&self.pool)
        .await?;

        let post = record.map(Post::try_from).transpose()?;
        Ok(post)
    }

    async fn fetch_user_posts(&self, user_id: Id<UserMarker>) -> Result<Vec<Post>> {
        let records = query_as::<_, FullPostRecord>(
            "
            SELECT
                posts.post_id,
                posts.title,
                posts.body,
                users.user_id,
                users.username
            FROM
                posts NATURAL JOIN users
            WHERE
                users.user_id = $1
            ORDER BY
                posts.post_id
            ",
        )
        .bind(user_id.get().cast_signed())
        .fetch_all(&self.pool)
        .await?;

        let posts = records
            .into_iter()
            .map(Post::try_from)
            .collect::<Result<_, _>>()?;
        Ok(posts)
    }

    async fn create_post(&self, post: &CreatePost) -> Result<Post> {
        let record = query_as::<_, FullPostRecord>(
            "
            WITH inserted AS (
                INSERT INTO posts (title, body, user_id)
                VALUES ($1, $2, $3)
                RETURNING post_id, title, body, user_id
            )
            SELECT
                inserted.post_id,
                inserted.title,
                inserted.body,
                users.user_id,
                users.username
            FROM
                inserted NATURAL JOIN users
            ",
        )
        .bind(post.content.title.get())
        .bind(post.content.body.get())
        .bind(post.author.get().cast_signed())
        .fetch_one(&self.pool)
        .await?;

        Ok(record.try_into()?)
    }

    async fn update_post(
        &self,
        post_id: Id<PostMarker>,
        content: &PostContent,
    ) -> Result<Option<Post>> {
        let record = query_as::<_, FullPostRecord>(
            "
            WITH updated AS (
                UPDATE posts
                SET title = $2, body = $3
                WHERE post_id = $1
                RETURNING post_id, title, body, user_id
            )
            SELECT
                updated.post_id,
                updated.title,
                updated.body,
                users.user_id,
                users.username
            FROM
                updated NATURAL JOIN users
            ",
        )
        .bind(post_id.get().cast_signed())
        .bind(content.title.get())
        .bind(content.body.get())
        .fetch_optional(&self.pool)
        .await?;

        let post = record.map(Post::try_from).transpose()?;
        Ok(post)
    }

    async fn delete_post(&self, post_id: Id<PostMarker>) -> Result<()> {
        query("DELETE FROM posts WHERE post_id = $1")
            .bind(post_id.get().cast_signed())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl UserRepository for DbClient {
    async fn fetch_users(&self) -> Result<Vec<User>, StorageError> {
        Ok(DbClient::fetch_users(self).await?)
    }

    async fn fetch_user(&self, id: Id<UserMarker>) -> Result<Option<User>, StorageError> {
        Ok(DbClient::fetch_user(self, id).await?)
    }

    async fn fetch_user_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, StorageError> {
        Ok(DbClient::fetch_user_by_username(self, username).await?)
    }

    async fn create_user(&self, user: &UserContent) -> Result<User, StorageError> {
        Ok(DbClient::create_user(self, user).await?)
    }

    async fn update_user(&self, user: &User) -> Result<Option<User>, StorageError> {
        Ok(DbClient::update_user(self, user).await?)
    }

    async fn delete_user(&self, id: Id<UserMarker>) -> Result<(), StorageError> {
        Ok(DbClient::delete_user(self, id).await?)
    }
}

#[async_trait]
impl PostRepository for DbClient {
    async fn fetch_posts(&self) -> Result<Vec<Post>, StorageError> {
        Ok(DbClient::fetch_posts(self).await?)
    }

    async fn fetch_post(&self, id: Id<PostMarker>) -> Result<Option<Post>, StorageError> {
        Ok(DbClient::fetch_post(self, id).await?)
    }

    async fn fetch_post_by_title(&self, title: &PostTitle) -> Result<Option<Post>, StorageError> {
        Ok(DbClient::fetch_post_by_title(self, title).await?)
    }

    async fn fetch_user_posts(&self, author: Id<UserMarker>) -> Result<Vec<Post>, StorageError> {
        Ok(DbClient::fetch_user_posts(self, author).await?)
    }

    async fn create_post(&self, post: &CreatePost) -> Result<Post, StorageError> {
        Ok(DbClient::create_post(self, post).await?)
    }

    async fn update_post(
        &self,
        id: Id<PostMarker>,
        content: &PostContent,
    ) -> Result<Option<Post>, StorageError> {
        Ok(DbClient::update_post(self, id, content).await?)
    }

    async fn delete_post(&self, id: Id<PostMarker>) -> Result<(), StorageError> {
        Ok(DbClient::delete_post(self, id).await?)
    }
}
