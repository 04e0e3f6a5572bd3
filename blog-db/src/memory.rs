//! In-process storage, used when no database is configured and in tests.

use async_trait::async_trait;
use blog_common::model::{
    Id,
    post::{CreatePost, Post, PostContent, PostMarker, PostTitle},
    user::{User, UserContent, UserMarker, Username},
};
use blog_core::storage::{PostRepository, StorageError, UserRepository};
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// Keeps users and posts in memory behind a single lock, so every check and the write it guards
/// happen atomically. Ids count up from 1 and are never reused.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    last_user_id: u64,
    last_post_id: u64,
    users: BTreeMap<Id<UserMarker>, Username>,
    posts: BTreeMap<Id<PostMarker>, PostRow>,
}

#[derive(Debug)]
struct PostRow {
    author: Id<UserMarker>,
    content: PostContent,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl State {
    fn user(&self, id: Id<UserMarker>) -> Option<User> {
        self.users.get(&id).map(|username| User {
            id,
            username: username.clone(),
        })
    }

    fn post(&self, id: Id<PostMarker>) -> Option<Post> {
        let row = self.posts.get(&id)?;
        let author = self.user(row.author)?;

        Some(Post {
            id,
            content: row.content.clone(),
            author,
        })
    }

    fn username_taken(&self, username: &Username, except: Option<Id<UserMarker>>) -> bool {
        self.users
            .iter()
            .any(|(id, taken)| taken == username && Some(*id) != except)
    }

    fn title_taken(&self, title: &PostTitle, except: Option<Id<PostMarker>>) -> bool {
        self.posts
            .iter()
            .any(|(id, row)| &row.content.title == title && Some(*id) != except)
    }

    fn posts_where(&self, mut predicate: impl FnMut(&PostRow) -> bool) -> Vec<Post> {
        self.posts
            .iter()
            .filter(|&(_, row)| predicate(row))
            .filter_map(|(id, _)| self.post(*id))
            .collect()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn fetch_users(&self) -> Result<Vec<User>, StorageError> {
        let state = self.state.lock();

        Ok(state
            .users
            .keys()
            .filter_map(|id| state.user(*id))
            .collect())
    }

    async fn fetch_user(&self, id: Id<UserMarker>) -> Result<Option<User>, StorageError> {
        Ok(self.state.lock().user(id))
    }

    async fn fetch_user_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, StorageError> {
        let state = self.state.lock();

        Ok(state
            .users
            .iter()
            .find(|(_, taken)| *taken == username)
            .map(|(id, username)| User {
                id: *id,
                username: username.clone(),
            }))
    }

    async fn create_user(&self, user: &UserContent) -> Result<User, StorageError> {
        let mut state = self.state.lock();
        if state.username_taken(&user.username, None) {
            return Err(StorageError::Conflict);
        }

        state.last_user_id += 1;
        let id = Id::new(state.last_user_id);
        state.users.insert(id, user.username.clone());

        Ok(User {
            id,
            username: user.username.clone(),
        })
    }

    async fn update_user(&self, user: &User) -> Result<Option<User>, StorageError> {
        let mut state = self.state.lock();
        if !state.users.contains_key(&user.id) {
            return Ok(None);
        }
        if state.username_taken(&user.username, Some(user.id)) {
            return Err(StorageError::Conflict);
        }

        state.users.insert(user.id, user.username.clone());
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: Id<UserMarker>) -> Result<(), StorageError> {
        let mut state = self.state.lock();
        state.posts.retain(|_, row| row.author != id);
        state.users.remove(&id);

        Ok(())
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn fetch_posts(&self) -> Result<Vec<Post>, StorageError> {
        Ok(self.state.lock().posts_where(|_| true))
    }

    async fn fetch_post(&self, id: Id<PostMarker>) -> Result<Option<Post>, StorageError> {
        Ok(self.state.lock().post(id))
    }

    async fn fetch_post_by_title(&self, title: &PostTitle) -> Result<Option<Post>, StorageError> {
        Ok(self
            .state
            .lock()
            .posts_where(|row| &row.content.title == title)
            .pop())
    }

    async fn fetch_user_posts(&self, author: Id<UserMarker>) -> Result<Vec<Post>, StorageError> {
        Ok(self.state.lock().posts_where(|row| row.author == author))
    }

    async fn create_post(&self, post: &CreatePost) -> Result<Post, StorageError> {
        let mut state = self.state.lock();
        let Some(author) = state.user(post.author) else {
            return Err(StorageError::MissingReference);
        };
        if state.title_taken(&post.content.title, None) {
            return Err(StorageError::Conflict);
        }

        state.last_post_id += 1;
        let id = Id::new(state.last_post_id);
        state.posts.insert(
            id,
            PostRow {
                author: author.id,
                content: post.content.clone(),
            },
        );

        Ok(Post {
            id,
            content: post.content.clone(),
            author,
        })
    }

    async fn update_post(
        &self,
        id: Id<PostMarker>,
        content: &PostContent,
    ) -> Result<Option<Post>, StorageError> {
        let mut state = self.state.lock();
        if !state.posts.contains_key(&id) {
            return Ok(None);
        }
        if state.title_taken(&content.title, Some(id)) {
            return Err(StorageError::Conflict);
        }

        if let Some(row) = state.posts.get_mut(&id) {
            row.content = content.clone();
        }
        Ok(state.post(id))
    }

    async fn delete_post(&self, id: Id<PostMarker>) -> Result<(), StorageError> {
        self.state.lock().posts.remove(&id);

        Ok(())
    }
}
