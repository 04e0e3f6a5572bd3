use crate::server::{
    Result, ServerError, ServerRouter,
    json::{Created, Json},
    payload::{EditPostPayload, PostPayload},
};
use axum::{extract::State, http::StatusCode};
use axum_extra::routing::{RouterExt, TypedPath};
use blog_common::model::{
    Id,
    post::{Post, PostMarker},
    user::UserMarker,
};
use blog_core::PostService;
use serde::Deserialize;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(list_posts)
        .typed_get(get_post)
        .typed_post(create_post)
        .typed_put(edit_post)
        .typed_delete(delete_post)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts", rejection(ServerError))]
struct PostsPath();

async fn list_posts(
    PostsPath(): PostsPath,
    State(posts): State<PostService>,
) -> Result<Json<Vec<Post>>> {
    Ok(Json(posts.list_posts().await?))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}", rejection(ServerError))]
struct PostPath {
    id: Id<PostMarker>,
}

async fn get_post(
    PostPath { id }: PostPath,
    State(posts): State<PostService>,
) -> Result<Json<Post>> {
    Ok(Json(posts.get_post(id).await?))
}

async fn edit_post(
    PostPath { id }: PostPath,
    State(posts): State<PostService>,
    Json(payload): Json<EditPostPayload>,
) -> Result<Json<Post>> {
    let edit = payload.validate(id)?;

    Ok(Json(posts.edit_post(edit).await?))
}

async fn delete_post(
    PostPath { id }: PostPath,
    State(posts): State<PostService>,
) -> Result<StatusCode> {
    posts.delete_post(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Shares its pattern with [`PostPath`], but the segment names the author.
#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}", rejection(ServerError))]
struct CreatePostPath {
    id: Id<UserMarker>,
}

async fn create_post(
    CreatePostPath { id: author_id }: CreatePostPath,
    State(posts): State<PostService>,
    Json(payload): Json<PostPayload>,
) -> Result<Created<Post>> {
    let content = payload.validate()?;

    Ok(Created(posts.create_post(content, author_id).await?))
}
