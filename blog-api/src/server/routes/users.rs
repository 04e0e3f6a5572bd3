use crate::server::{
    Result, ServerError, ServerRouter,
    json::{Created, Json},
    payload::UserPayload,
};
use axum::{extract::State, http::StatusCode};
use axum_extra::routing::{RouterExt, TypedPath};
use blog_common::model::{
    Id,
    post::Post,
    user::{User, UserMarker},
};
use blog_core::UserService;
use serde::Deserialize;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(list_users)
        .typed_post(create_user)
        .typed_get(get_user)
        .typed_put(update_user)
        .typed_delete(delete_user)
        .typed_get(list_user_posts)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/users", rejection(ServerError))]
struct UsersPath();

async fn list_users(
    UsersPath(): UsersPath,
    State(users): State<UserService>,
) -> Result<Json<Vec<User>>> {
    Ok(Json(users.list_users().await?))
}

async fn create_user(
    UsersPath(): UsersPath,
    State(users): State<UserService>,
    Json(payload): Json<UserPayload>,
) -> Result<Created<User>> {
    let content = payload.validate()?;

    Ok(Created(users.create_user(content).await?))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/users/{id}", rejection(ServerError))]
struct UserPath {
    id: Id<UserMarker>,
}

async fn get_user(
    UserPath { id }: UserPath,
    State(users): State<UserService>,
) -> Result<Json<User>> {
    Ok(Json(users.get_user(id).await?))
}

async fn update_user(
    UserPath { id }: UserPath,
    State(users): State<UserService>,
    Json(payload): Json<UserPayload>,
) -> Result<Json<User>> {
    let content = payload.validate()?;

    Ok(Json(users.update_user(id, content).await?))
}

async fn delete_user(
    UserPath { id }: UserPath,
    State(users): State<UserService>,
) -> Result<StatusCode> {
    users.delete_user(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/users/{id}/posts", rejection(ServerError))]
struct UserPostsPath {
    id: Id<UserMarker>,
}

async fn list_user_posts(
    UserPostsPath { id }: UserPostsPath,
    State(users): State<UserService>,
) -> Result<Json<Vec<Post>>> {
    Ok(Json(users.list_user_posts(id).await?))
}
