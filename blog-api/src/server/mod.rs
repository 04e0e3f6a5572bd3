use axum::{
    Router,
    extract::{
        FromRef, Request,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use blog_common::model::{Id, ValidationErrors, post::PostMarker};
use blog_core::{
    FailureKind, PostService, ServiceError, UserService,
    storage::{PostRepository, UserRepository},
};
use json::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use time::OffsetDateTime;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

pub mod json;
pub mod payload;
mod routes;

pub type ServerRouter = Router<ServerState>;

#[derive(Clone, FromRef)]
pub struct ServerState {
    pub users: UserService,
    pub posts: PostService,
}

impl ServerState {
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self {
            users: UserService::new(users.clone(), posts.clone()),
            posts: PostService::new(users, posts),
        }
    }
}

pub fn routes() -> ServerRouter {
    routes::routes().fallback(fallback)
}

/// The complete application: all routes plus request tracing, with state applied.
pub fn app(state: ServerState) -> Router {
    routes().layer(TraceLayer::new_for_http()).with_state(state)
}

pub async fn fallback(request: Request) -> ServerError {
    ServerError::UnknownRoute(request.into_parts().0.uri)
}

pub type Result<T, E = ServerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unknown route requested: {0}")]
    UnknownRoute(Uri),
    #[error("Path rejected: {0}")]
    PathRejection(#[from] PathRejection),
    #[error("Incoming JSON rejected: {0}")]
    JsonRejection(#[from] JsonRejection),
    #[error("JSON response could not be serialized: {0}")]
    JsonResponse(#[from] serde_json::Error),
    #[error("Invalid values: {0}")]
    InvalidValues(#[from] ValidationErrors),
    #[error("Post id {body} in the body does not match id {path} in the path")]
    PostIdMismatch {
        path: Id<PostMarker>,
        body: Id<PostMarker>,
    },
    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// The `message` of an error response.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidValues,
    ObjectNotFound,
    ObjectNotUnique,
    RouteNotFound,
    InternalError,
}

impl ServerError {
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            ServerError::UnknownRoute(_) => ErrorCode::RouteNotFound,
            ServerError::PathRejection(_)
            | ServerError::JsonRejection(_)
            | ServerError::InvalidValues(_)
            | ServerError::PostIdMismatch { .. } => ErrorCode::InvalidValues,
            ServerError::JsonResponse(_) => ErrorCode::InternalError,
            ServerError::Service(err) => match err.kind() {
                FailureKind::NotFound => ErrorCode::ObjectNotFound,
                FailureKind::NotUnique => ErrorCode::ObjectNotUnique,
                FailureKind::Internal => ErrorCode::InternalError,
            },
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self.code() {
            ErrorCode::InvalidValues | ErrorCode::ObjectNotFound => StatusCode::BAD_REQUEST,
            ErrorCode::ObjectNotUnique => StatusCode::CONFLICT,
            ErrorCode::RouteNotFound => StatusCode::NOT_FOUND,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Human readable messages for the `errors` list. Never empty, and infrastructure details stay
    /// in the logs.
    #[must_use]
    pub fn details(&self) -> Vec<String> {
        match self {
            ServerError::InvalidValues(errors) => {
                errors.errors().iter().map(ToString::to_string).collect()
            }
            ServerError::PathRejection(rejection) => vec![rejection.body_text()],
            ServerError::JsonRejection(rejection) => vec![rejection.body_text()],
            ServerError::JsonResponse(_) => vec!["Internal server error".to_owned()],
            ServerError::Service(err) if err.kind() == FailureKind::Internal => {
                vec!["Internal server error".to_owned()]
            }
            other => vec![other.to_string()],
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
    pub status: u16,
    pub message: ErrorCode,
    pub errors: Vec<String>,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            error!(error = %self, %status, "Replying with error");
        } else {
            debug!(error = %self, %status, "Replying with error");
        }

        let error_response = ErrorResponse {
            time: OffsetDateTime::now_utc(),
            status: status.as_u16(),
            message: self.code(),
            errors: self.details(),
        };
        (status, Json(error_response)).into_response()
    }
}
