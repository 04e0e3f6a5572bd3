//! Request bodies as they arrive over the wire. Fields may be missing or empty here; validation
//! turns them into model types and reports every offending field at once.

use crate::server::ServerError;
use blog_common::model::{
    Id, ModelValidationError, ValidationErrors,
    post::{EditPost, PostBody, PostContent, PostMarker, PostTitle},
    user::{UserContent, Username},
};
use serde::Deserialize;

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
pub struct UserPayload {
    #[serde(default)]
    pub username: Option<String>,
}

impl UserPayload {
    pub fn validate(self) -> Result<UserContent, ValidationErrors> {
        let username = Username::new(self.username.unwrap_or_default())?;

        Ok(UserContent { username })
    }
}

/// Title and body of a post. Any `author` sent along is ignored.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
pub struct PostPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

impl PostPayload {
    pub fn validate(self) -> Result<PostContent, ValidationErrors> {
        let title = PostTitle::new(self.title.unwrap_or_default());
        let body = PostBody::new(self.body.unwrap_or_default());

        match (title, body) {
            (Ok(title), Ok(body)) => Ok(PostContent { title, body }),
            (title, body) => Err(title.err().into_iter().chain(body.err()).collect()),
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
pub struct EditPostPayload {
    #[serde(default)]
    pub id: Option<Id<PostMarker>>,
    #[serde(flatten)]
    pub content: PostPayload,
}

impl EditPostPayload {
    /// The edited post is named by the `id` in the body, which must be present. It also has to
    /// agree with the id in the path.
    pub fn validate(self, path_id: Id<PostMarker>) -> Result<EditPost, ServerError> {
        let id = self.id.ok_or(ModelValidationError::MissingPostId);
        let (id, content) = match (id, self.content.validate()) {
            (Ok(id), Ok(content)) => (id, content),
            (id, content) => {
                let errors: ValidationErrors = id
                    .err()
                    .into_iter()
                    .chain(content.err().into_iter().flatten())
                    .collect();
                return Err(errors.into());
            }
        };

        if id != path_id {
            return Err(ServerError::PostIdMismatch {
                path: path_id,
                body: id,
            });
        }

        Ok(EditPost { id, content })
    }
}

#[cfg(test)]
mod tests {
    use crate::server::{
        ServerError,
        payload::{EditPostPayload, PostPayload, UserPayload},
    };
    use blog_common::model::{Id, ModelValidationError};
    use rstest::rstest;

    #[rstest]
    #[case("{}", &[ModelValidationError::EmptyTitle, ModelValidationError::EmptyBody])]
    #[case(r#"{"title": "", "body": "b"}"#, &[ModelValidationError::EmptyTitle])]
    #[case(r#"{"title": "t"}"#, &[ModelValidationError::EmptyBody])]
    #[case(r#"{"title": "t", "body": "b"}"#, &[])]
    fn post_payload_collects_field_errors(
        #[case] json: &str,
        #[case] expected: &[ModelValidationError],
    ) {
        let payload: PostPayload = serde_json::from_str(json).unwrap();

        match payload.validate() {
            Ok(_) => assert!(expected.is_empty()),
            Err(errors) => assert_eq!(errors.errors(), expected),
        }
    }

    #[test]
    fn author_in_post_payload_is_ignored() {
        let payload: PostPayload = serde_json::from_str(
            r#"{"title": "t", "body": "b", "author": {"id": 9, "username": "someone"}}"#,
        )
        .unwrap();

        let content = payload.validate().unwrap();
        assert_eq!(content.title.get(), "t");
    }

    #[test]
    fn missing_username_is_reported() {
        let payload: UserPayload = serde_json::from_str("{}").unwrap();

        assert_eq!(
            payload.validate().unwrap_err().errors(),
            [ModelValidationError::EmptyUsername]
        );
    }

    #[test]
    fn edit_payload_requires_inline_id() {
        let payload: EditPostPayload =
            serde_json::from_str(r#"{"title": "t", "body": "b"}"#).unwrap();

        assert!(matches!(
            payload.validate(Id::new(5)),
            Err(ServerError::InvalidValues(errors))
                if errors.errors() == [ModelValidationError::MissingPostId]
        ));
    }

    #[test]
    fn edit_payload_lists_missing_id_with_field_errors() {
        let payload: EditPostPayload = serde_json::from_str(r#"{"title": ""}"#).unwrap();

        assert!(matches!(
            payload.validate(Id::new(5)),
            Err(ServerError::InvalidValues(errors)) if errors.errors() == [
                ModelValidationError::MissingPostId,
                ModelValidationError::EmptyTitle,
                ModelValidationError::EmptyBody,
            ]
        ));
    }

    #[test]
    fn edit_payload_uses_inline_id() {
        let payload: EditPostPayload =
            serde_json::from_str(r#"{"id": 5, "title": "t", "body": "b"}"#).unwrap();

        let edit = payload.validate(Id::new(5)).unwrap();
        assert_eq!(edit.id.get(), 5);
        assert_eq!(edit.content.body.get(), "b");
    }

    #[test]
    fn edit_payload_rejects_conflicting_ids() {
        let payload: EditPostPayload =
            serde_json::from_str(r#"{"id": 2, "title": "t", "body": "b"}"#).unwrap();

        assert!(matches!(
            payload.validate(Id::new(5)),
            Err(ServerError::PostIdMismatch { path, body }) if path.get() == 5 && body.get() == 2
        ));
    }
}
