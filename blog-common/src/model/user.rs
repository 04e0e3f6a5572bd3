use crate::model::{Id, non_empty_string};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct UserMarker;

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct User {
    pub id: Id<UserMarker>,
    pub username: Username,
}

/// The writable part of a user, used both to create and to update one.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct UserContent {
    pub username: Username,
}

non_empty_string!(
    /// A username. Compared exactly, so `Alice` and `alice` are distinct.
    Username => EmptyUsername
);

#[cfg(test)]
mod tests {
    use crate::model::{
        Id, ModelValidationError,
        user::{User, Username},
    };

    #[test]
    fn username_rejects_empty() {
        assert_eq!(Username::new(""), Err(ModelValidationError::EmptyUsername));
        assert_eq!(Username::new(" ").unwrap().get(), " ");
        assert_eq!(Username::new("pa6ata").unwrap().into_inner(), "pa6ata");
    }

    #[test]
    fn user_json_shape() {
        let user = User {
            id: Id::new(1),
            username: Username::new("pa6ata").unwrap(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json, serde_json::json!({ "id": 1, "username": "pa6ata" }));
        assert_eq!(serde_json::from_value::<User>(json).unwrap(), user);
    }

    #[test]
    fn empty_username_fails_to_deserialize() {
        let result = serde_json::from_str::<User>(r#"{ "id": 1, "username": "" }"#);

        assert!(result.is_err());
    }
}
