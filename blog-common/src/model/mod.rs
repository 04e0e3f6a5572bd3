pub mod post;
pub mod user;

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter},
    marker::PhantomData,
};
use thiserror::Error;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Error)]
pub enum ModelValidationError {
    #[error("Username must not be empty")]
    EmptyUsername,
    #[error("Title must not be empty")]
    EmptyTitle,
    #[error("Body must not be empty")]
    EmptyBody,
    #[error("Post id must be present")]
    MissingPostId,
}

/// Every field error found while validating one candidate, in field order.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct ValidationErrors(Vec<ModelValidationError>);

impl ValidationErrors {
    #[must_use]
    pub fn errors(&self) -> &[ModelValidationError] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, error: ModelValidationError) {
        self.0.push(error);
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            Display::fmt(error, f)?;
        }

        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ModelValidationError> for ValidationErrors {
    fn from(value: ModelValidationError) -> Self {
        Self(vec![value])
    }
}

impl FromIterator<ModelValidationError> for ValidationErrors {
    fn from_iter<I: IntoIterator<Item = ModelValidationError>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ModelValidationError;
    type IntoIter = std::vec::IntoIter<ModelValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Storage-assigned identity, tagged so ids of different entities cannot be mixed up.
#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Id<Marker>(u64, #[serde(skip)] PhantomData<Marker>);

impl<Marker> Id<Marker> {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id, PhantomData)
    }

    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl<Marker> Display for Id<Marker> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<Marker> From<u64> for Id<Marker> {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl<Marker> From<Id<Marker>> for u64 {
    fn from(value: Id<Marker>) -> Self {
        value.get()
    }
}

/// Declares a string newtype that rejects the empty string, both on construction and when
/// deserialized.
macro_rules! non_empty_string {
    ($(#[$meta:meta])* $name:ident => $error:ident) => {
        $(#[$meta])*
        #[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, ::serde::Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(
                value: impl Into<String>,
            ) -> Result<Self, $crate::model::ModelValidationError> {
                let value = value.into();
                if value.is_empty() {
                    Err($crate::model::ModelValidationError::$error)
                } else {
                    Ok(Self(value))
                }
            }

            #[must_use]
            pub fn get(&self) -> &str {
                &self.0
            }

            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                let inner = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                Self::new(inner).map_err(<D::Error as ::serde::de::Error>::custom)
            }
        }
    };
}

pub(crate) use non_empty_string;
