use std::fmt;

use bson::{Bson, Uuid};
use serde::{Deserialize, Serialize};

/// Declares a typed identifier over the store's UUID.
///
/// Each entity gets its own id type, so a book's `author` field cannot be
/// handed a genre id. Ids serialize exactly like the bare UUID.
macro_rules! typed_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a fresh random id.
            pub fn generate() -> Self {
                Self(Uuid::new())
            }

            /// Parses the hyphenated string form. Returns `None` for anything else.
            pub fn parse(value: &str) -> Option<Self> {
                Uuid::parse_str(value).ok().map(Self)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl From<$name> for Bson {
            fn from(id: $name) -> Self {
                Bson::from(id.0)
            }
        }
    };
}

typed_id!(
    /// Identifies an [`Author`](super::Author).
    AuthorId
);
typed_id!(
    /// Identifies a [`Book`](super::Book).
    BookId
);
typed_id!(
    /// Identifies a [`Genre`](super::Genre).
    GenreId
);
typed_id!(
    /// Identifies a [`BookInstance`](super::BookInstance).
    BookInstanceId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_display_output() {
        let id = AuthorId::generate();

        assert_eq!(AuthorId::parse(&id.to_string()), Some(id));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(GenreId::parse("not-an-id"), None);
        assert_eq!(GenreId::parse(""), None);
    }

    #[test]
    fn ids_store_as_binary_uuids() {
        let id = BookId::generate();

        assert_eq!(Bson::from(id), Bson::from(*id.as_uuid()));
        assert!(matches!(Bson::from(id), Bson::Binary(_)));
    }
}
