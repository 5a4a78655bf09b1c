use bson::Uuid;
use chrono::NaiveDate;
use libris_core::document::Document;
use serde::{Deserialize, Serialize};

use super::{AuthorId, Resource};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: AuthorId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub family_name: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub date_of_death: Option<NaiveDate>,
}

impl Document for Author {
    fn id(&self) -> &Uuid {
        self.id.as_uuid()
    }

    fn collection_name() -> &'static str {
        "authors"
    }
}

impl Resource for Author {
    const ROUTE: &'static str = "author";
    const LIST_ROUTE: &'static str = "authors";
}

/// Writable author fields. Absent dates serialize as null so an update can clear them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorFields {
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl AuthorFields {
    pub fn into_author(self, id: AuthorId) -> Author {
        Author {
            id,
            first_name: self.first_name,
            family_name: self.family_name,
            date_of_birth: self.date_of_birth,
            date_of_death: self.date_of_death,
        }
    }
}
