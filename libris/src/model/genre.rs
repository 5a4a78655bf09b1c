use bson::Uuid;
use libris_core::document::Document;
use serde::{Deserialize, Serialize};

use super::{GenreId, Resource};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub id: GenreId,
    #[serde(default)]
    pub name: String,
}

impl Document for Genre {
    fn id(&self) -> &Uuid {
        self.id.as_uuid()
    }

    fn collection_name() -> &'static str {
        "genres"
    }
}

impl Resource for Genre {
    const ROUTE: &'static str = "genre";
    const LIST_ROUTE: &'static str = "genres";
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreFields {
    pub name: String,
}

impl GenreFields {
    pub fn into_genre(self, id: GenreId) -> Genre {
        Genre { id, name: self.name }
    }
}
