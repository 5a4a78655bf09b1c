use std::{fmt, str::FromStr};

use bson::Uuid;
use chrono::NaiveDate;
use libris_core::document::Document;
use serde::{Deserialize, Serialize};

use super::{BookId, BookInstanceId, Resource};

/// Circulation status of a physical copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstanceStatus {
    Available,
    #[default]
    Maintenance,
    Loaned,
    Reserved,
}

impl InstanceStatus {
    pub const ALL: [InstanceStatus; 4] = [
        InstanceStatus::Available,
        InstanceStatus::Maintenance,
        InstanceStatus::Loaned,
        InstanceStatus::Reserved,
    ];

    /// Names accepted on input, in display order.
    pub const NAMES: &'static [&'static str] = &["Available", "Maintenance", "Loaned", "Reserved"];

    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceStatus::Available => "Available",
            InstanceStatus::Maintenance => "Maintenance",
            InstanceStatus::Loaned => "Loaned",
            InstanceStatus::Reserved => "Reserved",
        }
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstanceStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        InstanceStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| format!("unknown status {value:?}"))
    }
}

/// One physical copy of a [`Book`](super::Book).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookInstance {
    pub id: BookInstanceId,
    pub book: BookId,
    #[serde(default)]
    pub imprint: String,
    #[serde(default)]
    pub status: InstanceStatus,
    #[serde(default)]
    pub due_back: Option<NaiveDate>,
}

impl Document for BookInstance {
    fn id(&self) -> &Uuid {
        self.id.as_uuid()
    }

    fn collection_name() -> &'static str {
        "bookinstances"
    }
}

impl Resource for BookInstance {
    const ROUTE: &'static str = "bookinstance";
    const LIST_ROUTE: &'static str = "bookinstances";
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceFields {
    pub book: BookId,
    pub imprint: String,
    pub status: InstanceStatus,
    pub due_back: Option<NaiveDate>,
}

impl InstanceFields {
    pub fn into_instance(self, id: BookInstanceId) -> BookInstance {
        BookInstance {
            id,
            book: self.book,
            imprint: self.imprint,
            status: self.status,
            due_back: self.due_back,
        }
    }
}
