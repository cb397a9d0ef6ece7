use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

/// Sentinel label for probe images that have no trusted category yet. Rows
/// only leave this state through re-ingestion, never through feedback.
pub const UNCLASSIFIED: &str = "unclassified";

// Images are stored under a v4 uuid so the public identifier carries no hint
// of the row id or the label.
#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::images)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Image {
    pub id: i32,
    pub uuid: Uuid,
    pub path: String,
    pub label: String,
    pub source: Option<String>,
}

impl Image {
    pub fn is_unclassified(&self) -> bool {
        self.label == UNCLASSIFIED
    }
}
