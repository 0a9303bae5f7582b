use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Row id of the singleton cursor record.
pub const INDEXER_STATE_ID: i32 = 1;

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::indexer_state)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct IndexerState {
    pub id: i32,
    pub last_checkpoint: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::indexer_state)]
pub struct NewIndexerState {
    pub id: i32,
    pub last_checkpoint: String,
    pub updated_at: DateTime<Utc>,
}
