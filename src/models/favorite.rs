use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::favorites;

/// Favorite membership row, composite-keyed by (user, listing).
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = favorites)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Favorite {
    pub user_id: String,
    pub listing_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, Serialize, Deserialize)]
#[diesel(table_name = favorites)]
pub struct NewFavorite {
    pub user_id: String,
    pub listing_id: String,
    pub created_at: DateTime<Utc>,
}
