use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A competitive tier. `order_index` is the tier ordinal: 1 is the lowest,
/// higher is more prestigious.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct League {
    pub league_id: i32,
    pub slug: String,
    pub name: String,
    pub order_index: i32,
    pub icon_url: Option<String>,
}
