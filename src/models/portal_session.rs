use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Server-side state behind the portal cookie
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "portal_sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Set by `/portal/start`, before verification
    pub portal_client_code: Option<String>,
    pub portal_phone: Option<String>,
    /// Set once a passcode is verified
    pub client_id: Option<i64>,
    pub created_at: DateTimeUtc,
    pub expires_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
