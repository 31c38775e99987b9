use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::case::CaseStatus;

/// Append-only audit row for one observed status transition.
/// Rows are only ever inserted, by the case transition service.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "status_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub case_id: i64,
    pub old_status: CaseStatus,
    pub new_status: CaseStatus,
    pub changed_by_id: Option<i64>,
    pub changed_at: DateTimeUtc,
    pub comment: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::case::Entity",
        from = "Column::CaseId",
        to = "super::case::Column::Id"
    )]
    Case,
}

impl Related<super::case::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Case.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
