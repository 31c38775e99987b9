use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cases")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub organization_id: i64,
    pub branch_id: Option<i64>,
    pub program_id: Option<i64>,
    /// `APP-0001`; assigned once at creation
    #[sea_orm(unique)]
    pub case_code: String,
    pub client_id: i64,
    pub destination_country_code: String,
    pub application_type: ApplicationType,
    pub current_status: CaseStatus,
    pub priority: CasePriority,
    pub assigned_officer_id: Option<i64>,
    pub last_client_update_at: Option<DateTimeUtc>,
    pub next_action: Option<String>,
    pub notes: Option<String>,
    pub submitted_at: Option<DateTimeUtc>,
    pub closed_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id"
    )]
    Client,
    #[sea_orm(has_many = "super::status_history::Entity")]
    StatusHistory,
    #[sea_orm(has_many = "super::document::Entity")]
    Documents,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::status_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StatusHistory.def()
    }
}

impl Related<super::document::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Documents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Pipeline position of a case. Any status may move to any other.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(40))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseStatus {
    #[sea_orm(string_value = "NEW_INQUIRY")]
    NewInquiry,
    #[sea_orm(string_value = "CONSULTATION_COMPLETED")]
    ConsultationCompleted,
    #[sea_orm(string_value = "DOCS_REQUESTED")]
    DocsRequested,
    #[sea_orm(string_value = "DOCS_RECEIVED")]
    DocsReceived,
    #[sea_orm(string_value = "APPLICATION_SUBMITTED")]
    ApplicationSubmitted,
    #[sea_orm(string_value = "EMBASSY_REVIEW")]
    EmbassyReview,
    #[sea_orm(string_value = "ADDITIONAL_DOCS_REQUESTED")]
    AdditionalDocsRequested,
    #[sea_orm(string_value = "DECISION_RECEIVED")]
    DecisionReceived,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "REFUSED")]
    Refused,
    #[sea_orm(string_value = "CLOSED")]
    Closed,
}

impl CaseStatus {
    pub const TERMINAL: [CaseStatus; 3] =
        [CaseStatus::Approved, CaseStatus::Refused, CaseStatus::Closed];

    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::NewInquiry => "NEW_INQUIRY",
            CaseStatus::ConsultationCompleted => "CONSULTATION_COMPLETED",
            CaseStatus::DocsRequested => "DOCS_REQUESTED",
            CaseStatus::DocsReceived => "DOCS_RECEIVED",
            CaseStatus::ApplicationSubmitted => "APPLICATION_SUBMITTED",
            CaseStatus::EmbassyReview => "EMBASSY_REVIEW",
            CaseStatus::AdditionalDocsRequested => "ADDITIONAL_DOCS_REQUESTED",
            CaseStatus::DecisionReceived => "DECISION_RECEIVED",
            CaseStatus::Approved => "APPROVED",
            CaseStatus::Refused => "REFUSED",
            CaseStatus::Closed => "CLOSED",
        }
    }

    /// Human-readable label used in client messages
    pub fn label(&self) -> &'static str {
        match self {
            CaseStatus::NewInquiry => "New Inquiry",
            CaseStatus::ConsultationCompleted => "Consultation Completed",
            CaseStatus::DocsRequested => "Documents Requested",
            CaseStatus::DocsReceived => "Documents Received",
            CaseStatus::ApplicationSubmitted => "Application Submitted",
            CaseStatus::EmbassyReview => "Embassy Review",
            CaseStatus::AdditionalDocsRequested => "Additional Docs Requested",
            CaseStatus::DecisionReceived => "Decision Received",
            CaseStatus::Approved => "Approved",
            CaseStatus::Refused => "Refused",
            CaseStatus::Closed => "Closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::all()
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
    }

    /// All statuses in pipeline order
    pub fn all() -> Vec<CaseStatus> {
        vec![
            CaseStatus::NewInquiry,
            CaseStatus::ConsultationCompleted,
            CaseStatus::DocsRequested,
            CaseStatus::DocsReceived,
            CaseStatus::ApplicationSubmitted,
            CaseStatus::EmbassyReview,
            CaseStatus::AdditionalDocsRequested,
            CaseStatus::DecisionReceived,
            CaseStatus::Approved,
            CaseStatus::Refused,
            CaseStatus::Closed,
        ]
    }

    pub fn is_terminal(&self) -> bool {
        Self::TERMINAL.contains(self)
    }
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationType {
    #[sea_orm(string_value = "STUDY")]
    Study,
    #[sea_orm(string_value = "WORK")]
    Work,
    #[sea_orm(string_value = "VISIT")]
    Visit,
    #[sea_orm(string_value = "PR")]
    Pr,
    #[sea_orm(string_value = "BUSINESS")]
    Business,
    #[sea_orm(string_value = "OTHER")]
    Other,
}

impl ApplicationType {
    pub fn label(&self) -> &'static str {
        match self {
            ApplicationType::Study => "Study",
            ApplicationType::Work => "Work",
            ApplicationType::Visit => "Visit/Tourism",
            ApplicationType::Pr => "Permanent Residency",
            ApplicationType::Business => "Business",
            ApplicationType::Other => "Other",
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CasePriority {
    #[sea_orm(string_value = "NORMAL")]
    Normal,
    #[sea_orm(string_value = "URGENT")]
    Urgent,
}
