//! Server-side portal sessions
//!
//! The cookie only carries an opaque id. Before verification the session
//! holds the identifiers a passcode was requested for; afterwards it holds
//! the authenticated client id.

use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set, TransactionTrait,
};
use uuid::Uuid;

use crate::error::Result;
use crate::models::portal_session;
use crate::models::prelude::*;

/// Passcodes are kept this long for the issuance quota and auditing
pub const OTP_RETENTION_HOURS: i64 = 24;

#[derive(Clone)]
pub struct PortalSessionStore {
    db: DatabaseConnection,
    session_hours: i64,
}

impl PortalSessionStore {
    pub fn new(db: DatabaseConnection, session_hours: i64) -> Self {
        Self { db, session_hours }
    }

    pub async fn create(&self, now: DateTime<Utc>) -> Result<portal_session::Model> {
        let session = portal_session::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            portal_client_code: Set(None),
            portal_phone: Set(None),
            client_id: Set(None),
            created_at: Set(now),
            expires_at: Set(now + Duration::hours(self.session_hours)),
        }
        .insert(&self.db)
        .await?;
        Ok(session)
    }

    /// Live session by id; expired sessions are treated as absent
    pub async fn load(&self, id: &str, now: DateTime<Utc>) -> Result<Option<portal_session::Model>> {
        let session = PortalSession::find_by_id(id.to_string())
            .one(&self.db)
            .await?
            .filter(|s| s.expires_at > now);
        Ok(session)
    }

    /// Remember which identity a passcode was requested for
    pub async fn set_pending(
        &self,
        session: portal_session::Model,
        client_code: &str,
        phone_e164: &str,
    ) -> Result<portal_session::Model> {
        let mut active = session.into_active_model();
        active.portal_client_code = Set(Some(client_code.to_string()));
        active.portal_phone = Set(Some(phone_e164.to_string()));
        active.client_id = Set(None);
        Ok(active.update(&self.db).await?)
    }

    /// Swap the pending session for a fresh authenticated one. The old id
    /// stops working, so a cookie planted before login cannot ride along.
    pub async fn authenticate(
        &self,
        pending: portal_session::Model,
        client_id: i64,
        now: DateTime<Utc>,
    ) -> Result<portal_session::Model> {
        let txn = self.db.begin().await?;
        PortalSession::delete_by_id(pending.id.clone())
            .exec(&txn)
            .await?;
        let session = portal_session::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            portal_client_code: Set(pending.portal_client_code),
            portal_phone: Set(pending.portal_phone),
            client_id: Set(Some(client_id)),
            created_at: Set(now),
            expires_at: Set(now + Duration::hours(self.session_hours)),
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;
        Ok(session)
    }

    /// Forget everything stored for the session
    pub async fn clear(&self, id: &str) -> Result<()> {
        PortalSession::delete_by_id(id.to_string())
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// Delete expired sessions and passcodes past retention
    pub async fn cleanup(&self, now: DateTime<Utc>) -> Result<(u64, u64)> {
        let sessions = PortalSession::delete_many()
            .filter(portal_session::Column::ExpiresAt.lte(now))
            .exec(&self.db)
            .await?;
        let otps = OneTimePassword::delete_many()
            .filter(
                crate::models::one_time_password::Column::CreatedAt
                    .lt(now - Duration::hours(OTP_RETENTION_HOURS)),
            )
            .exec(&self.db)
            .await?;
        Ok((sessions.rows_affected, otps.rows_affected))
    }
}
