//! Server-side portal sessions and their cleanup

use std::sync::Arc;

use chrono::{Duration, Utc};
use sea_orm::{EntityTrait, PaginatorTrait};

mod common;
use common::{create_test_client, create_test_db, create_test_org, test_state, RecordingSink};

use visa_crm::models::prelude::*;
use visa_crm::services::RequestMeta;

#[tokio::test]
async fn test_session_lifecycle() {
    let db = create_test_db().await;
    let org = create_test_org(&db, "acme").await;
    let state = test_state(db.clone(), Arc::new(RecordingSink::default()));
    let client = create_test_client(&db, org.id, "Ada Obi", "+2348012345678", None).await;
    let now = Utc::now();

    let session = state.sessions.create(now).await.unwrap();
    assert_eq!(session.expires_at - session.created_at, Duration::hours(12));
    assert!(session.client_id.is_none());

    let pending = state
        .sessions
        .set_pending(session, &client.client_code, &client.phone_e164)
        .await
        .unwrap();
    assert_eq!(pending.portal_client_code.as_deref(), Some("CL-0001"));

    let pending_id = pending.id.clone();
    let authed = state
        .sessions
        .authenticate(pending, client.id, now)
        .await
        .unwrap();
    assert_ne!(authed.id, pending_id);
    assert!(state.sessions.load(&pending_id, now).await.unwrap().is_none());
    let loaded = state.sessions.load(&authed.id, now).await.unwrap().unwrap();
    assert_eq!(loaded.client_id, Some(client.id));

    // expired sessions read as absent
    let expired = state
        .sessions
        .load(&authed.id, authed.expires_at + Duration::seconds(1))
        .await
        .unwrap();
    assert!(expired.is_none());

    state.sessions.clear(&authed.id).await.unwrap();
    assert!(state.sessions.load(&authed.id, now).await.unwrap().is_none());
}

#[tokio::test]
async fn test_cleanup_removes_expired_sessions_and_old_codes() {
    let db = create_test_db().await;
    let org = create_test_org(&db, "acme").await;
    let state = test_state(db.clone(), Arc::new(RecordingSink::default()));
    let client = create_test_client(&db, org.id, "Ada Obi", "+2348012345678", None).await;
    let now = Utc::now();

    state.sessions.create(now - Duration::hours(13)).await.unwrap();
    state.sessions.create(now).await.unwrap();
    state
        .otp
        .request_otp_at(
            &client.client_code,
            &client.phone_e164,
            RequestMeta::default(),
            now - Duration::hours(25),
        )
        .await
        .unwrap();
    state
        .otp
        .request_otp_at(
            &client.client_code,
            &client.phone_e164,
            RequestMeta::default(),
            now - Duration::minutes(5),
        )
        .await
        .unwrap();

    let (sessions, otps) = state.sessions.cleanup(now).await.unwrap();
    assert_eq!(sessions, 1);
    assert_eq!(otps, 1);
    assert_eq!(PortalSession::find().count(&db).await.unwrap(), 1);
    assert_eq!(OneTimePassword::find().count(&db).await.unwrap(), 1);
}
