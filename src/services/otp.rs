//! Portal one-time passcodes
//!
//! A code is ISSUED, then either CONSUMED (`used_at` set) or EXPIRED.
//! Issuance is capped per client over a trailing hour.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use super::notification::{mask_recipient, NotificationDispatcher, OutgoingMessage};
use crate::config::portal::PortalConfig;
use crate::error::{AppError, Result};
use crate::models::message_template::Channel;
use crate::models::prelude::*;
use crate::models::{client, one_time_password};

/// Longest user agent kept on an issued code
const USER_AGENT_MAX: usize = 300;

/// Where an issuance request came from
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    pub request_ip: Option<String>,
    pub user_agent: Option<String>,
}

/// Uniformly random 6-digit code, leading zeros kept
pub fn generate_code() -> String {
    let n: u32 = rand::rng().random_range(0..1_000_000);
    format!("{:06}", n)
}

#[derive(Clone)]
pub struct OtpService {
    db: DatabaseConnection,
    dispatcher: NotificationDispatcher,
    settings: PortalConfig,
}

impl OtpService {
    pub fn new(
        db: DatabaseConnection,
        dispatcher: NotificationDispatcher,
        settings: PortalConfig,
    ) -> Self {
        Self {
            db,
            dispatcher,
            settings,
        }
    }

    pub async fn request_otp(
        &self,
        client_code: &str,
        phone_e164: &str,
        meta: RequestMeta,
    ) -> Result<one_time_password::Model> {
        self.request_otp_at(client_code, phone_e164, meta, Utc::now())
            .await
    }

    /// Issue a passcode for the client matching both identifiers
    pub async fn request_otp_at(
        &self,
        client_code: &str,
        phone_e164: &str,
        meta: RequestMeta,
        now: DateTime<Utc>,
    ) -> Result<one_time_password::Model> {
        let client = self
            .find_client(client_code, phone_e164)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("Client not found. Check Client ID and phone number.".to_string())
            })?;

        let window_start = now - Duration::hours(1);
        let recent = OneTimePassword::find()
            .filter(one_time_password::Column::ClientId.eq(client.id))
            .filter(one_time_password::Column::CreatedAt.gte(window_start))
            .count(&self.db)
            .await?;
        if recent >= self.settings.otp_max_per_hour {
            tracing::warn!(client_code = %client.client_code, recent, "OTP quota exceeded");
            return Err(AppError::RateLimited(
                "Too many OTP requests. Please try again later.".to_string(),
            ));
        }

        let code = generate_code();
        let user_agent = meta
            .user_agent
            .map(|ua| ua.chars().take(USER_AGENT_MAX).collect::<String>());
        let otp = one_time_password::ActiveModel {
            client_id: Set(client.id),
            code: Set(code.clone()),
            created_at: Set(now),
            expires_at: Set(now + Duration::minutes(self.settings.otp_ttl_minutes)),
            used_at: Set(None),
            request_ip: Set(meta.request_ip),
            user_agent: Set(user_agent),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        let message = OutgoingMessage {
            channel: Channel::Whatsapp,
            recipient: client.phone_e164.clone(),
            subject: None,
            body: format!(
                "Your client portal code is {}. It expires in {} minutes.",
                code, self.settings.otp_ttl_minutes
            ),
        };
        let sent = self.dispatcher.send_direct(&message).await;
        if !sent.success {
            tracing::warn!(
                client_code = %client.client_code,
                to = %mask_recipient(&client.phone_e164),
                error = sent.error.as_deref().unwrap_or("unknown"),
                "Failed to deliver portal OTP"
            );
        }

        tracing::info!(client_code = %client.client_code, otp_id = otp.id, "Portal OTP issued");
        Ok(otp)
    }

    pub async fn verify_otp(
        &self,
        client_code: &str,
        phone_e164: &str,
        code: &str,
    ) -> Result<client::Model> {
        self.verify_otp_at(client_code, phone_e164, code, Utc::now())
            .await
    }

    /// Consume a passcode and return the client it authenticates
    pub async fn verify_otp_at(
        &self,
        client_code: &str,
        phone_e164: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<client::Model> {
        let client = self
            .find_client(client_code, phone_e164)
            .await?
            .ok_or_else(|| AppError::NotFound("Client not found.".to_string()))?;

        let otp = OneTimePassword::find()
            .filter(one_time_password::Column::ClientId.eq(client.id))
            .filter(one_time_password::Column::Code.eq(code.trim()))
            .filter(one_time_password::Column::UsedAt.is_null())
            .order_by_desc(one_time_password::Column::CreatedAt)
            .order_by_desc(one_time_password::Column::Id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid OTP.".to_string()))?;

        if otp.is_expired_at(now) {
            return Err(AppError::Unauthorized(
                "OTP expired. Please request a new one.".to_string(),
            ));
        }

        // conditional so a concurrent verify cannot consume the same code
        let consumed = OneTimePassword::update_many()
            .col_expr(one_time_password::Column::UsedAt, Expr::value(now))
            .filter(one_time_password::Column::Id.eq(otp.id))
            .filter(one_time_password::Column::UsedAt.is_null())
            .exec(&self.db)
            .await?;
        if consumed.rows_affected != 1 {
            return Err(AppError::Unauthorized("Invalid OTP.".to_string()));
        }

        tracing::info!(client_code = %client.client_code, otp_id = otp.id, "Portal OTP verified");
        Ok(client)
    }

    async fn find_client(&self, client_code: &str, phone_e164: &str) -> Result<Option<client::Model>> {
        let client = Client::find()
            .filter(client::Column::ClientCode.eq(client_code))
            .filter(client::Column::PhoneE164.eq(phone_e164))
            .one(&self.db)
            .await?;
        Ok(client)
    }
}
