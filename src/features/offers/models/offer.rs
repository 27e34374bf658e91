use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::jobs::models::Job;

/// Offer status (PostgreSQL enum `offer_status`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "offer_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OfferStatus {
    Pending,
    Accepted,
    Rejected,
}

impl std::fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OfferStatus::Pending => "pending",
            OfferStatus::Accepted => "accepted",
            OfferStatus::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// Database model for `job_requests`, a provider's bid on a job
#[derive(Debug, Clone, FromRow)]
pub struct Offer {
    pub id: Uuid,
    pub job_id: Uuid,
    pub provider_id: Uuid,
    pub message: String,
    pub proposed_rate: Decimal,
    pub status: OfferStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewOffer {
    pub job_id: Uuid,
    pub provider_id: Uuid,
    pub message: String,
    pub proposed_rate: Decimal,
}

/// Everything written by one acceptance
#[derive(Debug, Clone)]
pub struct AcceptedOffer {
    pub job: Job,
    pub offer: Offer,
    /// Sibling offers moved from `pending` to `rejected`
    pub rejected_offer_ids: Vec<Uuid>,
}
