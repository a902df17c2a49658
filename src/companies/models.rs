//! Tour operators and their vessels.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Vessel kinds accepted by the registry
pub const VESSEL_KINDS: [&str; 5] = ["catamaran", "speedboat", "boat", "schooner", "other"];

/// Tour company from companies
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub tax_id: Option<String>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Vessel from vessels. Only `length_m` matters for pricing.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Vessel {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub kind: Option<String>,
    pub capacity: Option<i32>,
    pub length_m: Option<f64>,
    /// Maritime authority registration
    pub registration: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}
