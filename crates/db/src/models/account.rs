//! Row types for the account store.

use sqlx::FromRow;
use uuid::Uuid;

/// A row from the account store's `users` table.
///
/// `subscription_tier` and `is_active` are nullable upstream; callers apply
/// defaults (lowest tier, active) when absent.
#[derive(Debug, Clone, FromRow)]
pub struct AccountUserRow {
    pub id: Uuid,
    pub email: String,
    pub subscription_tier: Option<String>,
    pub is_active: Option<bool>,
}
