use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registry row for one tenant (an isolated retail company).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantInfo {
    pub id: Uuid,
    pub name: String,
    pub display_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TenantDraft {
    pub name: String,
    pub display_name: String,
}

impl TenantDraft {
    /// Tenant names are URL-safe identifiers: 2-100 chars of
    /// alphanumerics, hyphens, and underscores.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.len() < 2 {
            return Err("tenant name must be at least 2 characters".to_string());
        }
        if self.name.len() > 100 {
            return Err("tenant name must be less than 100 characters".to_string());
        }
        if !self.name.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_') {
            return Err("tenant name can only contain letters, numbers, hyphens, and underscores".to_string());
        }
        if self.display_name.is_empty() {
            return Err("display name is required".to_string());
        }
        Ok(())
    }
}
