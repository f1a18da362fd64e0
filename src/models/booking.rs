use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A customer booking. Suppliers quote its booking number as "our reference".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub booking_number: String,
    pub client: Option<String>,
    /// Id of the project or job planned for this booking. Not a foreign key:
    /// it may point at either table.
    pub assigned_project_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
