use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Days accrued per month when an employee has no explicit rate.
pub const DEFAULT_MONTHLY_RATE: f64 = 2.5;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "Ana Torres",
        "position": "Backend developer",
        "department_id": 3,
        "status": "active",
        "monthly_rate": 2.5,
        "accumulated_days": 4.0,
        "used_days": 5.0,
        "pending_days": 2.5,
        "created_at": "2024-01-15T09:00:00Z"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Ana Torres")]
    pub name: String,

    #[schema(example = "Backend developer", nullable = true)]
    pub position: Option<String>,

    #[schema(example = 3, nullable = true)]
    pub department_id: Option<u64>,

    #[schema(example = "active")]
    pub status: String,

    /// Days per month; `null` means the default rate of 2.5
    #[schema(example = 2.5, nullable = true)]
    pub monthly_rate: Option<f64>,

    /// Manually granted baseline
    #[schema(example = 4.0)]
    pub accumulated_days: f64,

    /// Days consumed by approved requests
    #[schema(example = 5.0)]
    pub used_days: f64,

    /// Days reserved by requests still waiting for a decision
    #[schema(example = 2.5)]
    pub pending_days: f64,

    /// Accrual anchor
    #[schema(example = "2024-01-15T09:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
}

impl Employee {
    pub fn monthly_rate(&self) -> f64 {
        self.monthly_rate.unwrap_or(DEFAULT_MONTHLY_RATE)
    }
}

/// Validated input for a new employee row. Counters other than the
/// accumulated baseline always start at zero.
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub name: String,
    pub position: Option<String>,
    pub department_id: Option<u64>,
    pub monthly_rate: Option<f64>,
    pub accumulated_days: f64,
}

/// Columns an administrator may edit. `used_days` and `pending_days` are
/// not among them; only the request lifecycle moves those.
#[derive(Debug, Clone, Default)]
pub struct EmployeeChanges {
    pub name: Option<String>,
    pub position: Option<String>,
    pub department_id: Option<u64>,
    pub status: Option<String>,
    pub monthly_rate: Option<f64>,
    pub accumulated_days: Option<f64>,
}

impl EmployeeChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.position.is_none()
            && self.department_id.is_none()
            && self.status.is_none()
            && self.monthly_rate.is_none()
            && self.accumulated_days.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct EmployeeFilter {
    pub department_id: Option<u64>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub page: u32,
    pub per_page: u32,
}
