use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Derived view of an employee's leave account at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "employee_id": 1,
    "accumulated": 0.0,
    "accrued_by_time": 15.0,
    "used": 5.0,
    "pending": 2.0,
    "available": 8.0,
    "monthly_rate": 2.5,
    "months_elapsed": 6
}))]
pub struct Balance {
    pub employee_id: u64,
    pub accumulated: f64,
    pub accrued_by_time: f64,
    pub used: f64,
    pub pending: f64,
    pub available: f64,
    pub monthly_rate: f64,
    pub months_elapsed: u32,
}
