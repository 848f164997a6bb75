use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{
    MySql,
    error::BoxDynError,
    mysql::{MySqlTypeInfo, MySqlValueRef},
};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum VacationStatus {
    Pending,
    Approved,
    Rejected,
}

/// What kind of leave a request represents. `Request` is the ordinary
/// employee-submitted kind; the others are administrative grants.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum VacationKind {
    Request,
    Birthday,
    Compensatory,
    Adjustment,
}

impl Default for VacationKind {
    fn default() -> Self {
        VacationKind::Request
    }
}

// Both enums live in VARCHAR columns; decode through the text value.
macro_rules! text_column {
    ($ty:ty) => {
        impl sqlx::Type<MySql> for $ty {
            fn type_info() -> MySqlTypeInfo {
                <str as sqlx::Type<MySql>>::type_info()
            }

            fn compatible(ty: &MySqlTypeInfo) -> bool {
                <str as sqlx::Type<MySql>>::compatible(ty)
            }
        }

        impl<'r> sqlx::Decode<'r, MySql> for $ty {
            fn decode(value: MySqlValueRef<'r>) -> Result<Self, BoxDynError> {
                let text = <&str as sqlx::Decode<MySql>>::decode(value)?;
                Ok(text.parse::<$ty>()?)
            }
        }
    };
}

text_column!(VacationStatus);
text_column!(VacationKind);

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 10,
    "employee_id": 1,
    "start_date": "2026-02-02",
    "end_date": "2026-02-06",
    "days": 5.0,
    "status": "pending",
    "kind": "request",
    "reason": "Family trip",
    "requested_by": 1,
    "decided_by": null,
    "created_at": "2026-01-20T10:00:00Z",
    "updated_at": "2026-01-20T10:00:00Z"
}))]
pub struct VacationRequest {
    #[schema(example = 10)]
    pub id: u64,

    #[schema(example = 1)]
    pub employee_id: u64,

    #[schema(example = "2026-02-02", format = "date", value_type = String)]
    pub start_date: NaiveDate,

    #[schema(example = "2026-02-06", format = "date", value_type = String)]
    pub end_date: NaiveDate,

    /// Requested day count, may be fractional (0.5 for a half day)
    #[schema(example = 5.0)]
    pub days: f64,

    pub status: VacationStatus,

    pub kind: VacationKind,

    #[schema(example = "Family trip", nullable = true)]
    pub reason: Option<String>,

    #[schema(example = 1, nullable = true)]
    pub requested_by: Option<u64>,

    #[schema(nullable = true)]
    pub decided_by: Option<u64>,

    #[schema(example = "2026-01-20T10:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,

    #[schema(example = "2026-01-20T10:00:00Z", format = "date-time", value_type = String)]
    pub updated_at: DateTime<Utc>,
}

/// A request that passed validation and is ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewVacationRequest {
    pub employee_id: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: f64,
    pub status: VacationStatus,
    pub kind: VacationKind,
    pub reason: Option<String>,
    pub requested_by: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    pub employee_id: Option<u64>,
    pub status: Option<VacationStatus>,
    pub page: u32,
    pub per_page: u32,
}
