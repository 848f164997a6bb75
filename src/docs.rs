use crate::api::employee::{CreateEmployee, EmployeeListResponse, EmployeeQuery, UpdateEmployee};
use crate::api::vacation_request::{
    BirthdayGrant, ChangeStatus, Decision, VacationFilter, VacationListResponse,
};
use crate::model::balance::Balance;
use crate::model::employee::Employee;
use crate::model::vacation_request::{VacationKind, VacationRequest, VacationStatus};
use crate::service::lifecycle::RequestDraft;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vacation Ledger API",
        version = "1.0.0",
        description = r#"
## Employee Vacation Ledger

Tracks vacation days per employee: monthly accrual, pending reservations and
consumed days.

### Key Features
- **Employees**
  - Create, update, list and view employees with their day counters
- **Vacation requests**
  - Submit requests, approve or reject them, correct decisions afterwards
  - Admin-granted birthday leave
- **Balance**
  - Days accrued by time, used and pending days, and what is still available

### Counter rules
- A pending request reserves its days in `pending_days`
- Approval moves the days into `used_days`
- Rejection releases the reservation
- Counters never go below zero

### Response Format
- JSON-based RESTful responses, errors as `{"message": "..."}`
- Pagination supported for list endpoints
"#,
    ),
    paths(
        crate::api::vacation_request::list_requests,
        crate::api::vacation_request::get_request,
        crate::api::vacation_request::create_request,
        crate::api::vacation_request::change_status,
        crate::api::vacation_request::approve_request,
        crate::api::vacation_request::reject_request,
        crate::api::vacation_request::grant_birthday,

        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::get_balance
    ),
    components(
        schemas(
            VacationFilter,
            VacationRequest,
            VacationStatus,
            VacationKind,
            VacationListResponse,
            RequestDraft,
            ChangeStatus,
            Decision,
            BirthdayGrant,
            CreateEmployee,
            UpdateEmployee,
            EmployeeQuery,
            Employee,
            EmployeeListResponse,
            Balance
        )
    ),
    tags(
        (name = "Vacation", description = "Vacation request lifecycle APIs"),
        (name = "Employee", description = "Employee and balance APIs"),
    )
)]
pub struct ApiDoc;
