use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::LeaveError,
    model::employee::{Employee, EmployeeChanges, EmployeeFilter, NewEmployee},
    service::LeaveService,
};

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "Ana Torres")]
    pub name: String,
    #[schema(example = "Backend developer")]
    pub position: Option<String>,
    #[schema(example = 3)]
    pub department_id: Option<u64>,
    /// Days per month, 2.5 when omitted
    #[schema(example = 2.5)]
    pub monthly_rate: Option<f64>,
    /// Manually granted starting balance
    #[schema(example = 0.0)]
    pub accumulated_days: Option<f64>,
}

/// Editable employee fields. Lifecycle counters are not accepted here.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateEmployee {
    pub name: Option<String>,
    pub position: Option<String>,
    pub department_id: Option<u64>,
    #[schema(example = "active")]
    pub status: Option<String>,
    pub monthly_rate: Option<f64>,
    pub accumulated_days: Option<f64>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EmployeeQuery {
    /// Page number (start with 1)
    pub page: Option<u32>,
    /// Items per page (max 100)
    pub per_page: Option<u32>,
    /// Filter by department
    pub department_id: Option<u64>,
    /// Filter by status
    pub status: Option<String>,
    /// Search by name or position
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<Employee>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 10)]
    pub total: i64,
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/v1/employee",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created successfully", body = Employee),
        (status = 400, description = "Invalid payload", body = Object, example = json!({
            "message": "name must not be empty"
        })),
        (status = 500, description = "Internal server error", body = Object, example = json!({
            "message": "Internal Server Error"
        }))
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    service: web::Data<LeaveService>,
    payload: web::Json<CreateEmployee>,
) -> Result<HttpResponse, LeaveError> {
    let CreateEmployee {
        name,
        position,
        department_id,
        monthly_rate,
        accumulated_days,
    } = payload.into_inner();

    let employee = service
        .create_employee(NewEmployee {
            name,
            position,
            department_id,
            monthly_rate,
            accumulated_days: accumulated_days.unwrap_or(0.0),
        })
        .await?;

    Ok(HttpResponse::Created().json(employee))
}

// -------------------- Handler --------------------

#[utoipa::path(
    get,
    path = "/api/v1/employee",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeeListResponse)
    ),
    tag = "Employee"
)]
pub async fn list_employees(
    service: web::Data<LeaveService>,
    query: web::Query<EmployeeQuery>,
) -> Result<HttpResponse, LeaveError> {
    let query = query.into_inner();
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    debug!(page, per_page, "Listing employees");

    let filter = EmployeeFilter {
        department_id: query.department_id,
        status: query.status,
        search: query.search.filter(|s| !s.trim().is_empty()),
        page,
        per_page,
    };

    let (data, total) = service.list_employees(&filter).await?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        data,
        page,
        per_page,
        total,
    }))
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/api/v1/employee/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Employee updated successfully", body = Employee),
        (status = 400, description = "No or unknown fields provided", body = Object, example = json!({
            "message": "No fields provided for update"
        })),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee 1 not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn update_employee(
    service: web::Data<LeaveService>,
    path: web::Path<u64>,
    body: web::Json<UpdateEmployee>,
) -> Result<HttpResponse, LeaveError> {
    let employee_id = path.into_inner();
    let UpdateEmployee {
        name,
        position,
        department_id,
        status,
        monthly_rate,
        accumulated_days,
    } = body.into_inner();

    let employee = service
        .update_employee(
            employee_id,
            EmployeeChanges {
                name,
                position,
                department_id,
                status,
                monthly_rate,
                accumulated_days,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(employee))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/v1/employee/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee 1 not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    service: web::Data<LeaveService>,
    path: web::Path<u64>,
) -> Result<HttpResponse, LeaveError> {
    let employee = service.get_employee(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(employee))
}

/// Vacation balance of an employee as of now
#[utoipa::path(
    get,
    path = "/api/v1/employee/{employee_id}/balance",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Current balance", body = crate::model::balance::Balance),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee 1 not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn get_balance(
    service: web::Data<LeaveService>,
    path: web::Path<u64>,
) -> Result<HttpResponse, LeaveError> {
    let balance = service.compute_balance(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(balance))
}
