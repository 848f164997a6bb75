use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::LeaveError,
    model::vacation_request::{RequestFilter, VacationRequest, VacationStatus},
    service::{LeaveService, lifecycle::RequestDraft},
};

#[derive(Serialize, ToSchema)]
pub struct VacationListResponse {
    pub data: Vec<VacationRequest>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct VacationFilter {
    /// Filter by employee ID
    #[schema(example = 1)]
    pub employee_id: Option<u64>,
    /// Filter by status
    pub status: Option<VacationStatus>,
    /// Pagination page number (start with 1)
    #[schema(example = 1)]
    pub page: Option<u32>,
    /// Items per page (max 100)
    #[schema(example = 10)]
    pub per_page: Option<u32>,
}

#[derive(Deserialize, ToSchema)]
pub struct ChangeStatus {
    pub status: VacationStatus,
    /// Who made the decision
    #[schema(example = 2)]
    pub decided_by: Option<u64>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct Decision {
    #[schema(example = 2)]
    pub decided_by: Option<u64>,
}

#[derive(Deserialize, ToSchema)]
pub struct BirthdayGrant {
    #[schema(example = 1)]
    pub employee_id: u64,
    /// Admin granting the day
    #[schema(example = 2)]
    pub admin_id: Option<u64>,
    /// Defaults to today
    #[schema(example = "2026-03-14", format = "date", value_type = String)]
    pub date: Option<NaiveDate>,
}

/* =========================
Create vacation request
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/vacation",
    request_body(
        content = RequestDraft,
        description = "Vacation request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Vacation request created", body = VacationRequest),
        (status = 400, description = "Invalid payload", body = Object, example = json!({
            "message": "days must be a positive number"
        })),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee 1 not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Vacation"
)]
pub async fn create_request(
    service: web::Data<LeaveService>,
    payload: web::Json<RequestDraft>,
) -> Result<HttpResponse, LeaveError> {
    let created = service.create_request(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(created))
}

/* =========================
Change status (approve / reject / correct)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/vacation/{request_id}/status",
    params(
        ("request_id" = u64, Path, description = "ID of the vacation request")
    ),
    request_body = ChangeStatus,
    responses(
        (status = 200, description = "Status updated", body = VacationRequest),
        (status = 400, description = "Invalid status"),
        (status = 404, description = "Vacation request not found", body = Object, example = json!({
            "message": "Vacation request 10 not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Vacation"
)]
pub async fn change_status(
    service: web::Data<LeaveService>,
    path: web::Path<u64>,
    payload: web::Json<ChangeStatus>,
) -> Result<HttpResponse, LeaveError> {
    let request_id = path.into_inner();
    let ChangeStatus { status, decided_by } = payload.into_inner();

    let updated = service
        .change_request_status(request_id, status, decided_by)
        .await?;
    Ok(HttpResponse::Ok().json(updated))
}

/* =========================
Approve vacation request
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/vacation/{request_id}/approve",
    params(
        ("request_id" = u64, Path, description = "ID of the vacation request to approve")
    ),
    request_body(content = Decision, description = "Optional, may be empty"),
    responses(
        (status = 200, description = "Vacation request approved", body = VacationRequest),
        (status = 404, description = "Vacation request not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Vacation"
)]
pub async fn approve_request(
    service: web::Data<LeaveService>,
    path: web::Path<u64>,
    body: web::Bytes,
) -> Result<HttpResponse, LeaveError> {
    decide(service, path.into_inner(), VacationStatus::Approved, &body).await
}

/* =========================
Reject vacation request
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/vacation/{request_id}/reject",
    params(
        ("request_id" = u64, Path, description = "ID of the vacation request to reject")
    ),
    request_body(content = Decision, description = "Optional, may be empty"),
    responses(
        (status = 200, description = "Vacation request rejected", body = VacationRequest),
        (status = 404, description = "Vacation request not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Vacation"
)]
pub async fn reject_request(
    service: web::Data<LeaveService>,
    path: web::Path<u64>,
    body: web::Bytes,
) -> Result<HttpResponse, LeaveError> {
    decide(service, path.into_inner(), VacationStatus::Rejected, &body).await
}

async fn decide(
    service: web::Data<LeaveService>,
    request_id: u64,
    status: VacationStatus,
    body: &[u8],
) -> Result<HttpResponse, LeaveError> {
    let decided_by = parse_decision(body)?.decided_by;
    let updated = service
        .change_request_status(request_id, status, decided_by)
        .await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// The decision body is optional; an empty body means no decider, a
/// malformed one is a validation error.
fn parse_decision(body: &[u8]) -> Result<Decision, LeaveError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Decision::default());
    }

    serde_json::from_slice(body).map_err(|e| LeaveError::validation(e.to_string()))
}

/* =========================
Birthday leave (admin grant)
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/vacation/birthday",
    request_body = BirthdayGrant,
    responses(
        (status = 201, description = "Approved one-day birthday leave", body = VacationRequest),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Vacation"
)]
pub async fn grant_birthday(
    service: web::Data<LeaveService>,
    payload: web::Json<BirthdayGrant>,
) -> Result<HttpResponse, LeaveError> {
    let BirthdayGrant {
        employee_id,
        admin_id,
        date,
    } = payload.into_inner();

    let granted = service.grant_birthday(employee_id, date, admin_id).await?;
    Ok(HttpResponse::Created().json(granted))
}

/// for getting a vacation request details endpoint
#[utoipa::path(
    get,
    path = "/api/v1/vacation/{request_id}",
    params(
        ("request_id" = u64, Path, description = "ID of the vacation request to fetch")
    ),
    responses(
        (status = 200, description = "Vacation request found", body = VacationRequest),
        (status = 404, description = "Vacation request not found", body = Object, example = json!({
            "message": "Vacation request 10 not found"
        }))
    ),
    tag = "Vacation"
)]
pub async fn get_request(
    service: web::Data<LeaveService>,
    path: web::Path<u64>,
) -> Result<HttpResponse, LeaveError> {
    let request = service.get_request(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(request))
}

/// for getting vacation requests endpoint
#[utoipa::path(
    get,
    path = "/api/v1/vacation",
    params(VacationFilter),
    responses(
        (status = 200, description = "Paginated vacation request list", body = VacationListResponse)
    ),
    tag = "Vacation"
)]
pub async fn list_requests(
    service: web::Data<LeaveService>,
    query: web::Query<VacationFilter>,
) -> Result<HttpResponse, LeaveError> {
    // -------------------------
    // Pagination
    // -------------------------
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
    let page = query.page.unwrap_or(1).max(1);

    let filter = RequestFilter {
        employee_id: query.employee_id,
        status: query.status,
        page,
        per_page,
    };

    let (data, total) = service.list_requests(&filter).await?;

    Ok(HttpResponse::Ok().json(VacationListResponse {
        data,
        page,
        per_page,
        total,
    }))
}
