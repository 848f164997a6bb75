//! Vacation request lifecycle.
//!
//! A request starts `pending` (or `approved` for administrative grants) and is
//! later approved or rejected. Every status change moves the owning
//! employee's `pending_days` / `used_days` by the effect computed here; the
//! stores write that effect in the same transaction as the status.

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, info};
use utoipa::ToSchema;

use super::LeaveService;
use crate::{
    error::LeaveError,
    model::vacation_request::{
        NewVacationRequest, RequestFilter, VacationKind, VacationRequest, VacationStatus,
    },
    store::CounterEffect,
    utils::round2,
};

/// Counter effect of a request entering the ledger in `status`.
pub fn creation_effect(status: VacationStatus, days: f64) -> CounterEffect {
    match status {
        VacationStatus::Pending => CounterEffect {
            pending: days,
            used: 0.0,
        },
        VacationStatus::Approved => CounterEffect {
            pending: 0.0,
            used: days,
        },
        VacationStatus::Rejected => CounterEffect::NONE,
    }
}

/// Counter effect of moving a stored request from `from` to `to`.
///
/// Returns `None` for identity transitions so callers write nothing at all.
/// Leaving `approved` only rolls back `used_days`, whatever the target.
pub fn transition_effect(
    from: VacationStatus,
    to: VacationStatus,
    days: f64,
) -> Option<CounterEffect> {
    use VacationStatus::*;

    match (from, to) {
        (Pending, Pending) | (Approved, Approved) | (Rejected, Rejected) => None,
        (Pending, Approved) => Some(CounterEffect {
            pending: -days,
            used: days,
        }),
        (Pending, Rejected) => Some(CounterEffect {
            pending: -days,
            used: 0.0,
        }),
        (Approved, Pending | Rejected) => Some(CounterEffect {
            pending: 0.0,
            used: -days,
        }),
        // reopening a rejected request only changes its status
        (Rejected, Pending | Approved) => Some(CounterEffect::NONE),
    }
}

/// Caller input for a new request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RequestDraft {
    #[schema(example = 1)]
    pub employee_id: u64,
    #[schema(example = "2026-02-02", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-02-06", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    /// Positive, fractional allowed (0.5 for a half day)
    #[schema(example = 5.0)]
    pub days: f64,
    /// `pending` (default), `approved` for a direct grant, or `rejected`
    pub status: Option<VacationStatus>,
    /// Defaults to `request`
    pub kind: Option<VacationKind>,
    #[schema(example = "Family trip")]
    pub reason: Option<String>,
    #[schema(example = 1)]
    pub requested_by: Option<u64>,
}

impl RequestDraft {
    fn validate(self) -> Result<NewVacationRequest, LeaveError> {
        if !self.days.is_finite() || self.days <= 0.0 {
            return Err(LeaveError::validation("days must be a positive number"));
        }

        // counters are kept at two decimals
        let days = round2(self.days);
        if (days - self.days).abs() > 1e-9 {
            return Err(LeaveError::validation(
                "days must have at most two decimal places",
            ));
        }

        if self.start_date > self.end_date {
            return Err(LeaveError::validation(
                "start_date cannot be after end_date",
            ));
        }

        let status = self.status.unwrap_or(VacationStatus::Pending);

        let reason = self
            .reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        Ok(NewVacationRequest {
            employee_id: self.employee_id,
            start_date: self.start_date,
            end_date: self.end_date,
            days,
            status,
            kind: self.kind.unwrap_or_default(),
            reason,
            requested_by: self.requested_by,
        })
    }
}

impl LeaveService {
    /// Records a new request and reserves (or, for direct grants, consumes)
    /// its days on the employee.
    pub async fn create_request(&self, draft: RequestDraft) -> Result<VacationRequest, LeaveError> {
        let new = draft.validate()?;

        if self.store.find_employee(new.employee_id).await?.is_none() {
            return Err(LeaveError::employee_not_found(new.employee_id));
        }

        let effect = creation_effect(new.status, new.days);
        debug!(
            employee_id = new.employee_id,
            days = new.days,
            status = %new.status,
            "Creating vacation request"
        );

        self.store.insert_request(&new, effect).await
    }

    /// Moves a request to `to`. The effect is keyed on the status currently
    /// stored, never on what the caller believes it is.
    pub async fn change_request_status(
        &self,
        request_id: u64,
        to: VacationStatus,
        decided_by: Option<u64>,
    ) -> Result<VacationRequest, LeaveError> {
        self.store
            .change_request_status(request_id, to, decided_by, transition_effect)
            .await?
            .ok_or_else(|| LeaveError::request_not_found(request_id))
    }

    /// Grants an already approved one-day `birthday` leave. `date` defaults to
    /// today according to the service clock.
    pub async fn grant_birthday(
        &self,
        employee_id: u64,
        date: Option<NaiveDate>,
        granted_by: Option<u64>,
    ) -> Result<VacationRequest, LeaveError> {
        let day = date.unwrap_or_else(|| self.clock.now().date_naive());

        let granted = self
            .create_request(RequestDraft {
                employee_id,
                start_date: day,
                end_date: day,
                days: 1.0,
                status: Some(VacationStatus::Approved),
                kind: Some(VacationKind::Birthday),
                reason: None,
                requested_by: granted_by,
            })
            .await?;

        info!(employee_id, request_id = granted.id, %day, "Birthday leave granted");
        Ok(granted)
    }

    pub async fn get_request(&self, request_id: u64) -> Result<VacationRequest, LeaveError> {
        self.store
            .find_request(request_id)
            .await?
            .ok_or_else(|| LeaveError::request_not_found(request_id))
    }

    pub async fn list_requests(
        &self,
        filter: &RequestFilter,
    ) -> Result<(Vec<VacationRequest>, i64), LeaveError> {
        self.store.list_requests(filter).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::{
        model::employee::Employee,
        service::clock::FixedClock,
        store::memory::MemoryStore,
    };

    fn setup() -> (Arc<MemoryStore>, LeaveService, u64) {
        let store = Arc::new(MemoryStore::new());
        let employee_id = store.seed_employee(Employee {
            id: 0,
            name: "Ana Torres".into(),
            position: None,
            department_id: None,
            status: "active".into(),
            monthly_rate: Some(2.5),
            accumulated_days: 0.0,
            used_days: 0.0,
            pending_days: 0.0,
            created_at: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
        });
        let service = LeaveService::new(store.clone(), Arc::new(FixedClock::on(2023, 7, 1)));
        (store, service, employee_id)
    }

    fn draft(employee_id: u64, days: f64) -> RequestDraft {
        RequestDraft {
            employee_id,
            start_date: NaiveDate::from_ymd_opt(2023, 8, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2023, 8, 7).unwrap(),
            days,
            status: None,
            kind: None,
            reason: Some("Summer".into()),
            requested_by: Some(employee_id),
        }
    }

    fn counters(store: &MemoryStore, employee_id: u64) -> (f64, f64) {
        let e = store.employee(employee_id).unwrap();
        (e.pending_days, e.used_days)
    }

    #[test]
    fn transition_table() {
        use VacationStatus::*;

        assert_eq!(
            transition_effect(Pending, Approved, 2.0),
            Some(CounterEffect { pending: -2.0, used: 2.0 })
        );
        assert_eq!(
            transition_effect(Pending, Rejected, 2.0),
            Some(CounterEffect { pending: -2.0, used: 0.0 })
        );
        assert_eq!(
            transition_effect(Approved, Rejected, 2.0),
            Some(CounterEffect { pending: 0.0, used: -2.0 })
        );
        assert_eq!(
            transition_effect(Approved, Pending, 2.0),
            Some(CounterEffect { pending: 0.0, used: -2.0 })
        );
        assert_eq!(
            transition_effect(Rejected, Approved, 2.0),
            Some(CounterEffect::NONE)
        );
        assert_eq!(
            transition_effect(Rejected, Pending, 2.0),
            Some(CounterEffect::NONE)
        );
        for status in [Pending, Approved, Rejected] {
            assert_eq!(transition_effect(status, status, 2.0), None);
        }
    }

    #[test]
    fn creation_reserves_or_consumes() {
        assert_eq!(
            creation_effect(VacationStatus::Pending, 1.5),
            CounterEffect { pending: 1.5, used: 0.0 }
        );
        assert_eq!(
            creation_effect(VacationStatus::Approved, 1.0),
            CounterEffect { pending: 0.0, used: 1.0 }
        );
    }

    #[actix_web::test]
    async fn create_then_approve_moves_days_from_pending_to_used() {
        let (store, svc, employee_id) = setup();

        let request = svc.create_request(draft(employee_id, 5.0)).await.unwrap();
        assert_eq!(request.status, VacationStatus::Pending);
        assert_eq!(request.kind, VacationKind::Request);
        assert_eq!(counters(&store, employee_id), (5.0, 0.0));
        let available_pending = svc.compute_balance(employee_id).await.unwrap().available;

        let approved = svc
            .change_request_status(request.id, VacationStatus::Approved, Some(99))
            .await
            .unwrap();
        assert_eq!(approved.status, VacationStatus::Approved);
        assert_eq!(approved.decided_by, Some(99));
        assert_eq!(counters(&store, employee_id), (0.0, 5.0));

        let available_approved = svc.compute_balance(employee_id).await.unwrap().available;
        assert_eq!(available_pending, available_approved);
    }

    #[actix_web::test]
    async fn reject_releases_reserved_days() {
        let (store, svc, employee_id) = setup();

        let request = svc.create_request(draft(employee_id, 3.0)).await.unwrap();
        let before = svc.compute_balance(employee_id).await.unwrap().available;

        svc.change_request_status(request.id, VacationStatus::Rejected, None)
            .await
            .unwrap();

        assert_eq!(counters(&store, employee_id), (0.0, 0.0));
        let after = svc.compute_balance(employee_id).await.unwrap().available;
        assert_eq!(after, before + 3.0);
    }

    #[actix_web::test]
    async fn approve_then_reject_cancels_out() {
        let (store, svc, employee_id) = setup();

        let request = svc.create_request(draft(employee_id, 4.5)).await.unwrap();
        svc.change_request_status(request.id, VacationStatus::Approved, None)
            .await
            .unwrap();
        svc.change_request_status(request.id, VacationStatus::Rejected, None)
            .await
            .unwrap();

        assert_eq!(counters(&store, employee_id), (0.0, 0.0));
    }

    #[actix_web::test]
    async fn same_status_twice_is_a_no_op() {
        let (store, svc, employee_id) = setup();

        let request = svc.create_request(draft(employee_id, 2.0)).await.unwrap();
        svc.change_request_status(request.id, VacationStatus::Approved, None)
            .await
            .unwrap();
        let again = svc
            .change_request_status(request.id, VacationStatus::Approved, Some(7))
            .await
            .unwrap();

        assert_eq!(again.status, VacationStatus::Approved);
        assert_eq!(again.decided_by, None);
        assert_eq!(counters(&store, employee_id), (0.0, 2.0));

        let pending = svc.create_request(draft(employee_id, 1.0)).await.unwrap();
        svc.change_request_status(pending.id, VacationStatus::Pending, None)
            .await
            .unwrap();
        assert_eq!(counters(&store, employee_id), (1.0, 2.0));
    }

    #[actix_web::test]
    async fn counters_never_go_negative() {
        let (store, svc, employee_id) = setup();

        let request = svc.create_request(draft(employee_id, 2.0)).await.unwrap();
        svc.change_request_status(request.id, VacationStatus::Approved, None)
            .await
            .unwrap();
        // approved -> pending rolls back used but does not re-reserve
        svc.change_request_status(request.id, VacationStatus::Pending, None)
            .await
            .unwrap();
        assert_eq!(counters(&store, employee_id), (0.0, 0.0));

        // pending -> rejected would take pending below zero; clamped instead
        svc.change_request_status(request.id, VacationStatus::Rejected, None)
            .await
            .unwrap();
        assert_eq!(counters(&store, employee_id), (0.0, 0.0));
    }

    #[actix_web::test]
    async fn direct_grant_is_counted_as_used() {
        let (store, svc, employee_id) = setup();

        let mut grant = draft(employee_id, 1.0);
        grant.status = Some(VacationStatus::Approved);
        grant.kind = Some(VacationKind::Compensatory);
        svc.create_request(grant).await.unwrap();

        assert_eq!(counters(&store, employee_id), (0.0, 1.0));
    }

    #[actix_web::test]
    async fn birthday_grant_defaults_to_clock_date() {
        let (store, svc, employee_id) = setup();

        let granted = svc.grant_birthday(employee_id, None, Some(3)).await.unwrap();

        let today = NaiveDate::from_ymd_opt(2023, 7, 1).unwrap();
        assert_eq!(granted.start_date, today);
        assert_eq!(granted.end_date, today);
        assert_eq!(granted.days, 1.0);
        assert_eq!(granted.kind, VacationKind::Birthday);
        assert_eq!(granted.status, VacationStatus::Approved);
        assert_eq!(granted.requested_by, Some(3));
        assert_eq!(counters(&store, employee_id), (0.0, 1.0));
    }

    #[actix_web::test]
    async fn reopening_a_rejected_request_leaves_counters_alone() {
        let (store, svc, employee_id) = setup();

        let request = svc.create_request(draft(employee_id, 3.0)).await.unwrap();
        svc.change_request_status(request.id, VacationStatus::Rejected, None)
            .await
            .unwrap();

        let reopened = svc
            .change_request_status(request.id, VacationStatus::Pending, Some(4))
            .await
            .unwrap();
        assert_eq!(reopened.status, VacationStatus::Pending);
        assert_eq!(reopened.decided_by, Some(4));
        assert_eq!(counters(&store, employee_id), (0.0, 0.0));

        svc.change_request_status(request.id, VacationStatus::Rejected, None)
            .await
            .unwrap();
        svc.change_request_status(request.id, VacationStatus::Approved, None)
            .await
            .unwrap();
        assert_eq!(counters(&store, employee_id), (0.0, 0.0));
    }

    #[actix_web::test]
    async fn created_as_rejected_touches_no_counter() {
        let (store, svc, employee_id) = setup();

        let mut rejected = draft(employee_id, 2.0);
        rejected.status = Some(VacationStatus::Rejected);
        let created = svc.create_request(rejected).await.unwrap();

        assert_eq!(created.status, VacationStatus::Rejected);
        assert_eq!(counters(&store, employee_id), (0.0, 0.0));
    }

    #[actix_web::test]
    async fn two_decimal_requests_net_out_exactly() {
        let (store, svc, employee_id) = setup();

        let first = svc.create_request(draft(employee_id, 0.01)).await.unwrap();
        let second = svc.create_request(draft(employee_id, 1.15)).await.unwrap();
        assert_eq!(first.days, 0.01);
        assert_eq!(counters(&store, employee_id), (1.16, 0.0));

        svc.change_request_status(first.id, VacationStatus::Rejected, None)
            .await
            .unwrap();
        svc.change_request_status(second.id, VacationStatus::Rejected, None)
            .await
            .unwrap();
        assert_eq!(counters(&store, employee_id), (0.0, 0.0));
    }

    #[actix_web::test]
    async fn half_days_are_allowed() {
        let (store, svc, employee_id) = setup();

        svc.create_request(draft(employee_id, 0.5)).await.unwrap();
        assert_eq!(counters(&store, employee_id), (0.5, 0.0));
    }

    #[actix_web::test]
    async fn validation_runs_before_any_write() {
        let (store, svc, employee_id) = setup();

        for days in [0.0, -1.0, f64::NAN, 0.004, 0.005, 1.255] {
            let err = svc.create_request(draft(employee_id, days)).await.unwrap_err();
            assert!(matches!(err, LeaveError::Validation(_)));
        }

        let mut backwards = draft(employee_id, 1.0);
        backwards.end_date = NaiveDate::from_ymd_opt(2023, 7, 1).unwrap();
        let err = svc.create_request(backwards).await.unwrap_err();
        assert!(matches!(err, LeaveError::Validation(_)));

        assert_eq!(counters(&store, employee_id), (0.0, 0.0));
        let (requests, total) = svc
            .list_requests(&RequestFilter {
                page: 1,
                per_page: 10,
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(requests.is_empty());
        assert_eq!(total, 0);
    }

    #[actix_web::test]
    async fn unknown_employee_or_request_is_not_found() {
        let (_store, svc, _employee_id) = setup();

        let err = svc.create_request(draft(404, 1.0)).await.unwrap_err();
        assert!(matches!(err, LeaveError::NotFound(_)));

        let err = svc
            .change_request_status(404, VacationStatus::Approved, None)
            .await
            .unwrap_err();
        assert!(matches!(err, LeaveError::NotFound(_)));

        let err = svc.get_request(404).await.unwrap_err();
        assert!(matches!(err, LeaveError::NotFound(_)));
    }

    #[actix_web::test]
    async fn failed_counter_write_leaves_status_untouched() {
        let (store, svc, employee_id) = setup();

        let request = svc.create_request(draft(employee_id, 2.0)).await.unwrap();
        store.fail_counter_writes();

        let err = svc
            .change_request_status(request.id, VacationStatus::Approved, None)
            .await
            .unwrap_err();
        assert!(matches!(err, LeaveError::Storage(_)));

        let stored = svc.get_request(request.id).await.unwrap();
        assert_eq!(stored.status, VacationStatus::Pending);
        assert_eq!(counters(&store, employee_id), (2.0, 0.0));
    }

    #[actix_web::test]
    async fn lists_newest_first_with_filters() {
        let (_store, svc, employee_id) = setup();

        let first = svc.create_request(draft(employee_id, 1.0)).await.unwrap();
        let mut later = draft(employee_id, 2.0);
        later.start_date = NaiveDate::from_ymd_opt(2023, 9, 1).unwrap();
        later.end_date = NaiveDate::from_ymd_opt(2023, 9, 2).unwrap();
        let second = svc.create_request(later).await.unwrap();
        svc.change_request_status(first.id, VacationStatus::Approved, None)
            .await
            .unwrap();

        let (all, total) = svc
            .list_requests(&RequestFilter {
                employee_id: Some(employee_id),
                page: 1,
                per_page: 10,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(total, 2);
        assert_eq!(all[0].id, second.id);

        let (approved, total) = svc
            .list_requests(&RequestFilter {
                status: Some(VacationStatus::Approved),
                page: 1,
                per_page: 10,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(approved[0].id, first.id);
    }
}
