use async_trait::async_trait;

use crate::{
    error::LeaveError,
    model::{
        employee::{Employee, EmployeeChanges, EmployeeFilter, NewEmployee},
        vacation_request::{NewVacationRequest, RequestFilter, VacationRequest, VacationStatus},
    },
};

#[cfg(test)]
pub mod memory;
pub mod mysql;

pub use mysql::MySqlLeaveStore;

/// Signed adjustment to an employee's `pending_days` / `used_days`.
///
/// Stores add the deltas and clamp each counter at zero in the same write.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CounterEffect {
    pub pending: f64,
    pub used: f64,
}

impl CounterEffect {
    pub const NONE: CounterEffect = CounterEffect {
        pending: 0.0,
        used: 0.0,
    };

    pub fn is_zero(&self) -> bool {
        self.pending == 0.0 && self.used == 0.0
    }
}

/// Decides the counter effect of moving a request `from` one status `to`
/// another for `days` days. `None` means the transition is a no-op and
/// nothing must be written.
pub type TransitionPlanner = fn(VacationStatus, VacationStatus, f64) -> Option<CounterEffect>;

/// Persistence used by the leave service.
///
/// `insert_request` and `change_request_status` write the request row and the
/// employee counters as one unit of work: either both land or neither does.
#[async_trait]
pub trait LeaveStore: Send + Sync {
    async fn insert_employee(&self, new: &NewEmployee) -> Result<Employee, LeaveError>;

    async fn find_employee(&self, employee_id: u64) -> Result<Option<Employee>, LeaveError>;

    async fn list_employees(
        &self,
        filter: &EmployeeFilter,
    ) -> Result<(Vec<Employee>, i64), LeaveError>;

    async fn update_employee(
        &self,
        employee_id: u64,
        changes: &EmployeeChanges,
    ) -> Result<Option<Employee>, LeaveError>;

    async fn find_request(&self, request_id: u64) -> Result<Option<VacationRequest>, LeaveError>;

    async fn list_requests(
        &self,
        filter: &RequestFilter,
    ) -> Result<(Vec<VacationRequest>, i64), LeaveError>;

    async fn insert_request(
        &self,
        new: &NewVacationRequest,
        effect: CounterEffect,
    ) -> Result<VacationRequest, LeaveError>;

    /// Reads the request's current status under lock, asks `planner` for the
    /// effect and, unless it is a no-op, writes the new status and the
    /// counter effect together. `Ok(None)` when the request does not exist.
    async fn change_request_status(
        &self,
        request_id: u64,
        to: VacationStatus,
        decided_by: Option<u64>,
        planner: TransitionPlanner,
    ) -> Result<Option<VacationRequest>, LeaveError>;
}

