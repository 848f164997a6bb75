use std::sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use chrono::Utc;

use super::{CounterEffect, LeaveStore, TransitionPlanner};
use crate::{
    error::LeaveError,
    model::employee::{Employee, EmployeeChanges, EmployeeFilter, NewEmployee},
    model::vacation_request::{NewVacationRequest, RequestFilter, VacationRequest, VacationStatus},
    utils::round2,
};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    employees: Vec<Employee>,
    requests: Vec<VacationRequest>,
    next_employee_id: u64,
    next_request_id: u64,
}

impl MemoryState {
    fn employee_mut(&mut self, employee_id: u64) -> Option<&mut Employee> {
        self.employees.iter_mut().find(|e| e.id == employee_id)
    }

    fn apply(&mut self, employee_id: u64, effect: CounterEffect) -> Result<(), LeaveError> {
        let employee = self
            .employee_mut(employee_id)
            .ok_or_else(|| LeaveError::employee_not_found(employee_id))?;
        employee.pending_days = round2((employee.pending_days + effect.pending).max(0.0));
        employee.used_days = round2((employee.used_days + effect.used).max(0.0));
        Ok(())
    }
}

/// In-process store for tests. Every write works on a copy of the state and
/// swaps it in only when the whole unit succeeded, like a transaction would.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    fail_counter_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a fully specified employee, keeping its `created_at`.
    pub fn seed_employee(&self, mut employee: Employee) -> u64 {
        let mut state = self.state.lock().expect("memory store poisoned");
        state.next_employee_id += 1;
        employee.id = state.next_employee_id;
        state.employees.push(employee);
        state.next_employee_id
    }

    /// Makes every later counter adjustment fail with a storage error.
    pub fn fail_counter_writes(&self) {
        self.fail_counter_writes.store(true, Ordering::SeqCst);
    }

    pub fn employee(&self, employee_id: u64) -> Option<Employee> {
        let state = self.state.lock().expect("memory store poisoned");
        state.employees.iter().find(|e| e.id == employee_id).cloned()
    }

    fn counter_write(
        &self,
        state: &mut MemoryState,
        employee_id: u64,
        effect: CounterEffect,
    ) -> Result<(), LeaveError> {
        if effect.is_zero() {
            return Ok(());
        }
        if self.fail_counter_writes.load(Ordering::SeqCst) {
            return Err(LeaveError::Storage("counter write failed".into()));
        }
        state.apply(employee_id, effect)
    }
}

fn paginate<T: Clone>(items: Vec<T>, page: u32, per_page: u32) -> Vec<T> {
    let skip = (page.max(1) - 1) as usize * per_page as usize;
    items.into_iter().skip(skip).take(per_page as usize).collect()
}

#[async_trait]
impl LeaveStore for MemoryStore {
    async fn insert_employee(&self, new: &NewEmployee) -> Result<Employee, LeaveError> {
        let mut state = self.state.lock().expect("memory store poisoned");
        state.next_employee_id += 1;
        let employee = Employee {
            id: state.next_employee_id,
            name: new.name.clone(),
            position: new.position.clone(),
            department_id: new.department_id,
            status: "active".to_string(),
            monthly_rate: new.monthly_rate,
            accumulated_days: new.accumulated_days,
            used_days: 0.0,
            pending_days: 0.0,
            created_at: Utc::now(),
        };
        state.employees.push(employee.clone());
        Ok(employee)
    }

    async fn find_employee(&self, employee_id: u64) -> Result<Option<Employee>, LeaveError> {
        Ok(self.employee(employee_id))
    }

    async fn list_employees(
        &self,
        filter: &EmployeeFilter,
    ) -> Result<(Vec<Employee>, i64), LeaveError> {
        let state = self.state.lock().expect("memory store poisoned");
        let search = filter.search.as_ref().map(|s| s.to_lowercase());

        let mut matching: Vec<Employee> = state
            .employees
            .iter()
            .filter(|e| filter.department_id.is_none_or(|d| e.department_id == Some(d)))
            .filter(|e| filter.status.as_ref().is_none_or(|s| &e.status == s))
            .filter(|e| {
                search.as_ref().is_none_or(|s| {
                    e.name.to_lowercase().contains(s)
                        || e.position.as_ref().is_some_and(|p| p.to_lowercase().contains(s))
                })
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        let total = matching.len() as i64;
        Ok((paginate(matching, filter.page, filter.per_page), total))
    }

    async fn update_employee(
        &self,
        employee_id: u64,
        changes: &EmployeeChanges,
    ) -> Result<Option<Employee>, LeaveError> {
        let mut state = self.state.lock().expect("memory store poisoned");
        let Some(employee) = state.employee_mut(employee_id) else {
            return Ok(None);
        };

        if let Some(name) = &changes.name {
            employee.name = name.clone();
        }
        if let Some(position) = &changes.position {
            employee.position = Some(position.clone());
        }
        if let Some(department_id) = changes.department_id {
            employee.department_id = Some(department_id);
        }
        if let Some(status) = &changes.status {
            employee.status = status.clone();
        }
        if let Some(rate) = changes.monthly_rate {
            employee.monthly_rate = Some(rate);
        }
        if let Some(days) = changes.accumulated_days {
            employee.accumulated_days = days;
        }

        Ok(Some(employee.clone()))
    }

    async fn find_request(&self, request_id: u64) -> Result<Option<VacationRequest>, LeaveError> {
        let state = self.state.lock().expect("memory store poisoned");
        Ok(state.requests.iter().find(|r| r.id == request_id).cloned())
    }

    async fn list_requests(
        &self,
        filter: &RequestFilter,
    ) -> Result<(Vec<VacationRequest>, i64), LeaveError> {
        let state = self.state.lock().expect("memory store poisoned");
        let mut matching: Vec<VacationRequest> = state
            .requests
            .iter()
            .filter(|r| filter.employee_id.is_none_or(|id| r.employee_id == id))
            .filter(|r| filter.status.is_none_or(|s| r.status == s))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.start_date.cmp(&a.start_date).then(b.id.cmp(&a.id)));

        let total = matching.len() as i64;
        Ok((paginate(matching, filter.page, filter.per_page), total))
    }

    async fn insert_request(
        &self,
        new: &NewVacationRequest,
        effect: CounterEffect,
    ) -> Result<VacationRequest, LeaveError> {
        let mut guard = self.state.lock().expect("memory store poisoned");
        let mut state = guard.clone();

        state.next_request_id += 1;
        let now = Utc::now();
        let request = VacationRequest {
            id: state.next_request_id,
            employee_id: new.employee_id,
            start_date: new.start_date,
            end_date: new.end_date,
            days: new.days,
            status: new.status,
            kind: new.kind,
            reason: new.reason.clone(),
            requested_by: new.requested_by,
            decided_by: None,
            created_at: now,
            updated_at: now,
        };
        state.requests.push(request.clone());
        self.counter_write(&mut state, new.employee_id, effect)?;

        *guard = state;
        Ok(request)
    }

    async fn change_request_status(
        &self,
        request_id: u64,
        to: VacationStatus,
        decided_by: Option<u64>,
        planner: TransitionPlanner,
    ) -> Result<Option<VacationRequest>, LeaveError> {
        let mut guard = self.state.lock().expect("memory store poisoned");
        let mut state = guard.clone();

        let Some(request) = state.requests.iter_mut().find(|r| r.id == request_id) else {
            return Ok(None);
        };

        let Some(effect) = planner(request.status, to, request.days) else {
            return Ok(Some(request.clone()));
        };

        request.status = to;
        request.decided_by = decided_by;
        request.updated_at = Utc::now();
        let updated = request.clone();

        self.counter_write(&mut state, updated.employee_id, effect)?;

        *guard = state;
        Ok(Some(updated))
    }
}
