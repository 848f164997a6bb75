use std::sync::Arc;

use tracing::info;

use crate::{
    error::LeaveError,
    model::employee::{Employee, EmployeeChanges, EmployeeFilter, NewEmployee},
    store::LeaveStore,
};

pub mod balance;
pub mod clock;
pub mod lifecycle;

use clock::Clock;

/// Entry point for everything that reads or moves an employee's leave
/// account. Handlers hold one of these; nothing else touches the counters.
#[derive(Clone)]
pub struct LeaveService {
    store: Arc<dyn LeaveStore>,
    clock: Arc<dyn Clock>,
}

impl LeaveService {
    pub fn new(store: Arc<dyn LeaveStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn create_employee(&self, new: NewEmployee) -> Result<Employee, LeaveError> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(LeaveError::validation("name must not be empty"));
        }
        check_rate(new.monthly_rate)?;
        check_baseline(new.accumulated_days)?;

        let new = NewEmployee {
            name: name.to_string(),
            ..new
        };
        let employee = self.store.insert_employee(&new).await?;
        info!(employee_id = employee.id, "Employee registered");
        Ok(employee)
    }

    pub async fn get_employee(&self, employee_id: u64) -> Result<Employee, LeaveError> {
        self.store
            .find_employee(employee_id)
            .await?
            .ok_or_else(|| LeaveError::employee_not_found(employee_id))
    }

    pub async fn list_employees(
        &self,
        filter: &EmployeeFilter,
    ) -> Result<(Vec<Employee>, i64), LeaveError> {
        self.store.list_employees(filter).await
    }

    pub async fn update_employee(
        &self,
        employee_id: u64,
        changes: EmployeeChanges,
    ) -> Result<Employee, LeaveError> {
        if changes.is_empty() {
            return Err(LeaveError::validation("No fields provided for update"));
        }
        if changes.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(LeaveError::validation("name must not be empty"));
        }
        check_rate(changes.monthly_rate)?;
        if let Some(days) = changes.accumulated_days {
            check_baseline(days)?;
        }

        self.store
            .update_employee(employee_id, &changes)
            .await?
            .ok_or_else(|| LeaveError::employee_not_found(employee_id))
    }
}

fn check_rate(rate: Option<f64>) -> Result<(), LeaveError> {
    match rate {
        Some(r) if !r.is_finite() || r < 0.0 => Err(LeaveError::validation(
            "monthly_rate must be a non-negative number",
        )),
        _ => Ok(()),
    }
}

fn check_baseline(days: f64) -> Result<(), LeaveError> {
    if days.is_finite() {
        Ok(())
    } else {
        Err(LeaveError::validation("accumulated_days must be a number"))
    }
}
