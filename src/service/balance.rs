use chrono::{DateTime, Datelike, Utc};

use super::LeaveService;
use crate::{
    error::LeaveError,
    model::{balance::Balance, employee::Employee},
    utils::round2,
};

/// Whole months between `anchor` and `now` by calendar year and month only;
/// the day of month plays no part. Never negative.
pub fn months_elapsed(anchor: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let months = (now.year() as i64 - anchor.year() as i64) * 12
        + (now.month() as i64 - anchor.month() as i64);

    months.max(0) as u32
}

/// Available days for `employee` as of `now`. Pure; the same inputs always
/// give the same balance.
pub fn compute_balance(employee: &Employee, now: DateTime<Utc>) -> Balance {
    let monthly_rate = employee.monthly_rate();
    let months_elapsed = months_elapsed(employee.created_at, now);
    let accrued_by_time = round2(months_elapsed as f64 * monthly_rate);

    let accumulated = employee.accumulated_days;
    let used = employee.used_days;
    let pending = employee.pending_days;
    let available = round2(accumulated + accrued_by_time - used - pending);

    Balance {
        employee_id: employee.id,
        accumulated,
        accrued_by_time,
        used,
        pending,
        available,
        monthly_rate,
        months_elapsed,
    }
}

impl LeaveService {
    pub async fn compute_balance(&self, employee_id: u64) -> Result<Balance, LeaveError> {
        let employee = self.get_employee(employee_id).await?;
        Ok(compute_balance(&employee, self.clock.now()))
    }
}
