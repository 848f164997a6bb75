use async_trait::async_trait;
use sqlx::{MySqlConnection, MySqlPool};
use tracing::{debug, error, info};

use super::{CounterEffect, LeaveStore, TransitionPlanner};
use crate::{
    error::LeaveError,
    model::{
        employee::{Employee, EmployeeChanges, EmployeeFilter, NewEmployee},
        vacation_request::{NewVacationRequest, RequestFilter, VacationRequest, VacationStatus},
    },
    utils::db_utils::{build_update_sql, employee_assignments, execute_update},
};

const EMPLOYEE_COLUMNS: &str = r#"
    id, name, `position`, department_id, status, monthly_rate,
    accumulated_days, used_days, pending_days, created_at
"#;

const REQUEST_COLUMNS: &str = r#"
    id, employee_id, start_date, end_date, days, status, kind,
    reason, requested_by, decided_by, created_at, updated_at
"#;

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
}

#[derive(Clone)]
pub struct MySqlLeaveStore {
    pool: MySqlPool,
}

impl MySqlLeaveStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

async fn fetch_employee(
    conn: &mut MySqlConnection,
    employee_id: u64,
) -> Result<Option<Employee>, sqlx::Error> {
    let sql = format!("SELECT {} FROM employees WHERE id = ?", EMPLOYEE_COLUMNS);
    sqlx::query_as::<_, Employee>(&sql)
        .bind(employee_id)
        .fetch_optional(conn)
        .await
}

async fn fetch_request(
    conn: &mut MySqlConnection,
    request_id: u64,
    for_update: bool,
) -> Result<Option<VacationRequest>, sqlx::Error> {
    let sql = format!(
        "SELECT {} FROM vacation_requests WHERE id = ?{}",
        REQUEST_COLUMNS,
        if for_update { " FOR UPDATE" } else { "" }
    );
    sqlx::query_as::<_, VacationRequest>(&sql)
        .bind(request_id)
        .fetch_optional(conn)
        .await
}

/// Adds the effect to the employee's counters in one statement, clamping at
/// zero, so concurrent adjustments for the same employee never lose updates.
async fn apply_counter_effect(
    conn: &mut MySqlConnection,
    employee_id: u64,
    effect: CounterEffect,
) -> Result<(), sqlx::Error> {
    if effect.is_zero() {
        return Ok(());
    }

    sqlx::query(
        r#"
        UPDATE employees
        SET pending_days = ROUND(GREATEST(pending_days + ?, 0), 2),
            used_days = ROUND(GREATEST(used_days + ?, 0), 2)
        WHERE id = ?
        "#,
    )
    .bind(effect.pending)
    .bind(effect.used)
    .bind(employee_id)
    .execute(conn)
    .await?;

    debug!(
        employee_id,
        pending = effect.pending,
        used = effect.used,
        "Applied counter effect"
    );
    Ok(())
}

#[async_trait]
impl LeaveStore for MySqlLeaveStore {
    async fn insert_employee(&self, new: &NewEmployee) -> Result<Employee, LeaveError> {
        let mut conn = self.pool.acquire().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO employees
                (name, `position`, department_id, monthly_rate, accumulated_days)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.name)
        .bind(&new.position)
        .bind(new.department_id)
        .bind(new.monthly_rate)
        .bind(new.accumulated_days)
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            error!(error = %e, name = %new.name, "Failed to create employee");
            LeaveError::from(e)
        })?;

        let employee_id = result.last_insert_id();
        info!(employee_id, "Employee created");

        fetch_employee(&mut *conn, employee_id)
            .await?
            .ok_or_else(|| LeaveError::employee_not_found(employee_id))
    }

    async fn find_employee(&self, employee_id: u64) -> Result<Option<Employee>, LeaveError> {
        let mut conn = self.pool.acquire().await?;
        Ok(fetch_employee(&mut *conn, employee_id).await?)
    }

    async fn list_employees(
        &self,
        filter: &EmployeeFilter,
    ) -> Result<(Vec<Employee>, i64), LeaveError> {
        let mut where_sql = String::from(" WHERE 1=1");
        let mut args: Vec<FilterValue> = Vec::new();
        let like = filter.search.as_ref().map(|s| format!("%{}%", s));

        if let Some(department_id) = filter.department_id {
            where_sql.push_str(" AND department_id = ?");
            args.push(FilterValue::U64(department_id));
        }

        if let Some(status) = filter.status.as_deref() {
            where_sql.push_str(" AND status = ?");
            args.push(FilterValue::Str(status));
        }

        if let Some(like) = like.as_deref() {
            where_sql.push_str(" AND (name LIKE ? OR `position` LIKE ?)");
            args.push(FilterValue::Str(like));
            args.push(FilterValue::Str(like));
        }

        // ---------- total count ----------
        let count_sql = format!("SELECT COUNT(*) FROM employees{}", where_sql);
        let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
        for arg in &args {
            count_q = match arg {
                FilterValue::U64(v) => count_q.bind(*v),
                FilterValue::Str(s) => count_q.bind(*s),
            };
        }

        let total = count_q.fetch_one(&self.pool).await.map_err(|e| {
            error!(error = %e, sql = %count_sql, "Failed to count employees");
            LeaveError::from(e)
        })?;

        // ---------- data query ----------
        let offset = (filter.page.max(1) - 1) as u64 * filter.per_page as u64;
        let data_sql = format!(
            "SELECT {} FROM employees{} ORDER BY name ASC, id ASC LIMIT ? OFFSET ?",
            EMPLOYEE_COLUMNS, where_sql
        );
        debug!(sql = %data_sql, page = filter.page, per_page = filter.per_page, "Fetching employees");

        let mut data_q = sqlx::query_as::<_, Employee>(&data_sql);
        for arg in args {
            data_q = match arg {
                FilterValue::U64(v) => data_q.bind(v),
                FilterValue::Str(s) => data_q.bind(s),
            };
        }

        let employees = data_q
            .bind(filter.per_page as u64)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to fetch employees");
                LeaveError::from(e)
            })?;

        Ok((employees, total))
    }

    async fn update_employee(
        &self,
        employee_id: u64,
        changes: &EmployeeChanges,
    ) -> Result<Option<Employee>, LeaveError> {
        let mut conn = self.pool.acquire().await?;

        if let Some(update) =
            build_update_sql("employees", employee_assignments(changes), "id", employee_id)
        {
            execute_update(&mut *conn, update).await.map_err(|e| {
                error!(error = %e, employee_id, "Failed to update employee");
                LeaveError::from(e)
            })?;
        }

        // rows_affected is 0 for unchanged rows on MySQL, so re-read instead
        Ok(fetch_employee(&mut *conn, employee_id).await?)
    }

    async fn find_request(&self, request_id: u64) -> Result<Option<VacationRequest>, LeaveError> {
        let mut conn = self.pool.acquire().await?;
        Ok(fetch_request(&mut *conn, request_id, false).await?)
    }

    async fn list_requests(
        &self,
        filter: &RequestFilter,
    ) -> Result<(Vec<VacationRequest>, i64), LeaveError> {
        let mut where_sql = String::from(" WHERE 1=1");
        let mut args: Vec<FilterValue> = Vec::new();

        if let Some(employee_id) = filter.employee_id {
            where_sql.push_str(" AND employee_id = ?");
            args.push(FilterValue::U64(employee_id));
        }

        if let Some(status) = filter.status.as_ref() {
            where_sql.push_str(" AND status = ?");
            args.push(FilterValue::Str(status.as_ref()));
        }

        let count_sql = format!("SELECT COUNT(*) FROM vacation_requests{}", where_sql);
        let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
        for arg in &args {
            count_q = match arg {
                FilterValue::U64(v) => count_q.bind(*v),
                FilterValue::Str(s) => count_q.bind(*s),
            };
        }

        let total = count_q.fetch_one(&self.pool).await.map_err(|e| {
            error!(error = %e, "Failed to count vacation requests");
            LeaveError::from(e)
        })?;

        let offset = (filter.page.max(1) - 1) as u64 * filter.per_page as u64;
        let data_sql = format!(
            r#"
            SELECT {}
            FROM vacation_requests
            {}
            ORDER BY start_date DESC, id DESC
            LIMIT ? OFFSET ?
            "#,
            REQUEST_COLUMNS, where_sql
        );

        let mut data_q = sqlx::query_as::<_, VacationRequest>(&data_sql);
        for arg in args {
            data_q = match arg {
                FilterValue::U64(v) => data_q.bind(v),
                FilterValue::Str(s) => data_q.bind(s),
            };
        }

        let requests = data_q
            .bind(filter.per_page as u64)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to fetch vacation requests");
                LeaveError::from(e)
            })?;

        Ok((requests, total))
    }

    async fn insert_request(
        &self,
        new: &NewVacationRequest,
        effect: CounterEffect,
    ) -> Result<VacationRequest, LeaveError> {
        let employee_id = new.employee_id;
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO vacation_requests
                (employee_id, start_date, end_date, days, status, kind, reason, requested_by)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(employee_id)
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(new.days)
        .bind(new.status.as_ref())
        .bind(new.kind.as_ref())
        .bind(&new.reason)
        .bind(new.requested_by)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!(error = %e, employee_id, "Failed to insert vacation request");
            LeaveError::from(e)
        })?;

        let request_id = result.last_insert_id();

        apply_counter_effect(&mut *tx, employee_id, effect)
            .await
            .map_err(|e| {
                error!(error = %e, employee_id, request_id, "Failed to reserve days");
                LeaveError::from(e)
            })?;

        let created = fetch_request(&mut *tx, request_id, false)
            .await?
            .ok_or_else(|| LeaveError::request_not_found(request_id))?;

        tx.commit().await?;

        info!(
            request_id,
            employee_id,
            days = new.days,
            status = %new.status,
            "Vacation request created"
        );
        Ok(created)
    }

    async fn change_request_status(
        &self,
        request_id: u64,
        to: VacationStatus,
        decided_by: Option<u64>,
        planner: TransitionPlanner,
    ) -> Result<Option<VacationRequest>, LeaveError> {
        let mut tx = self.pool.begin().await?;

        // Row lock: a concurrent change on the same request waits here and
        // then sees the status this transaction commits.
        let Some(current) = fetch_request(&mut *tx, request_id, true).await? else {
            return Ok(None);
        };

        let Some(effect) = planner(current.status, to, current.days) else {
            debug!(request_id, status = %current.status, "Status unchanged, nothing to write");
            return Ok(Some(current));
        };

        sqlx::query(
            r#"
            UPDATE vacation_requests
            SET status = ?, decided_by = ?, updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
        )
        .bind(to.as_ref())
        .bind(decided_by)
        .bind(request_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!(error = %e, request_id, "Failed to update vacation request status");
            LeaveError::from(e)
        })?;

        apply_counter_effect(&mut *tx, current.employee_id, effect)
            .await
            .map_err(|e| {
                error!(
                    error = %e,
                    request_id,
                    employee_id = current.employee_id,
                    "Failed to adjust counters, rolling back status change"
                );
                LeaveError::from(e)
            })?;

        let updated = fetch_request(&mut *tx, request_id, false)
            .await?
            .ok_or_else(|| LeaveError::request_not_found(request_id))?;

        tx.commit().await?;

        info!(
            request_id,
            employee_id = current.employee_id,
            from = %current.status,
            to = %to,
            "Vacation request status changed"
        );
        Ok(Some(updated))
    }
}
