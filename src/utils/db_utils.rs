use sqlx::MySqlConnection;

use crate::model::employee::EmployeeChanges;

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    U64(u64),
    F64(f64),
}

/// ===============================
/// SQL update container
/// ===============================
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// Column/value pairs for the employee columns present in `changes`.
/// Column names come from this fixed list, never from the payload.
pub fn employee_assignments(changes: &EmployeeChanges) -> Vec<(&'static str, SqlValue)> {
    let mut columns = Vec::new();

    if let Some(name) = &changes.name {
        columns.push(("name", SqlValue::String(name.clone())));
    }
    if let Some(position) = &changes.position {
        columns.push(("position", SqlValue::String(position.clone())));
    }
    if let Some(department_id) = changes.department_id {
        columns.push(("department_id", SqlValue::U64(department_id)));
    }
    if let Some(status) = &changes.status {
        columns.push(("status", SqlValue::String(status.clone())));
    }
    if let Some(rate) = changes.monthly_rate {
        columns.push(("monthly_rate", SqlValue::F64(rate)));
    }
    if let Some(days) = changes.accumulated_days {
        columns.push(("accumulated_days", SqlValue::F64(days)));
    }

    columns
}

/// ===============================
/// Build UPDATE SQL
/// ===============================
/// Returns `None` when there is nothing to set.
pub fn build_update_sql(
    table: &str,
    assignments: Vec<(&'static str, SqlValue)>,
    id_column: &str,
    id_value: u64,
) -> Option<SqlUpdate> {
    if assignments.is_empty() {
        return None;
    }

    let set_clause = assignments
        .iter()
        .map(|(column, _)| format!("`{}` = ?", column))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!(
        "UPDATE {} SET {} WHERE {} = ?",
        table, set_clause, id_column
    );

    let mut values: Vec<SqlValue> = assignments.into_iter().map(|(_, v)| v).collect();

    // WHERE id = ?
    values.push(SqlValue::U64(id_value));

    Some(SqlUpdate { sql, values })
}

/// ===============================
/// Execute the update
/// ===============================
pub async fn execute_update(
    conn: &mut MySqlConnection,
    update: SqlUpdate,
) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::U64(v) => query.bind(v),
            SqlValue::F64(v) => query.bind(v),
        };
    }

    let result = query.execute(conn).await?;
    Ok(result.rows_affected())
}
