use anyhow::{Context, Result};
use sqlx::MySqlPool;
use tracing::info;

pub async fn init_db(database_url: &str) -> Result<MySqlPool> {
    MySqlPool::connect(database_url)
        .await
        .context("Failed to connect to database")
}

/// Ordered schema history. Entries are applied once, in order, and never
/// edited after release; new columns get a new entry.
pub const MIGRATIONS: &[(u32, &str, &str)] = &[
    (
        1,
        "create_employees",
        r#"
        CREATE TABLE IF NOT EXISTS employees (
            id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
            employee_id VARCHAR(20) NOT NULL,
            name VARCHAR(100) NOT NULL,
            department VARCHAR(100) NULL,
            email VARCHAR(120) NULL,
            contact VARCHAR(20) NULL,
            lifecycle VARCHAR(16) NOT NULL DEFAULT 'active',
            date_added DATETIME NOT NULL,
            date_modified DATETIME NOT NULL,
            UNIQUE KEY uq_employees_employee_id (employee_id),
            KEY ix_employees_department (department)
        )
        "#,
    ),
    (
        2,
        "create_attendance",
        r#"
        CREATE TABLE IF NOT EXISTS attendance (
            id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
            employee_id VARCHAR(20) NOT NULL,
            date_only DATE NOT NULL,
            clock_in_time DATETIME NOT NULL,
            clock_out_time DATETIME NULL,
            status VARCHAR(16) NOT NULL DEFAULT 'present',
            location VARCHAR(100) NOT NULL,
            UNIQUE KEY uq_attendance_employee_day (employee_id, date_only),
            KEY ix_attendance_day (date_only),
            CONSTRAINT fk_attendance_employee FOREIGN KEY (employee_id) REFERENCES employees (employee_id),
            CONSTRAINT ck_attendance_clock_out CHECK (clock_out_time IS NULL OR clock_out_time > clock_in_time)
        )
        "#,
    ),
    (
        3,
        "create_leave_requests",
        r#"
        CREATE TABLE IF NOT EXISTS leave_requests (
            id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
            employee_id VARCHAR(20) NOT NULL,
            start_date DATE NOT NULL,
            end_date DATE NOT NULL,
            status VARCHAR(16) NOT NULL DEFAULT 'pending',
            created_at DATETIME NOT NULL,
            CONSTRAINT fk_leave_employee FOREIGN KEY (employee_id) REFERENCES employees (employee_id),
            CONSTRAINT ck_leave_range CHECK (start_date <= end_date)
        )
        "#,
    ),
    (
        4,
        "create_system_settings",
        r#"
        CREATE TABLE IF NOT EXISTS system_settings (
            id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
            setting_key VARCHAR(50) NOT NULL,
            setting_value TEXT NOT NULL,
            category VARCHAR(30) NOT NULL,
            updated_at DATETIME NOT NULL,
            updated_by VARCHAR(100) NOT NULL DEFAULT 'system',
            UNIQUE KEY uq_settings_key (setting_key)
        )
        "#,
    ),
    (
        5,
        "create_email_notifications",
        r#"
        CREATE TABLE IF NOT EXISTS email_notifications (
            id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
            employee_id VARCHAR(20) NOT NULL,
            notification_type VARCHAR(30) NOT NULL,
            email_sent BOOLEAN NOT NULL DEFAULT FALSE,
            sent_at DATETIME NULL,
            created_at DATETIME NOT NULL,
            message_content TEXT NULL,
            KEY ix_notifications_created (created_at),
            CONSTRAINT fk_notification_employee FOREIGN KEY (employee_id) REFERENCES employees (employee_id)
        )
        "#,
    ),
    (
        6,
        "create_staff_changes",
        r#"
        CREATE TABLE IF NOT EXISTS staff_changes (
            id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
            employee_id VARCHAR(20) NOT NULL,
            action_type VARCHAR(30) NOT NULL,
            action_date DATETIME NOT NULL,
            performed_by VARCHAR(100) NOT NULL,
            details TEXT NULL,
            KEY ix_staff_changes_date (action_date),
            CONSTRAINT fk_staff_change_employee FOREIGN KEY (employee_id) REFERENCES employees (employee_id)
        )
        "#,
    ),
];

/// Applies every migration newer than the recorded schema version.
pub async fn run_migrations(pool: &MySqlPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INT UNSIGNED PRIMARY KEY,
            name VARCHAR(100) NOT NULL,
            applied_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create schema_migrations")?;

    let current = sqlx::query_scalar::<_, i64>(
        "SELECT CAST(COALESCE(MAX(version), 0) AS SIGNED) FROM schema_migrations",
    )
    .fetch_one(pool)
    .await?;

    for (version, name, sql) in pending(MIGRATIONS, current) {
        // MySQL commits DDL implicitly, the transaction only covers the bookkeeping row
        let mut tx = pool.begin().await?;
        sqlx::query(sql)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Migration {} ({}) failed", version, name))?;
        sqlx::query("INSERT INTO schema_migrations (version, name) VALUES (?, ?)")
            .bind(version)
            .bind(name)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        info!(version, name, "Applied migration");
    }

    Ok(())
}

fn pending(
    migrations: &'static [(u32, &'static str, &'static str)],
    current: i64,
) -> impl Iterator<Item = (u32, &'static str, &'static str)> {
    migrations
        .iter()
        .copied()
        .filter(move |(version, _, _)| i64::from(*version) > current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_are_strictly_increasing() {
        let versions: Vec<u32> = MIGRATIONS.iter().map(|(v, _, _)| *v).collect();
        assert!(versions.windows(2).all(|w| w[0] < w[1]), "{:?}", versions);
        assert_eq!(versions.first(), Some(&1));
    }

    #[test]
    fn only_newer_migrations_are_pending() {
        let names: Vec<&str> = pending(MIGRATIONS, 4).map(|(_, name, _)| name).collect();
        assert_eq!(names, vec!["create_email_notifications", "create_staff_changes"]);
        assert_eq!(pending(MIGRATIONS, 6).count(), 0);
    }

    #[test]
    fn attendance_is_unique_per_employee_day() {
        let (_, _, sql) = MIGRATIONS[1];
        assert!(sql.contains("UNIQUE KEY uq_attendance_employee_day (employee_id, date_only)"));
    }
}
