//! Fixtures shared by the handler tests.

use std::sync::Arc;

use crate::config::Config;
use crate::model::employee::NewEmployee;
use crate::model::staff_change::{ChangeAction, NewStaffChange};
use crate::store::EmployeeStore;
use crate::store::memory::MemoryStore;
use crate::utils::time::now_local;

pub fn memory_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

pub fn config() -> Config {
    Config {
        rate_clock_per_min: 0,
        rate_admin_per_min: 0,
        ..Config::default()
    }
}

async fn enroll(store: &MemoryStore, employee: NewEmployee) {
    let change = NewStaffChange {
        employee_id: employee.employee_id.clone(),
        action_type: ChangeAction::Added,
        performed_by: "test".to_string(),
        details: format!("Added {}", employee.name),
    };
    store
        .insert_employee(&employee, &change, now_local())
        .await
        .expect("insert employee");
}

/// Active Finance staff member without email or phone.
pub async fn hire(store: &MemoryStore, employee_id: &str, name: &str) {
    enroll(
        store,
        NewEmployee {
            employee_id: employee_id.to_string(),
            name: name.to_string(),
            department: Some("Finance".to_string()),
            email: None,
            contact: None,
        },
    )
    .await;
}

pub async fn hire_with_email(store: &MemoryStore, employee_id: &str, email: &str) {
    enroll(
        store,
        NewEmployee {
            employee_id: employee_id.to_string(),
            name: "Ama Mensah".to_string(),
            department: Some("Finance".to_string()),
            email: Some(email.to_string()),
            contact: None,
        },
    )
    .await;
}

/// `YYYY-MM-DDTHH:MM:SS` on today's date.
pub fn today_at(hms: &str) -> String {
    format!("{}T{}", now_local().date().format("%Y-%m-%d"), hms)
}

/// Full service over `store` with default settings seeded and rate limits off.
macro_rules! test_app {
    ($store:expr) => {{
        let store: std::sync::Arc<dyn crate::store::Store> = $store.clone();
        crate::store::SettingsStore::seed_settings(
            store.as_ref(),
            &crate::service::settings::default_entries(crate::utils::time::now_local()),
        )
        .await
        .expect("seed settings");
        let config = crate::test_support::config();
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new(
                    crate::service::settings::SettingsCache::new(std::time::Duration::from_secs(60)),
                ))
                .app_data(actix_web::web::Data::from(store))
                .app_data(actix_web::web::Data::new(config.clone()))
                .configure(|cfg| crate::routes::configure(cfg, &config)),
        )
        .await
    }};
}

pub(crate) use test_app;
