use crate::{
    api::{attendance, leave_request, notifications, reports, settings, staff, system},
    config::Config,
    error::AppError,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::Condition, web};

// Per-peer limiter; a rate of 0 leaves the route unlimited.
fn build_limiter(requests_per_min: u32) -> Condition<Governor<PeerIpKeyExtractor, NoOpMiddleware>> {
    let burst = requests_per_min.max(1);
    let per_ms = (60_000 / u64::from(burst)).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(burst)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_default();
    Condition::new(requests_per_min > 0, Governor::new(&cfg))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::validation(format!("Invalid JSON body: {}", err)).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        AppError::validation(format!("Invalid query string: {}", err)).into()
    }));

    // Outside the API prefix
    cfg.service(system::index).service(system::health);

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(build_limiter(config.rate_admin_per_min))
            // clock-in / clock-out
            .service(
                web::resource("/clock-in")
                    .wrap(build_limiter(config.rate_clock_per_min))
                    .route(web::post().to(attendance::clock_in)),
            )
            .service(
                web::resource("/clock-out")
                    .wrap(build_limiter(config.rate_clock_per_min))
                    .route(web::post().to(attendance::clock_out)),
            )
            .service(web::resource("/status/{employee_id}").route(web::get().to(attendance::status)))
            .service(
                web::scope("/attendance")
                    .service(
                        web::resource("/today/{employee_id}")
                            .route(web::get().to(attendance::today)),
                    )
                    .service(
                        web::resource("/monthly-summary/{employee_id}")
                            .route(web::get().to(attendance::monthly_summary)),
                    )
                    .service(
                        web::resource("/report/{employee_id}")
                            .route(web::get().to(attendance::staff_report)),
                    )
                    .service(
                        web::resource("/mark-absences")
                            .route(web::post().to(attendance::mark_absences)),
                    ),
            )
            .service(
                web::scope("/staff")
                    // /staff
                    .service(
                        web::resource("")
                            .route(web::post().to(staff::upload_staff))
                            .route(web::get().to(staff::list_staff)),
                    )
                    // bulk deletes before /staff/{employee_id}
                    .service(
                        web::resource("/delete-all").route(web::delete().to(staff::delete_all)),
                    )
                    .service(
                        web::resource("/delete-selected")
                            .route(web::delete().to(staff::delete_selected)),
                    )
                    // /staff/{employee_id}
                    .service(
                        web::resource("/{employee_id}")
                            .route(web::get().to(staff::get_staff))
                            .route(web::put().to(staff::update_staff))
                            .route(web::delete().to(staff::delete_staff)),
                    ),
            )
            .service(
                web::resource("/leave-request").route(web::post().to(leave_request::create_leave)),
            )
            .service(
                web::scope("/leave-requests")
                    .service(web::resource("").route(web::get().to(leave_request::leave_list)))
                    .service(
                        web::resource("/{leave_id}/approve")
                            .route(web::put().to(leave_request::approve_leave)),
                    )
                    .service(
                        web::resource("/{leave_id}/reject")
                            .route(web::put().to(leave_request::reject_leave)),
                    ),
            )
            .service(
                web::resource("/attendance-report").route(web::get().to(reports::attendance_report)),
            )
            .service(web::resource("/dashboard-stats").route(web::get().to(reports::dashboard_stats)))
            .service(
                web::scope("/departments")
                    .service(web::resource("").route(web::get().to(reports::departments)))
                    .service(
                        web::resource("/{department}/staff")
                            .route(web::get().to(reports::department_staff)),
                    )
                    .service(
                        web::resource("/{department}/attendance-report")
                            .route(web::get().to(reports::department_report)),
                    ),
            )
            .service(
                web::resource("/analytics/staff-changes").route(web::get().to(reports::staff_changes)),
            )
            .service(
                web::scope("/settings")
                    .service(web::resource("").route(web::get().to(settings::all_settings)))
                    .service(
                        web::resource("/{category}")
                            .route(web::get().to(settings::get_settings))
                            .route(web::post().to(settings::update_settings)),
                    ),
            )
            .service(
                web::scope("/notifications")
                    .service(
                        web::resource("/send-reminders")
                            .route(web::post().to(notifications::send_reminders)),
                    )
                    .service(web::resource("/history").route(web::get().to(notifications::history))),
            )
            .service(web::resource("/backup").route(web::post().to(system::backup)))
            .service(web::resource("/reset-system").route(web::post().to(system::reset_system))),
    );
}
