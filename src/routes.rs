use crate::{
    api::{employee, vacation_request},
    config::Config,
    error::LeaveError,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;

// Helper to build a per-scope limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .expect("period and burst size are non-zero");
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let limiter = build_limiter(config.rate_api_per_min);

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(limiter) // rate limiting
            .configure(register),
    );
}

/// Extractor failures (bad JSON, unknown status, non-numeric ids) come back
/// as validation errors with the same body shape as every other error.
fn extractor_configs(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| LeaveError::validation(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| LeaveError::validation(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| LeaveError::validation(err.to_string()).into()),
    );
}

/// Employee and vacation routes, relative to the API prefix.
pub fn register(cfg: &mut web::ServiceConfig) {
    extractor_configs(cfg);

    cfg.service(
        web::scope("/employee")
            // /employee
            .service(
                web::resource("")
                    .route(web::post().to(employee::create_employee))
                    .route(web::get().to(employee::list_employees)),
            )
            // /employee/{id}
            .service(
                web::resource("/{id}")
                    .route(web::put().to(employee::update_employee))
                    .route(web::get().to(employee::get_employee)),
            )
            // /employee/{id}/balance
            .service(web::resource("/{id}/balance").route(web::get().to(employee::get_balance))),
    )
    .service(
        web::scope("/vacation")
            // /vacation
            .service(
                web::resource("")
                    .route(web::get().to(vacation_request::list_requests))
                    .route(web::post().to(vacation_request::create_request)),
            )
            // /vacation/birthday, before /{id} so it is not taken for an id
            .service(
                web::resource("/birthday")
                    .route(web::post().to(vacation_request::grant_birthday)),
            )
            // /vacation/{id}
            .service(web::resource("/{id}").route(web::get().to(vacation_request::get_request)))
            // /vacation/{id}/status
            .service(
                web::resource("/{id}/status")
                    .route(web::put().to(vacation_request::change_status)),
            )
            // /vacation/{id}/approve
            .service(
                web::resource("/{id}/approve")
                    .route(web::put().to(vacation_request::approve_request)),
            )
            // /vacation/{id}/reject
            .service(
                web::resource("/{id}/reject")
                    .route(web::put().to(vacation_request::reject_request)),
            ),
    );
}
