pub mod appointments;
pub mod calendar;
pub mod catalog;
pub mod clients;
pub mod dashboard;
pub mod health;
pub mod photos;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /clients                                  list (?search=), create
/// /clients/options                          id + name for select boxes
/// /clients/{id}                             get, update, delete
/// /clients/{id}/appointments                history, newest first
/// /clients/{id}/photo-sessions              photo sessions, newest first
///
/// /operators                                list, create
/// /operators/active                         active only
/// /operators/{id}                           get, update, delete
/// /operators/{id}/toggle                    flip active (POST)
///
/// /services                                 list, create
/// /services/active                          active only
/// /services/{id}                            get, update, delete
/// /services/{id}/toggle                     flip active (POST)
///
/// /products                                 list, create
/// /products/{id}                            update, delete
///
/// /service-records                          list (?client_id=), create
/// /service-records/{id}                     delete
///
/// /appointments                             day list (?date=), create
/// /appointments/week                        week list (?date=)
/// /appointments/{id}                        get, update, delete
/// /appointments/{id}/status                 set status (PUT)
/// /appointments/{id}/services               add service (POST)
/// /appointments/{id}/services/{service_id}  remove service (DELETE)
///
/// /calendar/day                             day grid (?date=)
/// /calendar/week                            week grid (?date=)
///
/// /dashboard/today                          daily summary
///
/// /photo-sessions                           create
/// /photo-sessions/{id}                      get, delete
/// /photo-sessions/{id}/notes                update notes (PUT)
/// /photo-sessions/{id}/photos               multipart upload (POST)
/// /photos/{id}                              delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/clients", clients::router())
        .nest("/operators", catalog::operators_router())
        .nest("/services", catalog::services_router())
        .nest("/products", catalog::products_router())
        .nest("/service-records", catalog::service_records_router())
        .nest("/appointments", appointments::router())
        .nest("/calendar", calendar::router())
        .nest("/dashboard", dashboard::router())
        .nest("/photo-sessions", photos::sessions_router())
        .nest("/photos", photos::photos_router())
}
