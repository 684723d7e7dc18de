//! Integration tests for the booking path: overlap guard inside the
//! transaction, service-link invariants and status updates.

use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveDateTime};
use salon_core::appointment::AppointmentStatus;
use salon_core::calendar::{day_bounds, week_bounds};
use salon_core::error::CoreError;
use salon_core::overlap::OverlapPolicy;
use salon_core::types::DbId;
use salon_db::models::appointment::BookingRequest;
use salon_db::models::client::CreateClient;
use salon_db::repositories::{AppointmentRepo, ClientRepo, OperatorRepo};
use salon_db::DbError;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

async fn new_client(pool: &PgPool, last_name: &str) -> DbId {
    ClientRepo::create(
        pool,
        &CreateClient {
            first_name: "Test".to_string(),
            last_name: last_name.to_string(),
            phone: None,
            notes: None,
        },
    )
    .await
    .unwrap()
    .id
}

fn booking(
    client_id: DbId,
    operator_id: &str,
    starts_at: NaiveDateTime,
    services: &[&str],
    duration_minutes: i32,
) -> BookingRequest {
    BookingRequest {
        client_id,
        operator_id: operator_id.to_string(),
        starts_at,
        service_ids: services.iter().map(|s| s.to_string()).collect(),
        duration_minutes,
    }
}

fn conflict_message(err: DbError) -> String {
    match err {
        DbError::Core(CoreError::Conflict(msg)) => msg,
        other => panic!("expected conflict, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Test: Rossi / Bianchi / Taglio scenario
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_overlapping_booking_is_rejected_and_touching_is_allowed(pool: PgPool) {
    let rossi = new_client(&pool, "Rossi").await;
    let bianchi = new_client(&pool, "Bianchi").await;
    let policy = OverlapPolicy::default();

    let first = AppointmentRepo::create(
        &pool,
        &booking(rossi, "op-giulia", at(8, 10, 0), &["srv-taglio"], 30),
        policy,
    )
    .await
    .unwrap();
    assert_eq!(first.status, "confirmed");
    assert_eq!(first.services.len(), 1);
    assert_eq!(first.services[0].position, 1);
    assert_eq!(first.total_price_cents, 2500);

    // 10:15 for 30 minutes collides with Rossi at 10:00.
    let err = AppointmentRepo::create(
        &pool,
        &booking(bianchi, "op-giulia", at(8, 10, 15), &["srv-taglio"], 30),
        policy,
    )
    .await
    .unwrap_err();
    let message = conflict_message(err);
    assert!(message.contains("Rossi"), "{message}");
    assert!(message.contains("10:00"), "{message}");

    // Nothing was written for Bianchi.
    let day = AppointmentRepo::list_in_range(&pool, day_bounds(at(8, 0, 0).date()))
        .await
        .unwrap();
    assert_eq!(day.len(), 1);

    // 10:30 touches the end of Rossi's slot and is accepted.
    let second = AppointmentRepo::create(
        &pool,
        &booking(bianchi, "op-giulia", at(8, 10, 30), &["srv-taglio"], 30),
        policy,
    )
    .await
    .unwrap();
    assert_eq!(second.client_last_name, "Bianchi");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_different_operators_do_not_conflict(pool: PgPool) {
    let rossi = new_client(&pool, "Rossi").await;
    let bianchi = new_client(&pool, "Bianchi").await;
    let policy = OverlapPolicy::default();

    AppointmentRepo::create(
        &pool,
        &booking(rossi, "op-giulia", at(8, 10, 0), &["srv-colore"], 90),
        policy,
    )
    .await
    .unwrap();
    AppointmentRepo::create(
        &pool,
        &booking(bianchi, "op-maria", at(8, 10, 0), &["srv-colore"], 90),
        policy,
    )
    .await
    .unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_references_are_not_found(pool: PgPool) {
    let rossi = new_client(&pool, "Rossi").await;
    let policy = OverlapPolicy::default();

    let err = AppointmentRepo::create(
        &pool,
        &booking(rossi, "op-nobody", at(8, 10, 0), &["srv-taglio"], 30),
        policy,
    )
    .await
    .unwrap_err();
    assert_matches!(err, DbError::Core(CoreError::NotFound { entity: "Operator", .. }));

    let err = AppointmentRepo::create(
        &pool,
        &booking(999_999, "op-giulia", at(8, 10, 0), &["srv-taglio"], 30),
        policy,
    )
    .await
    .unwrap_err();
    assert_matches!(err, DbError::Core(CoreError::NotFound { entity: "Client", .. }));

    let err = AppointmentRepo::create(
        &pool,
        &booking(rossi, "op-giulia", at(8, 10, 0), &["srv-taglio", "srv-ghost"], 30),
        policy,
    )
    .await
    .unwrap_err();
    assert_matches!(
        err,
        DbError::Core(CoreError::NotFound { entity: "Service", ref id }) if id == "srv-ghost"
    );
}

// ---------------------------------------------------------------------------
// Test: update excludes itself and replaces links
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_does_not_conflict_with_itself(pool: PgPool) {
    let rossi = new_client(&pool, "Rossi").await;
    let policy = OverlapPolicy::default();

    let created = AppointmentRepo::create(
        &pool,
        &booking(rossi, "op-giulia", at(8, 10, 0), &["srv-taglio"], 30),
        policy,
    )
    .await
    .unwrap();

    let updated = AppointmentRepo::update(
        &pool,
        created.id,
        &booking(rossi, "op-giulia", at(8, 10, 15), &["srv-piega", "srv-taglio"], 75),
        policy,
    )
    .await
    .unwrap();

    assert_eq!(updated.starts_at, at(8, 10, 15));
    assert_eq!(updated.duration_minutes, 75);
    let ids: Vec<&str> = updated.services.iter().map(|s| s.service_id.as_str()).collect();
    assert_eq!(ids, vec!["srv-piega", "srv-taglio"]);
    let positions: Vec<i32> = updated.services.iter().map(|s| s.position).collect();
    assert_eq!(positions, vec![1, 2]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_into_another_booking_conflicts(pool: PgPool) {
    let rossi = new_client(&pool, "Rossi").await;
    let bianchi = new_client(&pool, "Bianchi").await;
    let policy = OverlapPolicy::default();

    AppointmentRepo::create(
        &pool,
        &booking(rossi, "op-giulia", at(8, 10, 0), &["srv-taglio"], 30),
        policy,
    )
    .await
    .unwrap();
    let other = AppointmentRepo::create(
        &pool,
        &booking(bianchi, "op-giulia", at(8, 11, 0), &["srv-taglio"], 30),
        policy,
    )
    .await
    .unwrap();

    let err = AppointmentRepo::update(
        &pool,
        other.id,
        &booking(bianchi, "op-giulia", at(8, 10, 20), &["srv-taglio"], 30),
        policy,
    )
    .await
    .unwrap_err();
    assert!(conflict_message(err).contains("Rossi"));

    let unchanged = AppointmentRepo::find_detail(&pool, other.id).await.unwrap().unwrap();
    assert_eq!(unchanged.starts_at, at(8, 11, 0));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_missing_appointment_is_not_found(pool: PgPool) {
    let rossi = new_client(&pool, "Rossi").await;
    let err = AppointmentRepo::update(
        &pool,
        424_242,
        &booking(rossi, "op-giulia", at(8, 10, 0), &["srv-taglio"], 30),
        OverlapPolicy::default(),
    )
    .await
    .unwrap_err();
    assert_matches!(err, DbError::Core(CoreError::NotFound { entity: "Appointment", .. }));
}

// ---------------------------------------------------------------------------
// Test: cancelled appointments and the overlap policy
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_cancelled_slot_is_free_unless_policy_blocks(pool: PgPool) {
    let rossi = new_client(&pool, "Rossi").await;
    let bianchi = new_client(&pool, "Bianchi").await;

    let created = AppointmentRepo::create(
        &pool,
        &booking(rossi, "op-giulia", at(8, 10, 0), &["srv-taglio"], 30),
        OverlapPolicy::default(),
    )
    .await
    .unwrap();
    AppointmentRepo::set_status(&pool, created.id, AppointmentStatus::Cancelled)
        .await
        .unwrap()
        .unwrap();

    let strict = OverlapPolicy { cancelled_blocks: true };
    let err = AppointmentRepo::create(
        &pool,
        &booking(bianchi, "op-giulia", at(8, 10, 0), &["srv-taglio"], 30),
        strict,
    )
    .await
    .unwrap_err();
    assert!(conflict_message(err).contains("Rossi"));

    AppointmentRepo::create(
        &pool,
        &booking(bianchi, "op-giulia", at(8, 10, 0), &["srv-taglio"], 30),
        OverlapPolicy::default(),
    )
    .await
    .unwrap();
}

// ---------------------------------------------------------------------------
// Test: status
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_status_update_is_idempotent(pool: PgPool) {
    let rossi = new_client(&pool, "Rossi").await;
    let created = AppointmentRepo::create(
        &pool,
        &booking(rossi, "op-giulia", at(8, 10, 0), &["srv-taglio"], 30),
        OverlapPolicy::default(),
    )
    .await
    .unwrap();

    let first = AppointmentRepo::set_status(&pool, created.id, AppointmentStatus::Completed)
        .await
        .unwrap()
        .unwrap();
    let second = AppointmentRepo::set_status(&pool, created.id, AppointmentStatus::Completed)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.status, "completed");
    assert_eq!(second.status, "completed");
    assert_eq!(first.updated_at, second.updated_at);
    assert_eq!(second.starts_at, created.starts_at);

    // Back to confirmed is allowed.
    let reverted = AppointmentRepo::set_status(&pool, created.id, AppointmentStatus::Confirmed)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reverted.status, "confirmed");

    assert!(AppointmentRepo::set_status(&pool, 999_999, AppointmentStatus::Completed)
        .await
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// Test: service links
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_add_and_remove_services(pool: PgPool) {
    let rossi = new_client(&pool, "Rossi").await;
    let created = AppointmentRepo::create(
        &pool,
        &booking(rossi, "op-giulia", at(8, 10, 0), &["srv-taglio"], 30),
        OverlapPolicy::default(),
    )
    .await
    .unwrap();

    let err = AppointmentRepo::add_service(&pool, created.id, "srv-taglio")
        .await
        .unwrap_err();
    assert_matches!(err, DbError::Core(CoreError::Invariant(_)));

    let added = AppointmentRepo::add_service(&pool, created.id, "srv-piega")
        .await
        .unwrap();
    assert_eq!(added.duration_minutes, 75);
    assert_eq!(added.services.len(), 2);
    assert_eq!(added.services[1].service_id, "srv-piega");
    assert_eq!(added.services[1].position, 2);
    assert_eq!(added.total_price_cents, 4500);

    let removed = AppointmentRepo::remove_service(&pool, created.id, "srv-taglio")
        .await
        .unwrap();
    assert_eq!(removed.duration_minutes, 45);
    assert_eq!(removed.services.len(), 1);
    assert_eq!(removed.services[0].service_id, "srv-piega");

    let err = AppointmentRepo::remove_service(&pool, created.id, "srv-piega")
        .await
        .unwrap_err();
    assert_matches!(err, DbError::Core(CoreError::Invariant(_)));

    let err = AppointmentRepo::remove_service(&pool, created.id, "srv-colore")
        .await
        .unwrap_err();
    assert_matches!(
        err,
        DbError::Core(CoreError::NotFound { entity: "AppointmentService", .. })
    );

    // The appointment still has exactly one service.
    let detail = AppointmentRepo::find_detail(&pool, created.id).await.unwrap().unwrap();
    assert_eq!(detail.services.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_add_service_to_missing_appointment(pool: PgPool) {
    let err = AppointmentRepo::add_service(&pool, 999_999, "srv-piega")
        .await
        .unwrap_err();
    assert_matches!(err, DbError::Core(CoreError::NotFound { entity: "Appointment", .. }));
}

// ---------------------------------------------------------------------------
// Test: listings and delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_week_listing_and_delete(pool: PgPool) {
    let rossi = new_client(&pool, "Rossi").await;
    let policy = OverlapPolicy::default();

    // Monday 8th through Sunday 14th, plus one the following Monday.
    for (day, hour) in [(8, 9), (10, 14), (14, 23), (15, 9)] {
        AppointmentRepo::create(
            &pool,
            &booking(rossi, "op-anna", at(day, hour, 0), &["srv-taglio"], 30),
            policy,
        )
        .await
        .unwrap();
    }

    let week = AppointmentRepo::list_in_range(&pool, week_bounds(at(10, 0, 0).date()))
        .await
        .unwrap();
    let starts: Vec<NaiveDateTime> = week.iter().map(|a| a.starts_at).collect();
    assert_eq!(starts, vec![at(8, 9, 0), at(10, 14, 0), at(14, 23, 0)]);

    let history = AppointmentRepo::list_for_client(&pool, rossi).await.unwrap();
    assert_eq!(history.len(), 4);
    assert_eq!(history[0].starts_at, at(15, 9, 0));

    assert!(AppointmentRepo::delete(&pool, history[0].id).await.unwrap());
    assert!(!AppointmentRepo::delete(&pool, history[0].id).await.unwrap());
    assert!(AppointmentRepo::find_detail(&pool, history[0].id)
        .await
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// Test: operator delete guard
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_operator_with_appointments_cannot_be_deleted(pool: PgPool) {
    let rossi = new_client(&pool, "Rossi").await;
    AppointmentRepo::create(
        &pool,
        &booking(rossi, "op-maria", at(8, 10, 0), &["srv-taglio"], 30),
        OverlapPolicy::default(),
    )
    .await
    .unwrap();

    let err = OperatorRepo::delete(&pool, "op-maria").await.unwrap_err();
    assert_matches!(err, DbError::Core(CoreError::Invariant(ref msg)) if msg.contains('1'));
    assert!(OperatorRepo::find_by_id(&pool, "op-maria").await.unwrap().is_some());

    assert!(OperatorRepo::delete(&pool, "op-anna").await.unwrap());
    assert!(!OperatorRepo::delete(&pool, "op-anna").await.unwrap());
}

// ---------------------------------------------------------------------------
// Test: concurrent bookings for one operator
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_bookings_for_one_slot_admit_exactly_one(pool: PgPool) {
    let mut clients = Vec::new();
    for name in ["Rossi", "Bianchi", "Verdi", "Neri"] {
        clients.push(new_client(&pool, name).await);
    }

    let handles: Vec<_> = clients
        .into_iter()
        .map(|client_id| {
            let pool = pool.clone();
            tokio::spawn(async move {
                AppointmentRepo::create(
                    &pool,
                    &booking(client_id, "op-giulia", at(8, 10, 0), &["srv-taglio"], 30),
                    OverlapPolicy::default(),
                )
                .await
            })
        })
        .collect();

    let mut booked = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => booked += 1,
            Err(err) => assert!(conflict_message(err).contains("10:00")),
        }
    }
    assert_eq!(booked, 1);

    let day = day_bounds(NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
    let stored = AppointmentRepo::list_in_range(&pool, day).await.unwrap();
    assert_eq!(stored.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_move_and_create_into_one_slot(pool: PgPool) {
    let rossi = new_client(&pool, "Rossi").await;
    let bianchi = new_client(&pool, "Bianchi").await;
    let policy = OverlapPolicy::default();

    let existing = AppointmentRepo::create(
        &pool,
        &booking(rossi, "op-giulia", at(8, 9, 0), &["srv-taglio"], 30),
        policy,
    )
    .await
    .unwrap();

    let move_pool = pool.clone();
    let moving = tokio::spawn(async move {
        AppointmentRepo::update(
            &move_pool,
            existing.id,
            &booking(rossi, "op-giulia", at(8, 10, 0), &["srv-taglio"], 30),
            policy,
        )
        .await
    });
    let create_pool = pool.clone();
    let creating = tokio::spawn(async move {
        AppointmentRepo::create(
            &create_pool,
            &booking(bianchi, "op-giulia", at(8, 10, 15), &["srv-taglio"], 30),
            policy,
        )
        .await
    });

    let outcomes = [
        moving.await.unwrap().map(|_| ()),
        creating.await.unwrap().map(|_| ()),
    ];
    let succeeded = outcomes.iter().filter(|o| o.is_ok()).count();
    assert_eq!(succeeded, 1);
    for outcome in outcomes {
        if let Err(err) = outcome {
            conflict_message(err);
        }
    }

    let day = day_bounds(NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
    let stored = AppointmentRepo::list_in_range(&pool, day).await.unwrap();
    let from_ten = stored.iter().filter(|a| a.starts_at >= at(8, 10, 0)).count();
    assert_eq!(from_ten, 1);
}
