//! Integration tests for gonetwork.
#![allow(clippy::panic, clippy::unwrap_used, clippy::too_many_lines)]

use chrono::{Duration, NaiveDate, Utc};
use gonetwork::format::format_status;
use gonetwork::models::{AccessLevel, DeliverableStatus, EventStatus};
use gonetwork::services::{
    AuthService, ClientService, DashboardService, DeliverableService, EventService, NewClient,
    NewDeliverable, NewEvent, NewUser,
};
use gonetwork::session::{IdentityKind, SessionState};
use gonetwork::storage::{CacheSettings, InvalidationPolicy};
use gonetwork::{Database, Error, NotificationStore, Session, Severity, SqlValue};
use std::sync::Arc;
use tempfile::TempDir;

fn open(dir: &TempDir, invalidation: InvalidationPolicy) -> Arc<Database> {
    let settings = CacheSettings {
        invalidation,
        ..CacheSettings::default()
    };
    let path = dir.path().join("data").join("gonetwork.db");
    Arc::new(Database::open_with(path, settings).unwrap())
}

fn insert_client(db: &Database, id: &str, company: &str) {
    db.write(
        "INSERT INTO clients (id, company, created_at) VALUES (?1, ?2, ?3)",
        &[
            SqlValue::from(id),
            SqlValue::from(company),
            SqlValue::from("2025-01-01T00:00:00"),
        ],
    )
    .unwrap();
}

#[test]
fn test_acme_end_to_end() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir, InvalidationPolicy::OnWrite);
    let clients = ClientService::new(Arc::clone(&db));
    let events = EventService::new(Arc::clone(&db));
    let deliverables = DeliverableService::new(Arc::clone(&db));

    let acme = clients
        .create(NewClient::new("Acme").with_contact("Wile E."))
        .unwrap();
    let launch = events
        .create(NewEvent::new("Acme Launch", "2025-09-10T19:00:00").for_client(&acme.id))
        .unwrap();
    let video = deliverables
        .create(
            NewDeliverable::new(&launch.id, "Aftermovie")
                .for_client(&acme.id)
                .due("2025-09-20")
                .with_progress(100),
        )
        .unwrap();

    assert_eq!(video.status, DeliverableStatus::Completed);
    assert_eq!(format_status(video.status.as_str()), "✅ Concluído");

    let err = clients.delete(&acme.id).unwrap_err();
    assert!(matches!(err, Error::ConstraintViolated { .. }), "got {err:?}");
    assert_eq!(clients.list().unwrap().len(), 1);

    let err = events.delete(&launch.id).unwrap_err();
    assert!(matches!(err, Error::ConstraintViolated { .. }), "got {err:?}");

    deliverables.delete(&video.id).unwrap();
    events.delete(&launch.id).unwrap();
    clients.delete(&acme.id).unwrap();
    assert!(clients.list().unwrap().is_empty());
    assert!(events.list().unwrap().is_empty());
}

#[test]
fn test_ttl_only_policy_serves_stale_reads() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir, InvalidationPolicy::TtlOnly);
    let query = "SELECT company FROM clients ORDER BY company";

    assert!(db.read(query, &[]).unwrap().is_empty());
    insert_client(&db, "c1", "Acme");
    assert!(db.read(query, &[]).unwrap().is_empty());
    assert_eq!(db.read_uncached(query, &[]).unwrap().len(), 1);
}

#[test]
fn test_on_write_policy_reflects_writes() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir, InvalidationPolicy::OnWrite);
    let query = "SELECT company FROM clients ORDER BY company";

    assert!(db.read(query, &[]).unwrap().is_empty());
    insert_client(&db, "c1", "Acme");
    let rows = db.read(query, &[]).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].text("company").unwrap(), "Acme");
}

#[test]
fn test_missing_file_is_a_connection_error() {
    let dir = TempDir::new().unwrap();
    let db = Database::new(dir.path().join("absent.db"), CacheSettings::default());
    let err = db.read("SELECT 1", &[]).unwrap_err();
    assert!(matches!(err, Error::ConnectionFailed { .. }), "got {err:?}");
    assert!(db.read_or_empty("SELECT 1", &[]).is_empty());
    assert!(!db.write_or_false("DELETE FROM clients", &[]));
}

#[test]
fn test_login_then_idle_timeout() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir, InvalidationPolicy::OnWrite);
    let auth = AuthService::new(Arc::clone(&db));
    auth.create_user(NewUser::new("ana", "s3cret", AccessLevel::Manager))
        .unwrap();

    assert!(matches!(
        auth.authenticate("ana", "wrong"),
        Err(Error::Unauthorized(_))
    ));
    let identity = auth.authenticate("ana", "s3cret").unwrap();
    assert_eq!(identity.kind, IdentityKind::Staff);

    let mut session = Session::new();
    session.login_at(identity, Utc::now() - Duration::seconds(7201));
    assert_eq!(session.state(), SessionState::Authenticated);
    assert!(session.check_timeout());
    assert_eq!(session.state(), SessionState::Anonymous);
}

#[test]
fn test_recent_activity_keeps_session() {
    let mut session = Session::new();
    let identity = gonetwork::UserIdentity {
        id: "u1".to_string(),
        username: "ana".to_string(),
        name: "Ana".to_string(),
        access_level: AccessLevel::Admin,
        kind: IdentityKind::Staff,
    };
    session.login_at(identity, Utc::now() - Duration::seconds(60));
    assert!(!session.check_timeout());
    session.touch();
    assert!(session.is_authenticated());
}

#[test]
fn test_zero_ttl_notification_disappears() {
    let mut store = NotificationStore::new();
    let now = Utc::now();
    store.add_at(now, "Evento salvo", Severity::Success, 0, None);
    store.add_at(now, "Prazo amanhã", Severity::Warning, 30, Some("ana"));

    let visible = store.list_at(now + Duration::seconds(1), false, Some("ana"));
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].message, "Prazo amanhã");
}

#[test]
fn test_dashboard_over_services() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir, InvalidationPolicy::OnWrite);
    let events = EventService::new(Arc::clone(&db));
    let deliverables = DeliverableService::new(Arc::clone(&db));

    let gala = events.create(NewEvent::new("Gala", "2025-03-01")).unwrap();
    events.update_status(&gala.id, EventStatus::Completed).unwrap();
    deliverables
        .create(NewDeliverable::new(&gala.id, "Photos").due("2025-03-05"))
        .unwrap();

    let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
    let summary = DashboardService::new(Arc::clone(&db)).summary(today).unwrap();
    assert_eq!(summary.events, 1);
    assert_eq!(summary.events_by_status.get("completed"), Some(&1));
    assert_eq!(summary.deliverables_overdue, 1);
}
