use chrono::Utc;
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, Set};
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

use selfstorage::db;
use selfstorage::jobs::{worker, EmailJob, JobKind, JobQueue};
use selfstorage::mailer::Mailer;
use selfstorage::models::scheduled_job;

// Helper to create a test database
async fn setup_test_db() -> DatabaseConnection {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    db
}

fn email(subject: &str) -> EmailJob {
    EmailJob {
        subject: subject.to_string(),
        body: "Body text".to_string(),
        recipient: "tenant@example.com".to_string(),
    }
}

#[tokio::test]
async fn test_enqueue_orders_by_run_at() {
    let db = setup_test_db().await;
    let queue = JobQueue::new(db.clone());

    let now = Utc::now();
    let later = queue
        .enqueue(
            JobKind::SendEmail,
            &email("later"),
            now + chrono::Duration::hours(2),
        )
        .await
        .unwrap();
    let sooner = queue
        .enqueue(
            JobKind::SendEmail,
            &email("sooner"),
            now + chrono::Duration::hours(1),
        )
        .await
        .unwrap();

    let next = queue.peek_next().await.unwrap().unwrap();
    assert_eq!(next.id, sooner);
    assert_ne!(next.id, later);
}

#[tokio::test]
async fn test_pop_due_returns_only_due_jobs() {
    let db = setup_test_db().await;
    let queue = JobQueue::new(db.clone());

    let now = Utc::now();
    let due = queue
        .enqueue(
            JobKind::SendEmail,
            &email("due"),
            now - chrono::Duration::minutes(5),
        )
        .await
        .unwrap();
    let _future = queue
        .enqueue(
            JobKind::SendEmail,
            &email("future"),
            now + chrono::Duration::hours(1),
        )
        .await
        .unwrap();

    let popped = queue.pop_due(&Utc::now()).await.unwrap().unwrap();
    assert_eq!(popped.id, due);

    // The future job stays queued
    assert!(queue.pop_due(&Utc::now()).await.unwrap().is_none());
    let remaining = scheduled_job::Entity::find().count(&db).await.unwrap();
    assert_eq!(remaining, 1);
}

#[tokio::test]
async fn test_revoked_jobs_are_not_popped() {
    let db = setup_test_db().await;
    let queue = JobQueue::new(db.clone());

    let id = queue
        .enqueue(
            JobKind::SendEmail,
            &email("revoked"),
            Utc::now() - chrono::Duration::minutes(5),
        )
        .await
        .unwrap();
    queue.revoke(&id).await.unwrap();

    assert!(queue.pop_due(&Utc::now()).await.unwrap().is_none());
    assert!(queue.peek_next().await.unwrap().is_none());
}

#[tokio::test]
async fn test_revoke_unknown_id_is_noop() {
    let db = setup_test_db().await;
    let queue = JobQueue::new(db.clone());

    queue.revoke("no-such-job").await.unwrap();
}

#[tokio::test]
async fn test_mailer_posts_to_gateway() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({
            "to": "tenant@example.com",
            "subject": "Hello"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mailer = Mailer::new(
        Some(mock_server.uri()),
        "noreply@selfstorage.example".to_string(),
    );
    mailer
        .send("Hello", "Body text", "tenant@example.com")
        .await
        .expect("Send should succeed");
}

#[tokio::test]
async fn test_mailer_reports_gateway_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let mailer = Mailer::new(
        Some(mock_server.uri()),
        "noreply@selfstorage.example".to_string(),
    );
    let err = mailer
        .send("Hello", "Body text", "tenant@example.com")
        .await
        .unwrap_err();
    assert!(err.contains("500"));
}

#[tokio::test]
async fn test_mailer_without_gateway_drops_mail() {
    let mailer = Mailer::new(None, "noreply@selfstorage.example".to_string());
    mailer
        .send("Hello", "Body text", "tenant@example.com")
        .await
        .expect("Dropping mail should not error");
}

#[tokio::test]
async fn test_send_email_job_flows_through_worker() {
    let db = setup_test_db().await;
    let queue = JobQueue::new(db.clone());

    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({
            "to": "tenant@example.com",
            "subject": "Your rental"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mailer = Mailer::new(
        Some(mock_server.uri()),
        "noreply@selfstorage.example".to_string(),
    );

    queue
        .enqueue(
            JobKind::SendEmail,
            &email("Your rental"),
            Utc::now() - chrono::Duration::minutes(1),
        )
        .await
        .unwrap();

    let executed = worker::run_due_jobs(&db, &queue, &mailer).await.unwrap();
    assert_eq!(executed, 1);
    assert!(queue.peek_next().await.unwrap().is_none());
}

#[tokio::test]
async fn test_unknown_job_kind_is_skipped() {
    let db = setup_test_db().await;
    let queue = JobQueue::new(db.clone());

    let job = scheduled_job::ActiveModel {
        id: Set("job-x".to_string()),
        kind: Set("mystery".to_string()),
        payload: Set("{}".to_string()),
        run_at: Set((Utc::now() - chrono::Duration::minutes(1)).to_rfc3339()),
        is_revoked: Set(false),
        created_at: Set(Utc::now().to_rfc3339()),
    };
    scheduled_job::Entity::insert(job).exec(&db).await.unwrap();

    let mailer = Mailer::new(None, "noreply@selfstorage.example".to_string());
    let executed = worker::run_due_jobs(&db, &queue, &mailer).await.unwrap();

    // Popped and logged, not retried forever
    assert_eq!(executed, 1);
    assert!(queue.peek_next().await.unwrap().is_none());
}
