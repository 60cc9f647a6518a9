//! Integration tests for the User repository using in-memory SurrealDB.

use chrono::{Duration, Utc};
use conectar_core::error::MarketError;
use conectar_core::models::user::{
    Counter, CreateUser, FreelancerFilter, Plan, Role, UpdateUser, VisitRecord,
};
use conectar_core::repository::UserRepository;
use conectar_core::stats::record_visit;
use conectar_db::repository::SurrealUserRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    conectar_db::run_migrations(&db).await.unwrap();
    db
}

fn new_user(email: &str, role: Role) -> CreateUser {
    CreateUser {
        first_name: " Ana ".into(),
        last_name: "Paz".into(),
        email: email.into(),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".into(),
        role,
    }
}

#[tokio::test]
async fn create_and_get_user() {
    let repo = SurrealUserRepository::new(setup().await);

    let user = repo
        .create(new_user("ana@example.com", Role::Client))
        .await
        .unwrap();

    assert_eq!(user.first_name, "Ana");
    assert_eq!(user.email, "ana@example.com");
    assert_eq!(user.role, Role::Client);
    assert_eq!(user.plan, Plan::Free);
    assert!(user.is_available);
    assert!(user.skills.is_empty());
    assert_eq!(user.visit_count, 0);
    assert!(user.opinion_ids.is_empty());

    let fetched = repo.get_by_id(user.id).await.unwrap();
    assert_eq!(fetched.id, user.id);
    assert_eq!(fetched.password_hash, user.password_hash);

    let by_email = repo.get_by_email("ana@example.com").await.unwrap();
    assert_eq!(by_email.id, user.id);
}

#[tokio::test]
async fn fetched_user_never_serializes_password_hash() {
    let repo = SurrealUserRepository::new(setup().await);
    let user = repo
        .create(new_user("ana@example.com", Role::Client))
        .await
        .unwrap();

    let fetched = repo.get_by_id(user.id).await.unwrap();
    let json = serde_json::to_value(&fetched).unwrap();
    assert!(json.get("password_hash").is_none());
    assert!(!json.to_string().contains("argon2"));
    assert_eq!(json["role"], "cliente");
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let repo = SurrealUserRepository::new(setup().await);
    repo.create(new_user("dup@example.com", Role::Client))
        .await
        .unwrap();

    let err = repo
        .create(new_user("dup@example.com", Role::Freelancer))
        .await
        .unwrap_err();
    assert!(matches!(err, MarketError::AlreadyExists { .. }));
    assert!(repo.email_exists("dup@example.com").await.unwrap());
    assert!(!repo.email_exists("other@example.com").await.unwrap());
}

#[tokio::test]
async fn concurrent_signups_with_one_email_report_already_exists() {
    let repo = SurrealUserRepository::new(setup().await);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let repo = repo.clone();
            tokio::spawn(async move {
                repo.create(new_user("carrera@example.com", Role::Client)).await
            })
        })
        .collect();

    let (mut created, mut duplicates) = (0, 0);
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(MarketError::AlreadyExists { .. }) => duplicates += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(created, 1);
    assert_eq!(duplicates, 3);
    assert_eq!(repo.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn missing_user_is_not_found() {
    let repo = SurrealUserRepository::new(setup().await);
    let err = repo.get_by_id(uuid::Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, MarketError::NotFound { .. }));

    let err = repo
        .increment_counter(uuid::Uuid::new_v4(), Counter::LinkedinAccess)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketError::NotFound { .. }));
}

#[tokio::test]
async fn partial_update_keeps_other_fields() {
    let repo = SurrealUserRepository::new(setup().await);
    let user = repo
        .create(new_user("ana@example.com", Role::Client))
        .await
        .unwrap();

    let updated = repo
        .update(
            user.id,
            UpdateUser {
                role: Some(Role::Freelancer),
                linkedin: Some("https://www.linkedin.com/in/ana".into()),
                description: Some("Diseño UX".into()),
                rate: Some(30.5),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.role, Role::Freelancer);
    assert_eq!(updated.linkedin.as_deref(), Some("https://www.linkedin.com/in/ana"));
    assert_eq!(updated.rate, Some(30.5));
    assert_eq!(updated.email, "ana@example.com");
    assert_eq!(updated.first_name, "Ana");
    assert!(updated.updated_at >= user.updated_at);
}

#[tokio::test]
async fn update_to_taken_email_is_rejected() {
    let repo = SurrealUserRepository::new(setup().await);
    repo.create(new_user("a@example.com", Role::Client))
        .await
        .unwrap();
    let b = repo
        .create(new_user("b@example.com", Role::Client))
        .await
        .unwrap();

    let err = repo
        .update(
            b.id,
            UpdateUser {
                email: Some("a@example.com".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MarketError::AlreadyExists { .. }));

    // Re-saving one's own email is fine.
    repo.update(
        b.id,
        UpdateUser {
            email: Some("b@example.com".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn skills_limit() {
    let repo = SurrealUserRepository::new(setup().await);
    let user = repo
        .create(new_user("ana@example.com", Role::Freelancer))
        .await
        .unwrap();

    let five: Vec<String> = ["RUST", "GO", "SQL", "DOCKER", "AWS"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let saved = repo.set_skills(user.id, five.clone()).await.unwrap();
    assert_eq!(saved.skills, five);

    let mut six = five.clone();
    six.push("K8S".into());
    let err = repo.set_skills(user.id, six).await.unwrap_err();
    assert!(matches!(err, MarketError::Validation { .. }));

    let unchanged = repo.get_by_id(user.id).await.unwrap();
    assert_eq!(unchanged.skills, five);
}

#[tokio::test]
async fn counters_increment_atomically() {
    let repo = SurrealUserRepository::new(setup().await);
    let user = repo
        .create(new_user("ana@example.com", Role::Freelancer))
        .await
        .unwrap();

    repo.increment_counter(user.id, Counter::LinkedinAccess)
        .await
        .unwrap();
    repo.increment_counter(user.id, Counter::LinkedinAccess)
        .await
        .unwrap();
    let after = repo
        .increment_counter(user.id, Counter::PortfolioAccess)
        .await
        .unwrap();

    assert_eq!(after.linkedin_access_count, 2);
    assert_eq!(after.portfolio_access_count, 1);
    assert_eq!(after.visit_count, 0);
}

#[tokio::test]
async fn visit_history_round_trips_through_the_store() {
    let repo = SurrealUserRepository::new(setup().await);
    let created = repo
        .create(new_user("ana@example.com", Role::Freelancer))
        .await
        .unwrap();

    let t0 = Utc::now();
    let mut user = repo.get_by_id(created.id).await.unwrap();
    assert!(record_visit(&mut user, "10.0.0.1", t0).counted);
    repo.save_visits(user.id, user.visit_history.clone(), user.visit_count)
        .await
        .unwrap();

    let mut user = repo.get_by_id(created.id).await.unwrap();
    assert_eq!(user.visit_count, 1);
    assert_eq!(user.visit_history.len(), 1);
    assert_eq!(user.visit_history[0].ip, "10.0.0.1");

    assert!(!record_visit(&mut user, "10.0.0.1", t0 + Duration::hours(1)).counted);
    assert!(record_visit(&mut user, "10.0.0.1", t0 + Duration::hours(25)).counted);
    let saved = repo
        .save_visits(user.id, user.visit_history.clone(), user.visit_count)
        .await
        .unwrap();
    assert_eq!(saved.visit_count, 2);
    assert_eq!(
        saved.visit_history,
        vec![VisitRecord {
            ip: "10.0.0.1".into(),
            last_visit: user.visit_history[0].last_visit,
        }]
    );
}

#[tokio::test]
async fn freelancer_filters() {
    let repo = SurrealUserRepository::new(setup().await);
    let client = repo
        .create(new_user("client@example.com", Role::Client))
        .await
        .unwrap();
    let free = repo
        .create(new_user("free@example.com", Role::Freelancer))
        .await
        .unwrap();
    let premium = repo
        .create(new_user("premium@example.com", Role::Freelancer))
        .await
        .unwrap();
    repo.update(
        premium.id,
        UpdateUser {
            plan: Some(Plan::Premium),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    repo.update(
        free.id,
        UpdateUser {
            is_available: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let all = repo
        .list_freelancers(FreelancerFilter::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|u| u.id != client.id));

    let premium_only = repo
        .list_freelancers(FreelancerFilter {
            premium_only: true,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(premium_only.len(), 1);
    assert_eq!(premium_only[0].id, premium.id);

    let available = repo
        .list_freelancers(FreelancerFilter {
            available_only: true,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].id, premium.id);

    let by_id = repo
        .list_freelancers(FreelancerFilter {
            ids: Some(vec![free.id, client.id]),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_id.len(), 1);
    assert_eq!(by_id[0].id, free.id);

    assert_eq!(repo.list().await.unwrap().len(), 3);
}
