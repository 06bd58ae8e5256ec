mod common;

use std::sync::Arc;

use auth::PasswordHasher;
use auth::RateLimiter;
use auth::TokenService;
use chrono::Duration;
use chrono::SubsecRound;
use chrono::Utc;
use common::CapturingNotifier;
use common::TestDb;
use common::STRONG_PASSWORD;
use common::TEST_SECRET;
use tracker_api::domain::user::models::EmailAddress;
use tracker_api::domain::user::models::NewUser;
use tracker_api::domain::user::models::Profile;
use tracker_api::domain::user::models::RegisterUserCommand;
use tracker_api::domain::user::models::Role;
use tracker_api::domain::user::models::UserId;
use tracker_api::domain::user::ports::UserRepository;
use tracker_api::domain::user::ports::UserServicePort;
use tracker_api::domain::user::service::RateLimits;
use tracker_api::domain::user::service::UserService;
use tracker_api::outbound::repositories::PostgresUserRepository;
use tracker_api::user::errors::UserError;

macro_rules! test_db {
    () => {
        match TestDb::from_env().await {
            Some(db) => db,
            None => {
                eprintln!("DATABASE_URL not set, skipping Postgres test");
                return;
            }
        }
    };
}

fn new_user(email: &str) -> NewUser {
    // Postgres keeps microseconds.
    let now = Utc::now().trunc_subsecs(6);
    NewUser {
        email: EmailAddress::new(email).unwrap(),
        password_hash: "$argon2id$v=19$m=19456,t=1,p=1$c2FsdA$aGFzaA".to_string(),
        name: Some("Alice".to_string()),
        role: Role::User,
        currency: Some("EUR".to_string()),
        profile: Profile {
            address: Some("1 Main St".to_string()),
            phone: None,
        },
        is_verified: false,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn test_create_find_and_count() {
    let db = test_db!();
    let repository = PostgresUserRepository::new(db.pool.clone());

    assert_eq!(repository.count().await.unwrap(), 0);

    let input = new_user("alice@example.com");
    let created = repository.create(input.clone()).await.unwrap();
    assert_eq!(created.email, input.email);
    assert_eq!(created.role, Role::User);
    assert_eq!(created.profile, input.profile);
    assert_eq!(created.created_at, input.created_at);
    assert_eq!(repository.count().await.unwrap(), 1);

    let by_id = repository.find_by_id(&created.id).await.unwrap();
    assert_eq!(by_id, Some(created.clone()));

    let by_email = repository.find_by_email("alice@example.com").await.unwrap();
    assert_eq!(by_email, Some(created));

    assert_eq!(
        repository.find_by_email("nobody@example.com").await.unwrap(),
        None
    );
    assert_eq!(repository.find_by_id(&UserId::new()).await.unwrap(), None);

    db.teardown().await;
}

#[tokio::test]
async fn test_duplicate_email_is_email_in_use() {
    let db = test_db!();
    let repository = PostgresUserRepository::new(db.pool.clone());

    repository.create(new_user("dup@example.com")).await.unwrap();
    let result = repository.create(new_user("dup@example.com")).await;

    assert!(matches!(result, Err(UserError::EmailInUse(email)) if email == "dup@example.com"));
    assert_eq!(repository.count().await.unwrap(), 1);

    db.teardown().await;
}

#[tokio::test]
async fn test_update_replaces_fields() {
    let db = test_db!();
    let repository = PostgresUserRepository::new(db.pool.clone());

    let mut user = repository.create(new_user("alice@example.com")).await.unwrap();
    user.currency = Some("JPY".to_string());
    user.profile.phone = Some("555-0100".to_string());
    user.updated_at = (user.updated_at + Duration::seconds(5)).trunc_subsecs(6);

    repository.update(user.clone()).await.unwrap();

    let stored = repository.find_by_id(&user.id).await.unwrap();
    assert_eq!(stored, Some(user));

    db.teardown().await;
}

#[tokio::test]
async fn test_update_onto_taken_email_is_email_in_use() {
    let db = test_db!();
    let repository = PostgresUserRepository::new(db.pool.clone());

    repository.create(new_user("alice@example.com")).await.unwrap();
    let mut bob = repository.create(new_user("bob@example.com")).await.unwrap();
    bob.email = EmailAddress::new("alice@example.com").unwrap();

    let result = repository.update(bob).await;
    assert!(matches!(result, Err(UserError::EmailInUse(_))));

    db.teardown().await;
}

#[tokio::test]
async fn test_update_and_delete_missing_user_is_not_found() {
    let db = test_db!();
    let repository = PostgresUserRepository::new(db.pool.clone());

    let ghost = new_user("ghost@example.com").with_id(UserId::new());

    let result = repository.update(ghost.clone()).await;
    assert!(matches!(result, Err(UserError::NotFound(_))));

    let result = repository.delete(&ghost.id).await;
    assert!(matches!(result, Err(UserError::NotFound(_))));

    db.teardown().await;
}

#[tokio::test]
async fn test_delete_removes_user() {
    let db = test_db!();
    let repository = PostgresUserRepository::new(db.pool.clone());

    let user = repository.create(new_user("alice@example.com")).await.unwrap();
    repository.delete(&user.id).await.unwrap();

    assert_eq!(repository.find_by_id(&user.id).await.unwrap(), None);
    assert_eq!(repository.count().await.unwrap(), 0);

    db.teardown().await;
}

#[tokio::test]
async fn test_timestamps_out_of_order_are_rejected() {
    let db = test_db!();
    let repository = PostgresUserRepository::new(db.pool.clone());

    let mut input = new_user("alice@example.com");
    input.updated_at = input.created_at - Duration::seconds(1);

    let result = repository.create(input).await;
    assert!(matches!(result, Err(UserError::PersistenceError(_))));

    db.teardown().await;
}

#[tokio::test]
async fn test_registration_against_postgres() {
    let db = test_db!();

    let service = UserService::new(
        Arc::new(PostgresUserRepository::new(db.pool.clone())),
        Arc::new(CapturingNotifier::default()),
        PasswordHasher::with_cost(1),
        Arc::new(TokenService::new(TEST_SECRET)),
        Arc::new(RateLimiter::new()),
        RateLimits::default(),
    );

    let command = |email: &str| RegisterUserCommand {
        email: email.to_string(),
        password: STRONG_PASSWORD.to_string(),
        ..RegisterUserCommand::default()
    };

    let first = service.register_user(command("first@example.com")).await.unwrap();
    assert_eq!(first.role, Role::Admin);

    let second = service.register_user(command("second@example.com")).await.unwrap();
    assert_eq!(second.role, Role::User);

    let duplicate = service.register_user(command("FIRST@example.com")).await;
    assert!(matches!(duplicate, Err(UserError::EmailInUse(_))));

    let session = service
        .authenticate("first@example.com", STRONG_PASSWORD)
        .await
        .unwrap();
    assert_eq!(session.user.id, first.id);

    db.teardown().await;
}
