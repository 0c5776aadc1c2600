//! Integration tests for User repository using in-memory SurrealDB.

use registrar_core::error::RegistrarError;
use registrar_core::models::user::{NewUser, Role};
use registrar_core::repository::UserRepository;
use registrar_db::repository::SurrealUserRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> SurrealUserRepository<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    registrar_db::run_migrations(&db).await.unwrap();
    SurrealUserRepository::new(db)
}

fn new_user(username: &str) -> NewUser {
    NewUser {
        username: username.into(),
        email: format!("{username}@example.com"),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaGhhc2g".into(),
        role: Role::User,
    }
}

#[tokio::test]
async fn create_and_get_user() {
    let repo = setup().await;

    let user = repo.create(new_user("alice")).await.unwrap();

    assert_eq!(user.username, "alice");
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.role, Role::User);
    assert!(user.password_hash.starts_with("$argon2id$"));

    let fetched = repo.get_by_id(user.id).await.unwrap();
    assert_eq!(fetched.id, user.id);
    assert_eq!(fetched.username, "alice");

    let by_name = repo.get_by_username("alice").await.unwrap();
    assert_eq!(by_name.id, user.id);
    assert_eq!(by_name.password_hash, user.password_hash);
}

#[tokio::test]
async fn role_is_persisted() {
    let repo = setup().await;

    let user = repo
        .create(NewUser {
            role: Role::Teacher,
            ..new_user("tina")
        })
        .await
        .unwrap();

    let fetched = repo.get_by_username("tina").await.unwrap();
    assert_eq!(fetched.role, Role::Teacher);
    assert_eq!(fetched.id, user.id);
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let repo = setup().await;

    repo.create(new_user("alice")).await.unwrap();
    let err = repo.create(new_user("alice")).await.unwrap_err();

    assert!(
        matches!(err, RegistrarError::AlreadyExists { .. }),
        "expected AlreadyExists, got: {err:?}"
    );
}

#[tokio::test]
async fn username_lookup_is_case_sensitive() {
    let repo = setup().await;

    repo.create(new_user("alice")).await.unwrap();

    let err = repo.get_by_username("Alice").await.unwrap_err();
    assert!(err.is_not_found());

    // A differently-cased name is a distinct identity.
    repo.create(new_user("Alice")).await.unwrap();
}

#[tokio::test]
async fn unknown_username_is_not_found() {
    let repo = setup().await;

    let err = repo.get_by_username("nobody").await.unwrap_err();
    assert!(matches!(err, RegistrarError::NotFound { .. }));
}

#[tokio::test]
async fn delete_removes_user() {
    let repo = setup().await;

    let user = repo.create(new_user("bob")).await.unwrap();
    repo.delete(user.id).await.unwrap();

    assert!(repo.get_by_username("bob").await.unwrap_err().is_not_found());
    assert!(repo.get_by_id(user.id).await.unwrap_err().is_not_found());
    assert!(repo.delete(user.id).await.unwrap_err().is_not_found());
}
