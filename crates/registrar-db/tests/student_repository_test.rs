//! Integration tests for Student repository using in-memory SurrealDB.

use registrar_core::error::RegistrarError;
use registrar_core::models::student::StudentInput;
use registrar_core::repository::StudentRepository;
use registrar_db::repository::SurrealStudentRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> SurrealStudentRepository<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    registrar_db::run_migrations(&db).await.unwrap();
    SurrealStudentRepository::new(db)
}

fn alice() -> StudentInput {
    StudentInput {
        name: "Alice Smith".into(),
        age: 15,
        grade: "10th".into(),
        email: "alice@example.com".into(),
    }
}

#[tokio::test]
async fn create_and_get_student() {
    let repo = setup().await;

    let student = repo.create(alice(), "john").await.unwrap();
    assert_eq!(student.name, "Alice Smith");
    assert_eq!(student.age, 15);
    assert_eq!(student.created_by, "john");

    let fetched = repo.get(&student.id.to_string()).await.unwrap();
    assert_eq!(fetched, student);
}

#[tokio::test]
async fn list_returns_all_students() {
    let repo = setup().await;

    assert!(repo.list().await.unwrap().is_empty());

    repo.create(alice(), "john").await.unwrap();
    repo.create(
        StudentInput {
            name: "Sara".into(),
            age: 21,
            grade: "12th".into(),
            email: "sara@example.com".into(),
        },
        "john",
    )
    .await
    .unwrap();

    let students = repo.list().await.unwrap();
    assert_eq!(students.len(), 2);
    let mut names: Vec<_> = students.iter().map(|s| s.name.as_str()).collect();
    names.sort();
    assert_eq!(names, ["Alice Smith", "Sara"]);
}

#[tokio::test]
async fn update_replaces_fields() {
    let repo = setup().await;
    let student = repo.create(alice(), "john").await.unwrap();

    let updated = repo
        .update(
            &student.id.to_string(),
            StudentInput {
                age: 16,
                grade: "11th".into(),
                ..alice()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.id, student.id);
    assert_eq!(updated.age, 16);
    assert_eq!(updated.grade, "11th");
    assert_eq!(updated.created_by, "john");
}

#[tokio::test]
async fn delete_removes_student() {
    let repo = setup().await;
    let student = repo.create(alice(), "john").await.unwrap();
    let id = student.id.to_string();

    repo.delete(&id).await.unwrap();

    assert!(repo.get(&id).await.unwrap_err().is_not_found());
    assert!(repo.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn malformed_id_is_distinct_from_missing_record() {
    let repo = setup().await;
    let missing = Uuid::new_v4().to_string();

    for err in [
        repo.get("not-a-uuid").await.unwrap_err(),
        repo.update("not-a-uuid", alice()).await.unwrap_err(),
        repo.delete("not-a-uuid").await.unwrap_err(),
    ] {
        assert!(matches!(err, RegistrarError::InvalidId { .. }), "got {err:?}");
    }

    for err in [
        repo.get(&missing).await.unwrap_err(),
        repo.update(&missing, alice()).await.unwrap_err(),
        repo.delete(&missing).await.unwrap_err(),
    ] {
        assert!(matches!(err, RegistrarError::NotFound { .. }), "got {err:?}");
    }

    // A failed update must not have created the record.
    assert!(repo.list().await.unwrap().is_empty());
}
