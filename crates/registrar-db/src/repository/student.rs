//! SurrealDB implementation of [`StudentRepository`].

use registrar_core::error::RegistrarResult;
use registrar_core::models::student::{Student, StudentInput};
use registrar_core::repository::{StudentRepository, parse_id};
use serde::Deserialize;
use surrealdb::{Connection, Surreal};
use uuid::Uuid;

use super::user::timestamp;
use crate::error::DbError;

const ENTITY: &str = "student";

#[derive(Debug, Deserialize)]
struct StudentRow {
    name: String,
    age: u32,
    grade: String,
    email: String,
    created_by: String,
    created_at: i64,
}

#[derive(Debug, Deserialize)]
struct StudentRowWithId {
    record_id: String,
    #[serde(flatten)]
    row: StudentRow,
}

impl StudentRow {
    fn into_student(self, id: Uuid) -> Result<Student, DbError> {
        Ok(Student {
            id,
            name: self.name,
            age: self.age,
            grade: self.grade,
            email: self.email,
            created_by: self.created_by,
            created_at: timestamp(self.created_at)?,
        })
    }
}

fn first_or_not_found(rows: Vec<StudentRow>, id: Uuid) -> Result<Student, DbError> {
    rows.into_iter()
        .next()
        .ok_or_else(|| DbError::NotFound {
            entity: ENTITY.into(),
            id: id.to_string(),
        })?
        .into_student(id)
}

/// SurrealDB implementation of the Student repository.
#[derive(Clone)]
pub struct SurrealStudentRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealStudentRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> StudentRepository for SurrealStudentRepository<C> {
    async fn create(&self, input: StudentInput, created_by: &str) -> RegistrarResult<Student> {
        let id = Uuid::new_v4();

        let result = self
            .db
            .query(
                "CREATE type::thing('student', $id) SET \
                 name = $name, age = $age, grade = $grade, \
                 email = $email, created_by = $created_by",
            )
            .bind(("id", id.to_string()))
            .bind(("name", input.name))
            .bind(("age", input.age))
            .bind(("grade", input.grade))
            .bind(("email", input.email))
            .bind(("created_by", created_by.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement(ENTITY, e))?;
        let rows: Vec<StudentRow> = result.take(0).map_err(DbError::from)?;

        Ok(first_or_not_found(rows, id)?)
    }

    async fn list(&self) -> RegistrarResult<Vec<Student>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM student \
                 ORDER BY created_at ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<StudentRowWithId> = result.take(0).map_err(DbError::from)?;

        let students = rows
            .into_iter()
            .map(|r| {
                let id = Uuid::parse_str(&r.record_id)
                    .map_err(|e| DbError::Corrupt(format!("invalid UUID: {e}")))?;
                r.row.into_student(id)
            })
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(students)
    }

    async fn get(&self, id: &str) -> RegistrarResult<Student> {
        let id = parse_id(ENTITY, id)?;

        let mut result = self
            .db
            .query("SELECT * FROM type::thing('student', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<StudentRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, id)?)
    }

    async fn update(&self, id: &str, input: StudentInput) -> RegistrarResult<Student> {
        let id = parse_id(ENTITY, id)?;

        // The WHERE guard keeps UPDATE from materialising a missing record.
        let result = self
            .db
            .query(
                "UPDATE type::thing('student', $id) SET \
                 name = $name, age = $age, grade = $grade, email = $email \
                 WHERE created_by != NONE",
            )
            .bind(("id", id.to_string()))
            .bind(("name", input.name))
            .bind(("age", input.age))
            .bind(("grade", input.grade))
            .bind(("email", input.email))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement(ENTITY, e))?;
        let rows: Vec<StudentRow> = result.take(0).map_err(DbError::from)?;

        Ok(first_or_not_found(rows, id)?)
    }

    async fn delete(&self, id: &str) -> RegistrarResult<()> {
        let id = parse_id(ENTITY, id)?;

        let mut result = self
            .db
            .query("DELETE type::thing('student', $id) RETURN BEFORE")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<StudentRow> = result.take(0).map_err(DbError::from)?;
        first_or_not_found(rows, id)?;

        Ok(())
    }
}
