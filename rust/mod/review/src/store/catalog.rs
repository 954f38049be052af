use opencourse_core::{now_rfc3339, ServiceError};
use opencourse_sql::{Executor, Row, Value};

use crate::model::{Course, Department, Resource};
use crate::store::{col_i64, col_opt_i64, col_str, storage_err, write_err};

fn first_row<T>(
    rows: Vec<Row>,
    map: fn(&Row) -> Result<T, ServiceError>,
) -> Result<T, ServiceError> {
    let row = rows
        .first()
        .ok_or_else(|| ServiceError::Storage("insert returned no row".into()))?;
    map(row)
}

// ---------------------------------------------------------------------------
// Departments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct DepartmentStore;

impl DepartmentStore {
    pub fn create(&self, db: &dyn Executor, name: &str) -> Result<Department, ServiceError> {
        let rows = db
            .query(
                "INSERT INTO departments (name, created_at) VALUES (?1, ?2) \
                 RETURNING id, name, created_at",
                &[Value::Text(name.to_string()), Value::Text(now_rfc3339())],
            )
            .map_err(write_err("department name taken"))?;
        first_row(rows, row_to_department)
    }

    pub fn get(&self, db: &dyn Executor, id: i64) -> Result<Option<Department>, ServiceError> {
        let rows = db
            .query(
                "SELECT id, name, created_at FROM departments WHERE id = ?1",
                &[Value::Integer(id)],
            )
            .map_err(storage_err)?;
        rows.first().map(row_to_department).transpose()
    }
}

fn row_to_department(row: &Row) -> Result<Department, ServiceError> {
    Ok(Department {
        id: col_i64(row, "id")?,
        name: col_str(row, "name")?,
        created_at: col_str(row, "created_at")?,
    })
}

// ---------------------------------------------------------------------------
// Courses
// ---------------------------------------------------------------------------

const COURSE_COLUMNS: &str = "id, code, name, department_id, created_at";

#[derive(Debug, Clone, Copy, Default)]
pub struct CourseStore;

impl CourseStore {
    pub fn create(
        &self,
        db: &dyn Executor,
        code: &str,
        name: &str,
        department_id: Option<i64>,
    ) -> Result<Course, ServiceError> {
        let rows = db
            .query(
                &format!(
                    "INSERT INTO courses (code, name, department_id, created_at) \
                     VALUES (?1, ?2, ?3, ?4) RETURNING {COURSE_COLUMNS}"
                ),
                &[
                    Value::Text(code.to_string()),
                    Value::Text(name.to_string()),
                    Value::from(department_id),
                    Value::Text(now_rfc3339()),
                ],
            )
            .map_err(write_err("course code taken"))?;
        first_row(rows, row_to_course)
    }

    pub fn get(&self, db: &dyn Executor, id: i64) -> Result<Option<Course>, ServiceError> {
        let rows = db
            .query(
                &format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = ?1"),
                &[Value::Integer(id)],
            )
            .map_err(storage_err)?;
        rows.first().map(row_to_course).transpose()
    }

    pub fn delete(&self, db: &dyn Executor, id: i64) -> Result<bool, ServiceError> {
        let n = db
            .exec("DELETE FROM courses WHERE id = ?1", &[Value::Integer(id)])
            .map_err(storage_err)?;
        Ok(n > 0)
    }
}

fn row_to_course(row: &Row) -> Result<Course, ServiceError> {
    Ok(Course {
        id: col_i64(row, "id")?,
        code: col_str(row, "code")?,
        name: col_str(row, "name")?,
        department_id: col_opt_i64(row, "department_id"),
        created_at: col_str(row, "created_at")?,
    })
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

const RESOURCE_COLUMNS: &str = "id, course_id, name, kind, created_at";

#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceStore;

impl ResourceStore {
    pub fn create(
        &self,
        db: &dyn Executor,
        course_id: i64,
        name: &str,
        kind: &str,
    ) -> Result<Resource, ServiceError> {
        let rows = db
            .query(
                &format!(
                    "INSERT INTO resources (course_id, name, kind, created_at) \
                     VALUES (?1, ?2, ?3, ?4) RETURNING {RESOURCE_COLUMNS}"
                ),
                &[
                    Value::Integer(course_id),
                    Value::Text(name.to_string()),
                    Value::Text(kind.to_string()),
                    Value::Text(now_rfc3339()),
                ],
            )
            .map_err(storage_err)?;
        first_row(rows, row_to_resource)
    }

    pub fn get(&self, db: &dyn Executor, id: i64) -> Result<Option<Resource>, ServiceError> {
        let rows = db
            .query(
                &format!("SELECT {RESOURCE_COLUMNS} FROM resources WHERE id = ?1"),
                &[Value::Integer(id)],
            )
            .map_err(storage_err)?;
        rows.first().map(row_to_resource).transpose()
    }
}

fn row_to_resource(row: &Row) -> Result<Resource, ServiceError> {
    Ok(Resource {
        id: col_i64(row, "id")?,
        course_id: col_i64(row, "course_id")?,
        name: col_str(row, "name")?,
        kind: col_str(row, "kind")?,
        created_at: col_str(row, "created_at")?,
    })
}
