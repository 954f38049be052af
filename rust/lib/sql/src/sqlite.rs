use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::types::ValueRef;
use rusqlite::{Connection, ErrorCode};
use tracing::{debug, warn};

use crate::error::SQLError;
use crate::traits::{Executor, Row, SQLStore, Transaction, Value};

/// SqliteStore is a SQLStore implementation backed by rusqlite (bundled SQLite).
///
/// A single connection sits behind a mutex. A transaction keeps the lock
/// until it commits or rolls back, so transactions are serialized.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a SQLite database at the given path.
    pub fn open(path: &Path) -> Result<Self, SQLError> {
        let conn = Connection::open(path).map_err(|e| SQLError::Connection(e.to_string()))?;

        // WAL keeps readers from other processes off the writer's back.
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| SQLError::Connection(e.to_string()))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite database (useful for tests).
    pub fn open_in_memory() -> Result<Self, SQLError> {
        let conn =
            Connection::open_in_memory().map_err(|e| SQLError::Connection(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SQLError> {
        self.conn
            .lock()
            .map_err(|e| SQLError::Connection(e.to_string()))
    }
}

impl Executor for SqliteStore {
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, SQLError> {
        let conn = self.lock()?;
        query_on(&conn, sql, params)
    }

    fn exec(&self, sql: &str, params: &[Value]) -> Result<u64, SQLError> {
        let conn = self.lock()?;
        exec_on(&conn, sql, params)
    }
}

impl SQLStore for SqliteStore {
    fn as_executor(&self) -> &dyn Executor {
        self
    }

    fn begin(&self) -> Result<Box<dyn Transaction + '_>, SQLError> {
        let conn = self.lock()?;
        // IMMEDIATE takes the write lock up front so a read-then-write inside
        // the transaction can't be invalidated by another process.
        conn.execute_batch("BEGIN IMMEDIATE")
            .map_err(|e| SQLError::Transaction(e.to_string()))?;
        Ok(Box::new(SqliteTransaction { conn, done: false }))
    }
}

/// A transaction holding the store's connection lock.
pub struct SqliteTransaction<'a> {
    conn: MutexGuard<'a, Connection>,
    done: bool,
}

impl Executor for SqliteTransaction<'_> {
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, SQLError> {
        query_on(&self.conn, sql, params)
    }

    fn exec(&self, sql: &str, params: &[Value]) -> Result<u64, SQLError> {
        exec_on(&self.conn, sql, params)
    }
}

impl Transaction for SqliteTransaction<'_> {
    fn as_executor(&self) -> &dyn Executor {
        self
    }

    fn commit(mut self: Box<Self>) -> Result<(), SQLError> {
        self.conn
            .execute_batch("COMMIT")
            .map_err(|e| SQLError::Transaction(e.to_string()))?;
        self.done = true;
        Ok(())
    }
}

impl Drop for SqliteTransaction<'_> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        debug!("rolling back uncommitted transaction");
        if let Err(e) = self.conn.execute_batch("ROLLBACK") {
            warn!("rollback failed: {e}");
        }
    }
}

/// Convert our Value enum to rusqlite's ToSql.
fn bind_params(params: &[Value]) -> Vec<Box<dyn rusqlite::types::ToSql + '_>> {
    params
        .iter()
        .map(|v| -> Box<dyn rusqlite::types::ToSql + '_> {
            match v {
                Value::Null => Box::new(rusqlite::types::Null),
                Value::Integer(i) => Box::new(*i),
                Value::Real(f) => Box::new(*f),
                Value::Text(s) => Box::new(s.as_str()),
                Value::Blob(b) => Box::new(b.as_slice()),
            }
        })
        .collect()
}

fn query_on(conn: &Connection, sql: &str, params: &[Value]) -> Result<Vec<Row>, SQLError> {
    let bound = bind_params(params);
    let param_refs: Vec<&dyn rusqlite::types::ToSql> = bound.iter().map(|b| b.as_ref()).collect();

    let mut stmt = conn.prepare(sql).map_err(|e| classify(e, SQLError::Query))?;

    let column_names: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();

    let rows = stmt
        .query_map(param_refs.as_slice(), |row| {
            let mut columns = Vec::with_capacity(column_names.len());
            for (i, name) in column_names.iter().enumerate() {
                columns.push((name.clone(), row_value_at(row, i)?));
            }
            Ok(Row { columns })
        })
        .map_err(|e| classify(e, SQLError::Query))?;

    let mut result = Vec::new();
    for row in rows {
        // INSERT ... RETURNING reports constraint failures while stepping.
        result.push(row.map_err(|e| classify(e, SQLError::Query))?);
    }
    Ok(result)
}

fn exec_on(conn: &Connection, sql: &str, params: &[Value]) -> Result<u64, SQLError> {
    let bound = bind_params(params);
    let param_refs: Vec<&dyn rusqlite::types::ToSql> = bound.iter().map(|b| b.as_ref()).collect();

    let affected = conn
        .execute(sql, param_refs.as_slice())
        .map_err(|e| classify(e, SQLError::Execution))?;

    Ok(affected as u64)
}

/// Map a rusqlite error, singling out constraint violations.
fn classify(e: rusqlite::Error, other: fn(String) -> SQLError) -> SQLError {
    match &e {
        rusqlite::Error::SqliteFailure(err, _) if err.code == ErrorCode::ConstraintViolation => {
            SQLError::Constraint(e.to_string())
        }
        _ => other(e.to_string()),
    }
}

/// Extract a Value from a rusqlite row at a given column index.
fn row_value_at(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Value> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Real(f),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Blob(b.to_vec()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_table() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .exec(
                "CREATE TABLE items (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL UNIQUE, score REAL)",
                &[],
            )
            .unwrap();
        store
    }

    fn count(store: &SqliteStore) -> i64 {
        store
            .query("SELECT COUNT(*) AS cnt FROM items", &[])
            .unwrap()[0]
            .get_i64("cnt")
            .unwrap()
    }

    #[test]
    fn exec_and_query() {
        let store = store_with_table();
        let n = store
            .exec(
                "INSERT INTO items (name, score) VALUES (?1, ?2)",
                &[Value::Text("a".into()), Value::Real(1.5)],
            )
            .unwrap();
        assert_eq!(n, 1);

        let rows = store
            .query("SELECT id, name, score FROM items WHERE name = ?1", &[Value::Text("a".into())])
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_i64("id"), Some(1));
        assert_eq!(rows[0].get_str("name"), Some("a"));
        assert_eq!(rows[0].get_f64("score"), Some(1.5));
    }

    #[test]
    fn null_column_reads_as_null() {
        let store = store_with_table();
        store
            .exec("INSERT INTO items (name, score) VALUES ('n', NULL)", &[])
            .unwrap();
        let rows = store.query("SELECT score FROM items", &[]).unwrap();
        assert_eq!(rows[0].get("score"), Some(&Value::Null));
        assert_eq!(rows[0].get_f64("score"), None);
    }

    #[test]
    fn insert_returning_id() {
        let store = store_with_table();
        let rows = store
            .query(
                "INSERT INTO items (name) VALUES (?1) RETURNING id",
                &[Value::Text("x".into())],
            )
            .unwrap();
        assert_eq!(rows[0].get_i64("id"), Some(1));
    }

    #[test]
    fn unique_violation_is_constraint() {
        let store = store_with_table();
        store
            .exec("INSERT INTO items (name) VALUES ('dup')", &[])
            .unwrap();
        let err = store
            .exec("INSERT INTO items (name) VALUES ('dup')", &[])
            .unwrap_err();
        assert!(err.is_constraint(), "got {err:?}");

        let err = store
            .query("INSERT INTO items (name) VALUES ('dup') RETURNING id", &[])
            .unwrap_err();
        assert!(err.is_constraint(), "got {err:?}");
    }

    #[test]
    fn commit_makes_writes_visible() {
        let store = store_with_table();
        let tx = store.begin().unwrap();
        tx.exec("INSERT INTO items (name) VALUES ('a')", &[]).unwrap();
        tx.exec("INSERT INTO items (name) VALUES ('b')", &[]).unwrap();
        tx.commit().unwrap();
        assert_eq!(count(&store), 2);
    }

    #[test]
    fn drop_without_commit_rolls_back() {
        let store = store_with_table();
        {
            let tx = store.begin().unwrap();
            tx.exec("INSERT INTO items (name) VALUES ('a')", &[]).unwrap();
            let rows = tx.query("SELECT COUNT(*) AS cnt FROM items", &[]).unwrap();
            assert_eq!(rows[0].get_i64("cnt"), Some(1));
        }
        assert_eq!(count(&store), 0);

        // The store is usable again after the rollback.
        store.exec("INSERT INTO items (name) VALUES ('c')", &[]).unwrap();
        assert_eq!(count(&store), 1);
    }

    #[test]
    fn failed_statement_inside_transaction_rolls_back_everything() {
        let store = store_with_table();
        let result = (|| -> Result<(), SQLError> {
            let tx = store.begin()?;
            tx.exec("INSERT INTO items (name) VALUES ('a')", &[])?;
            tx.exec("INSERT INTO items (name) VALUES ('a')", &[])?;
            tx.commit()
        })();
        assert!(result.unwrap_err().is_constraint());
        assert_eq!(count(&store), 0);
    }

    #[test]
    fn transactions_serialize_across_threads() {
        let store = std::sync::Arc::new(store_with_table());
        store
            .exec("CREATE TABLE counter (n INTEGER NOT NULL)", &[])
            .unwrap();
        store.exec("INSERT INTO counter (n) VALUES (0)", &[]).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = std::sync::Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        let tx = store.begin().unwrap();
                        let n = tx.query("SELECT n FROM counter", &[]).unwrap()[0]
                            .get_i64("n")
                            .unwrap();
                        tx.exec("UPDATE counter SET n = ?1", &[Value::Integer(n + 1)])
                            .unwrap();
                        tx.commit().unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let n = store.query("SELECT n FROM counter", &[]).unwrap()[0]
            .get_i64("n")
            .unwrap();
        assert_eq!(n, 200);
    }

    #[test]
    fn open_file_backed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.sqlite");
        {
            let store = SqliteStore::open(&path).unwrap();
            store
                .exec("CREATE TABLE t (v TEXT)", &[])
                .unwrap();
            store
                .exec("INSERT INTO t (v) VALUES ('kept')", &[])
                .unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        let rows = store.query("SELECT v FROM t", &[]).unwrap();
        assert_eq!(rows[0].get_str("v"), Some("kept"));
    }
}
