//! Local fixture warehouse on SQLite (read-only connection).

use crate::core::params::normalize_vendor_key;
use crate::core::query::{Dialect, TicketQuery};
use crate::errors::{AppError, AppResult};
use crate::warehouse::{ResultSet, Warehouse};
use rusqlite::functions::FunctionFlags;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, params_from_iter};
use std::path::Path;

pub struct SqliteWarehouse {
    conn: Option<Connection>,
}

/// Register `VENDOR_KEY(text)`, the SQL side of vendor key normalization.
pub fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "VENDOR_KEY",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let name: Option<String> = ctx.get(0)?;
            Ok(name.map(|n| normalize_vendor_key(&n)))
        },
    )
}

fn value_to_text(v: ValueRef<'_>) -> Option<String> {
    match v {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) | ValueRef::Blob(t) => Some(String::from_utf8_lossy(t).into_owned()),
    }
}

impl SqliteWarehouse {
    pub fn open(path: &Path) -> AppResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| AppError::Connection(format!("{}: {}", path.display(), e)))?;
        register_functions(&conn)?;
        Ok(Self { conn: Some(conn) })
    }

    fn conn(&self) -> AppResult<&Connection> {
        self.conn
            .as_ref()
            .ok_or_else(|| AppError::Query("connection already closed".into()))
    }
}

impl Warehouse for SqliteWarehouse {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn query(&mut self, query: &TicketQuery) -> AppResult<ResultSet> {
        let as_query = |e: rusqlite::Error| AppError::Query(e.to_string());

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&query.sql).map_err(as_query)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let mapped = stmt
            .query_map(params_from_iter(query.bindings.iter()), |row| {
                (0..width)
                    .map(|i| row.get_ref(i).map(value_to_text))
                    .collect::<rusqlite::Result<Vec<_>>>()
            })
            .map_err(as_query)?;

        let mut rows = Vec::new();
        for r in mapped {
            rows.push(r.map_err(as_query)?);
        }

        Ok(ResultSet { columns, rows })
    }

    fn close(&mut self) -> AppResult<()> {
        if let Some(conn) = self.conn.take() {
            conn.close().map_err(|(_, e)| AppError::Db(e))?;
        }
        Ok(())
    }
}
