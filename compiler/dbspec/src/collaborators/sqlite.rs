//! SQLite database access through `rusqlite`.
//!
//! Accepted URLs: `sqlite:<path>`, `sqlite::memory:` and the JDBC spelling
//! `jdbc:sqlite:<path>`. Relative paths are resolved against the working
//! directory. Query results are read completely into a [`VecCursor`].

use std::path::PathBuf;
use std::rc::Rc;

use dbspec_eval::{
    ConnectionHandle, DbConnection, Dbms, HostError, Properties, QueryCursor, Row, SqlArg,
    VecCursor,
};
use num_bigint::BigInt;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection};
use tracing::debug;

/// Where a URL points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SqliteTarget {
    Memory,
    File(PathBuf),
}

/// Interpret `url`, or `None` if it is not an SQLite URL.
pub fn sqlite_target(url: &str) -> Option<SqliteTarget> {
    let rest = url.strip_prefix("jdbc:").unwrap_or(url);
    let location = rest.strip_prefix("sqlite:")?;
    match location {
        "" | ":memory:" => Some(SqliteTarget::Memory),
        path => Some(SqliteTarget::File(PathBuf::from(path))),
    }
}

pub struct SqliteDbms {
    dir: PathBuf,
}

impl SqliteDbms {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        SqliteDbms { dir: dir.into() }
    }
}

impl Dbms for SqliteDbms {
    fn connect(&self, url: &str, properties: &Properties) -> Result<ConnectionHandle, HostError> {
        let Some(target) = sqlite_target(url) else {
            return Err(HostError::new(format!("No suitable driver found for {url}")));
        };
        let connection = match &target {
            SqliteTarget::Memory => Connection::open_in_memory(),
            SqliteTarget::File(path) => Connection::open(self.dir.join(path)),
        }
        .map_err(|error| HostError::new(format!("Cannot open {url}: {error}")))?;
        debug!(url, ?target, "connected");
        Ok(Rc::new(SqliteConnection {
            url: url.to_owned(),
            properties: properties.clone(),
            connection,
        }))
    }
}

struct SqliteConnection {
    url: String,
    properties: Properties,
    connection: Connection,
}

/// Integers beyond 64 bits are bound as their decimal text.
fn bind(arg: &SqlArg) -> SqlValue {
    match arg {
        SqlArg::Text(text) => SqlValue::Text(text.clone()),
        SqlArg::Integer(number) => integer(number),
    }
}

fn integer(number: &BigInt) -> SqlValue {
    i64::try_from(number).map_or_else(|_| SqlValue::Text(number.to_string()), SqlValue::Integer)
}

fn cell(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(number) => Some(number.to_string()),
        ValueRef::Real(number) => Some(number.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

fn sql_failure(error: &rusqlite::Error) -> HostError {
    HostError::new(error.to_string())
}

impl DbConnection for SqliteConnection {
    fn url(&self) -> &str {
        &self.url
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }

    fn execute_update(&self, sql: &str, args: &[SqlArg]) -> Result<u64, HostError> {
        // Without arguments the text may hold several statements.
        if args.is_empty() {
            self.connection
                .execute_batch(sql)
                .map_err(|error| sql_failure(&error))?;
            return Ok(u64::try_from(self.connection.changes()).unwrap_or(u64::MAX));
        }
        let mut statement = self
            .connection
            .prepare(sql)
            .map_err(|error| sql_failure(&error))?;
        let changed = statement
            .execute(params_from_iter(args.iter().map(bind)))
            .map_err(|error| sql_failure(&error))?;
        Ok(u64::try_from(changed).unwrap_or(u64::MAX))
    }

    fn execute_query(&self, sql: &str, args: &[SqlArg]) -> Result<Box<dyn QueryCursor>, HostError> {
        let mut statement = self
            .connection
            .prepare(sql)
            .map_err(|error| sql_failure(&error))?;
        let columns = statement.column_count();
        let mut rows = statement
            .query(params_from_iter(args.iter().map(bind)))
            .map_err(|error| sql_failure(&error))?;
        let mut buffered: Vec<Row> = Vec::new();
        while let Some(row) = rows.next().map_err(|error| sql_failure(&error))? {
            let cells = (0..columns)
                .map(|index| row.get_ref(index).map(cell))
                .collect::<Result<Row, _>>()
                .map_err(|error| sql_failure(&error))?;
            buffered.push(cells);
        }
        debug!(rows = buffered.len(), columns, "query buffered");
        Ok(Box::new(VecCursor::new(columns, buffered)))
    }
}
