//! Item repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and lookup APIs over the `items` table.
//! - Hand rows back untyped (`RawRecord`) so the model layer alone decides
//!   what counts as a valid item.
//!
//! # Invariants
//! - Writes persist exactly one type-specific field; the other two are NULL.
//! - Boolean columns decode to JSON booleans only for `0`/`1`; any other
//!   stored value is passed through as-is and rejected downstream.
//! - Repositories refuse connections that were not migrated by this binary.
//! - Search folds case with Unicode rules on both sides of `LIKE`.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::item::{ItemDraft, ItemId};
use crate::model::validate::RawRecord;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::functions::FunctionFlags;
use rusqlite::{params, params_from_iter, Connection, Statement};
use serde_json::{Number, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

const ITEM_SELECT_SQL: &str = "SELECT
    id,
    title,
    itemtype,
    author,
    director,
    season,
    in_progress,
    published_year,
    belongs_to_year,
    redo,
    created_at,
    updated_at
FROM items";

/// SQL scalar registered by [`SqliteItemRepository::try_new`].
const CASEFOLD_FN: &str = "whatpm_casefold";

const REQUIRED_COLUMNS: &[&str] = &[
    "id",
    "title",
    "itemtype",
    "author",
    "director",
    "season",
    "in_progress",
    "published_year",
    "belongs_to_year",
    "redo",
    "created_at",
    "updated_at",
];

const BOOL_COLUMNS: &[&str] = &["redo", "in_progress"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for item persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(ItemId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "item not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted item data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemListQuery {
    /// Restrict to one `belongs_to_year`; `None` lists every year.
    pub year: Option<i32>,
}

impl ItemListQuery {
    pub fn for_year(year: i32) -> Self {
        Self { year: Some(year) }
    }
}

/// Repository interface for item operations.
pub trait ItemRepository {
    /// Inserts a new row with the given id and year-logged.
    fn create_item(&self, id: &str, draft: &ItemDraft, belongs_to_year: i32) -> RepoResult<()>;
    /// Replaces editable fields of an existing row. The item type is kept.
    fn update_item(&self, id: &str, draft: &ItemDraft, belongs_to_year: i32) -> RepoResult<()>;
    /// Hard-deletes one row.
    fn delete_item(&self, id: &str) -> RepoResult<()>;
    fn get_raw_item(&self, id: &str) -> RepoResult<Option<RawRecord>>;
    fn list_raw_items(&self, query: &ItemListQuery) -> RepoResult<Vec<RawRecord>>;
    /// Unicode case-insensitive `LIKE` over title/author/director, newest
    /// first.
    ///
    /// `escaped_term` must already have `%`, `_` and `\` escaped with `\`.
    fn search_raw_items(&self, escaped_term: &str, limit: u32) -> RepoResult<Vec<RawRecord>>;
    /// Distinct `belongs_to_year` values, newest first.
    fn list_logged_years(&self) -> RepoResult<Vec<i32>>;
}

/// SQLite-backed item repository.
pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteItemRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when `user_version` differs from the
    ///   latest known migration.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` when the schema was
    ///   altered out of band.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        register_casefold(conn)?;
        Ok(Self { conn })
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn create_item(&self, id: &str, draft: &ItemDraft, belongs_to_year: i32) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO items (
                id,
                title,
                itemtype,
                author,
                director,
                season,
                in_progress,
                published_year,
                belongs_to_year,
                redo
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                id,
                draft.title.as_str(),
                draft.kind.item_type().as_str(),
                draft.kind.author(),
                draft.kind.director(),
                draft.kind.season(),
                draft.kind.in_progress(),
                draft.published_year,
                belongs_to_year,
                draft.redo,
            ],
        )?;
        Ok(())
    }

    fn update_item(&self, id: &str, draft: &ItemDraft, belongs_to_year: i32) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE items
             SET
                title = ?2,
                author = ?3,
                director = ?4,
                season = ?5,
                in_progress = ?6,
                published_year = ?7,
                belongs_to_year = ?8,
                redo = ?9,
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
             WHERE id = ?1;",
            params![
                id,
                draft.title.as_str(),
                draft.kind.author(),
                draft.kind.director(),
                draft.kind.season(),
                draft.kind.in_progress(),
                draft.published_year,
                belongs_to_year,
                draft.redo,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn delete_item(&self, id: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM items WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn get_raw_item(&self, id: &str) -> RepoResult<Option<RawRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ITEM_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = query_raw_records(&mut stmt, vec![SqlValue::Text(id.to_string())])?;
        Ok(rows.pop())
    }

    fn list_raw_items(&self, query: &ItemListQuery) -> RepoResult<Vec<RawRecord>> {
        let mut sql = format!("{ITEM_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values = Vec::new();

        if let Some(year) = query.year {
            sql.push_str(" AND belongs_to_year = ?");
            bind_values.push(SqlValue::Integer(i64::from(year)));
        }

        sql.push_str(" ORDER BY created_at ASC, rowid ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        query_raw_records(&mut stmt, bind_values)
    }

    fn search_raw_items(&self, escaped_term: &str, limit: u32) -> RepoResult<Vec<RawRecord>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(&format!(
            r"{ITEM_SELECT_SQL}
             WHERE {CASEFOLD_FN}(title) LIKE ?1 ESCAPE '\'
                OR {CASEFOLD_FN}(author) LIKE ?1 ESCAPE '\'
                OR {CASEFOLD_FN}(director) LIKE ?1 ESCAPE '\'
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2;"
        ))?;
        let pattern = format!("%{}%", casefold(escaped_term));
        query_raw_records(
            &mut stmt,
            vec![SqlValue::Text(pattern), SqlValue::Integer(i64::from(limit))],
        )
    }

    fn list_logged_years(&self) -> RepoResult<Vec<i32>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT belongs_to_year
             FROM items
             ORDER BY belongs_to_year DESC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut years = Vec::new();
        while let Some(row) = rows.next()? {
            years.push(row.get(0)?);
        }
        Ok(years)
    }
}

fn casefold(value: &str) -> String {
    value.to_lowercase()
}

fn register_casefold(conn: &Connection) -> RepoResult<()> {
    conn.create_scalar_function(
        CASEFOLD_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| Ok(ctx.get_raw(0).as_str().ok().map(casefold)),
    )?;
    Ok(())
}

fn query_raw_records(
    stmt: &mut Statement<'_>,
    bind_values: Vec<SqlValue>,
) -> RepoResult<Vec<RawRecord>> {
    let columns: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();

    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        let mut record = RawRecord::new();
        for (index, column) in columns.iter().enumerate() {
            let value = decode_column(column, row.get_ref(index)?)?;
            record.insert(column.clone(), value);
        }
        records.push(record);
    }
    Ok(records)
}

fn decode_column(column: &str, value: ValueRef<'_>) -> RepoResult<Value> {
    let decoded = match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(0) if BOOL_COLUMNS.contains(&column) => Value::Bool(false),
        ValueRef::Integer(1) if BOOL_COLUMNS.contains(&column) => Value::Bool(true),
        ValueRef::Integer(number) => Value::Number(Number::from(number)),
        ValueRef::Real(number) => Number::from_f64(number).map_or(Value::Null, Value::Number),
        ValueRef::Text(bytes) => {
            let text = std::str::from_utf8(bytes).map_err(|_| {
                RepoError::InvalidData(format!("non UTF-8 text in items.{column}"))
            })?;
            Value::String(text.to_string())
        }
        ValueRef::Blob(_) => {
            return Err(RepoError::InvalidData(format!(
                "unexpected blob in items.{column}"
            )));
        }
    };
    Ok(decoded)
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "items")? {
        return Err(RepoError::MissingRequiredTable("items"));
    }

    for &column in REQUIRED_COLUMNS {
        if !table_has_column(conn, "items", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "items",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
