use std::collections::HashSet;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{Connection, OptionalExtension, Transaction, params, params_from_iter};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::catalog::Category;
use crate::config::DatabaseLocation;
use crate::merge::MergedRecord;
use crate::normalize::StatValue;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub league: String,
}

pub fn open_db(location: &DatabaseLocation) -> Result<Connection> {
    let conn = match location {
        DatabaseLocation::Memory => Connection::open_in_memory().context("open in-memory sqlite")?,
        DatabaseLocation::File(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).ok();
            }
            Connection::open(path)
                .with_context(|| format!("open sqlite db {}", path.display()))?
        }
    };
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS team (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            league TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_team_league ON team(league);

        CREATE TABLE IF NOT EXISTS ingest_runs (
            run_id INTEGER PRIMARY KEY AUTOINCREMENT,
            started_at TEXT NOT NULL,
            finished_at TEXT NULL,
            league TEXT NOT NULL,
            season TEXT NOT NULL,
            categories_total INTEGER NOT NULL,
            categories_succeeded INTEGER NOT NULL,
            records_appended INTEGER NOT NULL,
            errors_json TEXT NOT NULL
        );
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

/// Inserts `team` unless its id is already stored. Returns whether a row was added.
pub fn insert_team_if_absent(conn: &Connection, team: &Team) -> Result<bool> {
    let changed = conn
        .execute(
            "INSERT OR IGNORE INTO team (id, name, league) VALUES (?1, ?2, ?3)",
            params![team.id, team.name, team.league],
        )
        .context("insert team")?;
    Ok(changed == 1)
}

pub fn load_team(conn: &Connection, id: &str) -> Result<Option<Team>> {
    conn.query_row(
        "SELECT id, name, league FROM team WHERE id = ?1",
        params![id],
        |row| {
            Ok(Team {
                id: row.get(0)?,
                name: row.get(1)?,
                league: row.get(2)?,
            })
        },
    )
    .optional()
    .context("query team")
}

pub fn load_teams(conn: &Connection, offset: u32, limit: u32) -> Result<Vec<Team>> {
    let mut stmt = conn
        .prepare("SELECT id, name, league FROM team ORDER BY id LIMIT ?1 OFFSET ?2")
        .context("prepare load teams query")?;
    let rows = stmt
        .query_map(params![limit as i64, offset as i64], |row| {
            Ok(Team {
                id: row.get(0)?,
                name: row.get(1)?,
                league: row.get(2)?,
            })
        })
        .context("query load teams")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode team row")?);
    }
    Ok(out)
}

/// Appends `records` to the category's table, creating the table and any
/// newly-seen columns first. Never updates or replaces existing rows.
pub fn append_category_records(
    tx: &Transaction<'_>,
    category: Category,
    records: &[MergedRecord],
) -> Result<usize> {
    let table = category.store_table();
    ensure_category_table(tx, &table, records)?;

    for rec in records {
        let columns = rec.column_names();
        let column_list = columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=columns.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({column_list}) VALUES ({placeholders})",
            quote_ident(&table)
        );

        let mut values = Vec::with_capacity(columns.len());
        values.push(SqlValue::Text(rec.team_id.clone()));
        values.extend(rec.values.iter().map(|(_, v)| to_sql_value(v)));
        values.push(SqlValue::Text(rec.season.clone()));

        let mut stmt = tx
            .prepare_cached(&sql)
            .with_context(|| format!("prepare insert into {table}"))?;
        stmt.execute(params_from_iter(values))
            .with_context(|| format!("append {} row for team {}", table, rec.team_id))?;
    }
    Ok(records.len())
}

/// First stored row of `category` for the team and season, as a JSON object.
pub fn load_category_record(
    conn: &Connection,
    category: Category,
    team_id: &str,
    season: &str,
) -> Result<Option<Map<String, Value>>> {
    let table = category.store_table();
    if !table_exists(conn, &table)? {
        return Ok(None);
    }
    let sql = format!(
        "SELECT * FROM {} WHERE team_id = ?1 AND season = ?2 ORDER BY row_id LIMIT 1",
        quote_ident(&table)
    );
    let mut stmt = conn
        .prepare(&sql)
        .with_context(|| format!("prepare {table} lookup"))?;
    let names = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    stmt.query_row(params![team_id, season], |row| {
        let mut obj = Map::new();
        for (idx, name) in names.iter().enumerate() {
            obj.insert(name.clone(), json_from_sql(row.get_ref(idx)?));
        }
        Ok(obj)
    })
    .optional()
    .with_context(|| format!("query {table} record"))
}

pub fn count_category_records(
    conn: &Connection,
    category: Category,
    team_id: &str,
    season: &str,
) -> Result<usize> {
    let table = category.store_table();
    if !table_exists(conn, &table)? {
        return Ok(0);
    }
    let sql = format!(
        "SELECT COUNT(*) FROM {} WHERE team_id = ?1 AND season = ?2",
        quote_ident(&table)
    );
    let n = conn
        .query_row(&sql, params![team_id, season], |row| row.get::<_, i64>(0))
        .with_context(|| format!("count {table} records"))?;
    Ok(n as usize)
}

pub fn start_ingest_run(
    conn: &Connection,
    league: &str,
    season: &str,
    categories_total: usize,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO ingest_runs(started_at, finished_at, league, season, categories_total, categories_succeeded, records_appended, errors_json)
         VALUES (?1, NULL, ?2, ?3, ?4, 0, 0, '[]')",
        params![Utc::now().to_rfc3339(), league, season, categories_total as i64],
    )
    .context("insert ingest run")?;
    Ok(conn.last_insert_rowid())
}

pub fn finish_ingest_run(
    conn: &Connection,
    run_id: i64,
    categories_succeeded: usize,
    records_appended: usize,
    errors: &[String],
) -> Result<()> {
    let errors_json = serde_json::to_string(errors).unwrap_or_else(|_| "[]".to_string());
    conn.execute(
        "UPDATE ingest_runs
         SET finished_at = ?1, categories_succeeded = ?2, records_appended = ?3, errors_json = ?4
         WHERE run_id = ?5",
        params![
            Utc::now().to_rfc3339(),
            categories_succeeded as i64,
            records_appended as i64,
            errors_json,
            run_id
        ],
    )
    .context("update ingest run")?;
    Ok(())
}

fn ensure_category_table(conn: &Connection, table: &str, records: &[MergedRecord]) -> Result<()> {
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {t} (
            row_id INTEGER PRIMARY KEY AUTOINCREMENT,
            team_id TEXT NOT NULL,
            season TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS {idx} ON {t}(team_id, season);",
        t = quote_ident(table),
        idx = quote_ident(&format!("idx_{table}_team_season")),
    ))
    .with_context(|| format!("create table {table}"))?;

    let mut existing = table_columns(conn, table)?;
    for rec in records {
        for (name, value) in &rec.values {
            if existing.contains(name) {
                continue;
            }
            let sql = format!(
                "ALTER TABLE {} ADD COLUMN {} {}",
                quote_ident(table),
                quote_ident(name),
                column_type(value)
            );
            conn.execute(&sql, [])
                .with_context(|| format!("add column {name} to {table}"))?;
            existing.insert(name.clone());
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![table],
            |_| Ok(()),
        )
        .optional()
        .context("query sqlite_master")?;
    Ok(found.is_some())
}

fn table_columns(conn: &Connection, table: &str) -> Result<HashSet<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({})", quote_ident(table)))
        .context("prepare table_info")?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .context("query table_info")?;
    let mut out = HashSet::new();
    for row in rows {
        out.insert(row.context("decode table_info row")?);
    }
    Ok(out)
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn column_type(value: &StatValue) -> &'static str {
    match value {
        StatValue::Int(_) => "INTEGER",
        StatValue::Float(_) => "REAL",
        StatValue::Text(_) => "TEXT",
        StatValue::Missing => "",
    }
}

fn to_sql_value(value: &StatValue) -> SqlValue {
    match value {
        StatValue::Int(n) => SqlValue::Integer(*n),
        StatValue::Float(x) => SqlValue::Real(*x),
        StatValue::Text(s) => SqlValue::Text(s.clone()),
        StatValue::Missing => SqlValue::Null,
    }
}

fn json_from_sql(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(n) => Value::from(n),
        ValueRef::Real(x) => serde_json::Number::from_f64(x)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
    }
}
