//! Read-only SQLite access behind a SELECT-only, table allow-list guard.

use std::fmt::Write as _;
use std::path::PathBuf;

use futures::TryStreamExt;
use parley_memory::ConfigError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row, TypeInfo, ValueRef};

use crate::config::SqlConfig;
use crate::error::ToolError;
use crate::fenced::first_fenced_block;

/// Fixed answer for any query the guard refuses.
pub const REFUSAL: &str = "I cannot answer with the available data.";

const FORBIDDEN: &[&str] = &[
    "insert", "update", "delete", "drop", "alter", "create", "attach", "detach", "pragma",
    "vacuum", "reindex",
];

const RESERVED: &[&str] = &[
    "select", "from", "where", "join", "inner", "left", "right", "full", "outer", "cross",
    "natural", "on", "using", "group", "order", "by", "having", "limit", "offset", "union",
    "except", "intersect", "window", "as", "in", "not",
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Quoted(String),
    Str,
    Sym(char),
}

impl Token {
    fn is_keyword(&self, kw: &str) -> bool {
        matches!(self, Self::Word(w) if w.eq_ignore_ascii_case(kw))
    }

    fn ident(&self) -> Option<&str> {
        match self {
            Self::Word(w) if !RESERVED.iter().any(|r| w.eq_ignore_ascii_case(r)) => Some(w),
            Self::Quoted(q) => Some(q),
            _ => None,
        }
    }
}

fn tokenize(sql: &str) -> Vec<Token> {
    let chars: Vec<char> = sql.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c == '-' && chars.get(i + 1) == Some(&'-') {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
        } else if c == '/' && chars.get(i + 1) == Some(&'*') {
            i += 2;
            while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                i += 1;
            }
            i += 2;
        } else if c == '\'' || c == '"' || c == '`' || c == '[' {
            let close = if c == '[' { ']' } else { c };
            let mut text = String::new();
            i += 1;
            while i < chars.len() {
                if chars[i] == close {
                    // doubled quote is an escaped quote
                    if close != ']' && chars.get(i + 1) == Some(&close) {
                        text.push(close);
                        i += 2;
                        continue;
                    }
                    break;
                }
                text.push(chars[i]);
                i += 1;
            }
            i += 1;
            tokens.push(if c == '\'' {
                Token::Str
            } else {
                Token::Quoted(text)
            });
        } else if c.is_alphanumeric() || c == '_' || c == '$' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '$')
            {
                i += 1;
            }
            tokens.push(Token::Word(chars[start..i].iter().collect()));
        } else {
            tokens.push(Token::Sym(c));
            i += 1;
        }
    }

    tokens
}

/// Keywords that close the `FROM` source list of the current nesting level.
const CLAUSE_END: &[&str] = &[
    "select", "where", "group", "having", "order", "limit", "window", "union", "except",
    "intersect",
];

/// Source-list state of one parenthesis level.
#[derive(Default)]
struct Level {
    in_sources: bool,
    source_paren: bool,
}

/// Table names read by `sql`, in first-seen order.
///
/// Follows every `FROM`/`JOIN` source list, including comma lists after subqueries and joins,
/// and SQLite's `expr IN table` form. Quotes are removed and `schema.table` yields `table`.
///
/// # Errors
///
/// Returns [`ToolError::Refused`] when a table position holds something that is neither a
/// name nor a parenthesised source.
pub fn referenced_tables(sql: &str) -> Result<Vec<String>, ToolError> {
    let tokens = tokenize(sql);
    let mut tables: Vec<String> = Vec::new();
    let mut record = |name: String| {
        if !tables.iter().any(|t| t.eq_ignore_ascii_case(&name)) {
            tables.push(name);
        }
    };
    let unknown_source = |at: usize| ToolError::Refused {
        reason: format!("unrecognized table source at token {at}"),
    };

    let mut levels = vec![Level::default()];
    let mut expect_source = false;
    let mut i = 0;

    while i < tokens.len() {
        let token = &tokens[i];

        if std::mem::take(&mut expect_source) {
            if *token == Token::Sym('(') {
                let subquery = tokens.get(i + 1).is_some_and(|t| t.is_keyword("select"));
                levels.push(Level {
                    in_sources: true,
                    source_paren: true,
                });
                expect_source = !subquery;
                i += 1;
                continue;
            }
            let (name, next) = table_name(&tokens, i).ok_or_else(|| unknown_source(i))?;
            record(name);
            i = skip_alias(&tokens, next);
            continue;
        }

        match token {
            Token::Sym('(') => levels.push(Level::default()),
            Token::Sym(')') => {
                if levels.len() > 1
                    && let Some(level) = levels.pop()
                    && level.source_paren
                {
                    i = skip_alias(&tokens, i + 1);
                    continue;
                }
            }
            Token::Sym(',') => expect_source = levels.last().is_some_and(|l| l.in_sources),
            t if t.is_keyword("from") || t.is_keyword("join") => {
                if let Some(level) = levels.last_mut() {
                    level.in_sources = true;
                }
                expect_source = true;
            }
            t if t.is_keyword("in") => {
                if let Some((name, next)) = table_name(&tokens, i + 1) {
                    record(name);
                    i = next;
                    continue;
                }
            }
            t if CLAUSE_END.iter().any(|kw| t.is_keyword(kw)) => {
                if let Some(level) = levels.last_mut() {
                    level.in_sources = false;
                }
            }
            _ => {}
        }
        i += 1;
    }

    if expect_source {
        return Err(unknown_source(tokens.len()));
    }
    Ok(tables)
}

fn table_name(tokens: &[Token], i: usize) -> Option<(String, usize)> {
    let mut name = tokens.get(i)?.ident()?.to_owned();
    let mut j = i + 1;
    while tokens.get(j) == Some(&Token::Sym('.')) {
        let Some(part) = tokens.get(j + 1).and_then(Token::ident) else {
            break;
        };
        name = part.to_owned();
        j += 2;
    }
    Some((name, j))
}

fn skip_alias(tokens: &[Token], j: usize) -> usize {
    match tokens.get(j) {
        Some(t) if t.is_keyword("as") => j + 2,
        Some(t) if t.ident().is_some() => j + 1,
        _ => j,
    }
}

/// Rejects anything but a single `SELECT` over allowed tables.
#[derive(Debug, Clone)]
pub struct SqlGuard {
    allowed: Vec<String>,
}

impl SqlGuard {
    #[must_use]
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed: allowed
                .into_iter()
                .map(|t| t.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// # Errors
    ///
    /// Returns [`ToolError::Refused`] naming the first violated rule.
    pub fn check(&self, sql: &str) -> Result<(), ToolError> {
        let refuse = |reason: String| Err(ToolError::Refused { reason });

        let mut tokens = tokenize(sql);
        while tokens.last() == Some(&Token::Sym(';')) {
            tokens.pop();
        }
        if tokens.contains(&Token::Sym(';')) {
            return refuse("multiple statements".into());
        }
        if !tokens.first().is_some_and(|t| t.is_keyword("select")) {
            return refuse("only SELECT statements are allowed".into());
        }
        if let Some(Token::Word(w)) = tokens
            .iter()
            .find(|t| FORBIDDEN.iter().any(|kw| t.is_keyword(kw)))
        {
            return refuse(format!("forbidden keyword: {w}"));
        }
        for table in referenced_tables(sql)? {
            if !self.allowed.contains(&table.to_lowercase()) {
                return refuse(format!("table not allowed: {table}"));
            }
        }
        Ok(())
    }
}

/// Pull the SQL statement out of an LLM response: the first ```` ```sql ```` block, or the
/// whole response when it is a bare `SELECT`.
#[must_use]
pub fn extract_sql(response: &str) -> Option<&str> {
    if let Some(block) = first_fenced_block(response, "sql") {
        return Some(block);
    }
    let trimmed = response.trim();
    trimmed
        .get(..6)
        .is_some_and(|p| p.eq_ignore_ascii_case("select"))
        .then_some(trimmed)
}

/// Path named by `sqlite:///path` or `sqlite://path`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidConnectionString`] for any other scheme or an empty path.
pub fn parse_connection_string(url: &str) -> Result<PathBuf, ConfigError> {
    let path = url
        .strip_prefix("sqlite:///")
        .or_else(|| url.strip_prefix("sqlite://"))
        .ok_or_else(|| ConfigError::InvalidConnectionString(url.to_owned()))?;
    if path.trim().is_empty() {
        return Err(ConfigError::InvalidConnectionString(url.to_owned()));
    }
    Ok(PathBuf::from(path))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOutcome {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// More rows existed than the row cap allowed.
    pub truncated: bool,
}

impl QueryOutcome {
    #[must_use]
    pub fn render(&self) -> String {
        if self.rows.is_empty() {
            return "(no rows)".to_owned();
        }
        let mut out = self.columns.join(" | ");
        for row in &self.rows {
            out.push('\n');
            out.push_str(&row.join(" | "));
        }
        if self.truncated {
            let _ = write!(out, "\n(truncated to {} rows)", self.rows.len());
        }
        out
    }
}

/// A read-only SQLite database restricted to its allowed tables.
#[derive(Debug, Clone)]
pub struct SqlDatabase {
    pool: SqlitePool,
    tables: Vec<String>,
    guard: SqlGuard,
    max_rows: usize,
}

impl SqlDatabase {
    /// Open the configured database read-only and resolve its allowed tables.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Config`] for a missing or malformed URL or when no allowed table
    /// exists, and [`ToolError::Sql`] if the database cannot be opened.
    pub async fn connect(config: &SqlConfig) -> Result<Self, ToolError> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| ConfigError::Invalid("tools.sql.url is not set".into()))?;
        let path = parse_connection_string(url)?;

        let options = SqliteConnectOptions::new()
            .filename(&path)
            .read_only(true)
            .create_if_missing(false);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let existing: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type IN ('table', 'view') \
             AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&pool)
        .await?;

        let tables: Vec<String> = if config.allowed_tables.is_empty() {
            existing
        } else {
            for wanted in &config.allowed_tables {
                if !existing.iter().any(|t| t.eq_ignore_ascii_case(wanted)) {
                    tracing::warn!(table = %wanted, "allowed table not found in database");
                }
            }
            existing
                .into_iter()
                .filter(|t| {
                    config
                        .allowed_tables
                        .iter()
                        .any(|w| w.eq_ignore_ascii_case(t))
                })
                .collect()
        };

        if tables.is_empty() {
            return Err(ConfigError::Invalid(format!("no usable tables in {}", path.display())).into());
        }

        tracing::info!(db = %path.display(), tables = tables.len(), "SQL database opened read-only");
        Ok(Self {
            pool,
            guard: SqlGuard::new(&tables),
            tables,
            max_rows: config.max_rows,
        })
    }

    #[must_use]
    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    #[must_use]
    pub fn guard(&self) -> &SqlGuard {
        &self.guard
    }

    /// Column list and one sample row for every allowed table.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Sql`] if the catalog cannot be read.
    pub async fn schema(&self) -> Result<String, ToolError> {
        let mut out = String::new();
        for table in &self.tables {
            let quoted = quote_ident(table);
            let columns = sqlx::query(&format!("PRAGMA table_info({quoted})"))
                .fetch_all(&self.pool)
                .await?;
            let cols: Vec<String> = columns
                .iter()
                .map(|c| {
                    let name: String = c.try_get("name").unwrap_or_default();
                    let ty: String = c.try_get("type").unwrap_or_default();
                    format!("{name} {ty}").trim_end().to_owned()
                })
                .collect();
            let _ = writeln!(out, "CREATE TABLE {quoted} ({})", cols.join(", "));

            let sample = sqlx::query(&format!("SELECT * FROM {quoted} LIMIT 1"))
                .fetch_optional(&self.pool)
                .await?;
            if let Some(row) = sample {
                let values: Vec<String> = row
                    .columns()
                    .iter()
                    .enumerate()
                    .map(|(i, c)| format!("{}={}", c.name(), render_value(&row, i)))
                    .collect();
                let _ = writeln!(out, "-- sample row: {}", values.join(", "));
            }
            out.push('\n');
        }
        Ok(out.trim_end().to_owned())
    }

    /// Check `sql` with the guard, then run it with the row cap.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Refused`] before touching the database when the guard rejects the
    /// statement, or [`ToolError::Sql`] if execution fails.
    pub async fn run(&self, sql: &str) -> Result<QueryOutcome, ToolError> {
        self.guard.check(sql)?;

        let mut outcome = QueryOutcome::default();
        let mut rows = sqlx::query(sql).fetch(&self.pool);
        while let Some(row) = rows.try_next().await? {
            if outcome.columns.is_empty() {
                outcome.columns = row.columns().iter().map(|c| c.name().to_owned()).collect();
            }
            if outcome.rows.len() == self.max_rows {
                outcome.truncated = true;
                break;
            }
            outcome
                .rows
                .push((0..row.len()).map(|i| render_value(&row, i)).collect());
        }

        tracing::debug!(rows = outcome.rows.len(), truncated = outcome.truncated, "SQL executed");
        Ok(outcome)
    }
}

fn render_value(row: &SqliteRow, i: usize) -> String {
    let Ok(raw) = row.try_get_raw(i) else {
        return "?".to_owned();
    };
    if raw.is_null() {
        return "NULL".to_owned();
    }
    let kind = raw.type_info().name().to_owned();
    let rendered = match kind.as_str() {
        "INTEGER" => row.try_get::<i64, _>(i).map(|v| v.to_string()),
        "REAL" => row.try_get::<f64, _>(i).map(|v| v.to_string()),
        "TEXT" => row.try_get::<String, _>(i),
        _ => row
            .try_get::<Vec<u8>, _>(i)
            .map(|b| format!("<{} bytes>", b.len())),
    };
    rendered.unwrap_or_else(|_| "?".to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn fixture() -> (tempfile::TempDir, String) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop.db");
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await.unwrap();
        for stmt in [
            "CREATE TABLE customers (id INTEGER PRIMARY KEY, name TEXT, balance REAL)",
            "CREATE TABLE orders (id INTEGER PRIMARY KEY, customer_id INTEGER, total REAL)",
            "CREATE TABLE secrets (token TEXT)",
            "INSERT INTO customers VALUES (1, 'Ada', 10.5), (2, 'Linus', NULL), (3, 'Grace', 7.0)",
            "INSERT INTO orders VALUES (1, 1, 99.0), (2, 1, 5.0)",
            "INSERT INTO secrets VALUES ('hunter2')",
        ] {
            sqlx::query(stmt).execute(&pool).await.unwrap();
        }
        pool.close().await;
        let url = format!("sqlite:///{}", path.display());
        (dir, url)
    }

    fn config(url: &str, allowed: &[&str]) -> SqlConfig {
        SqlConfig {
            url: Some(url.to_owned()),
            allowed_tables: allowed.iter().map(|s| (*s).to_owned()).collect(),
            max_rows: 50,
        }
    }

    fn tables(sql: &str) -> Vec<String> {
        referenced_tables(sql).unwrap()
    }

    #[test]
    fn referenced_tables_simple_and_joins() {
        assert_eq!(tables("SELECT * FROM users"), ["users"]);
        assert_eq!(
            tables("select a.x from albums a join artists ar on a.id = ar.id"),
            ["albums", "artists"]
        );
        assert_eq!(
            tables("SELECT * FROM t1, t2 AS b LEFT OUTER JOIN t3 USING (id)"),
            ["t1", "t2", "t3"]
        );
    }

    #[test]
    fn referenced_tables_quoted_and_qualified() {
        assert_eq!(tables(r#"SELECT * FROM "Invoice Line""#), ["Invoice Line"]);
        assert_eq!(tables("SELECT * FROM main.`Track`"), ["Track"]);
        assert_eq!(tables("SELECT * FROM [Genre] g"), ["Genre"]);
    }

    #[test]
    fn referenced_tables_in_subqueries_and_not_in_strings() {
        assert_eq!(
            tables(
                "SELECT name FROM (SELECT * FROM customers) WHERE name != 'from orders'"
            ),
            ["customers"]
        );
        assert_eq!(tables("SELECT 1 -- FROM hidden"), Vec::<String>::new());
    }

    #[test]
    fn referenced_tables_follow_lists_after_subqueries_and_joins() {
        assert_eq!(
            tables("SELECT * FROM (SELECT 1) AS t, secrets"),
            ["secrets"]
        );
        assert_eq!(
            tables("SELECT * FROM (SELECT id FROM orders) o, customers c, secrets"),
            ["orders", "customers", "secrets"]
        );
        assert_eq!(
            tables("SELECT * FROM a JOIN b ON a.id = b.id, secrets WHERE x = 1"),
            ["a", "b", "secrets"]
        );
        assert_eq!(tables("SELECT * FROM (a JOIN b USING (id))"), ["a", "b"]);
    }

    #[test]
    fn referenced_tables_in_table_form() {
        assert_eq!(
            tables("SELECT name FROM customers WHERE name NOT IN secrets"),
            ["customers", "secrets"]
        );
        assert_eq!(tables("SELECT 1 WHERE 2 IN (1, 2, 3)"), Vec::<String>::new());
    }

    #[test]
    fn referenced_tables_rejects_unknown_sources() {
        assert!(referenced_tables("SELECT * FROM 'customers'").is_err());
        assert!(referenced_tables("SELECT * FROM").is_err());
        assert!(referenced_tables("SELECT * FROM customers,").is_err());
    }

    #[test]
    fn guard_allows_select_on_allowed_tables() {
        let guard = SqlGuard::new(["Album", "Artist"]);
        assert!(guard.check("SELECT * FROM album;").is_ok());
        assert!(guard.check("SELECT COUNT(*) FROM Album JOIN Artist ON 1=1").is_ok());
        assert!(guard.check("SELECT 1").is_ok());
    }

    #[test]
    fn guard_refuses_writes_and_other_tables() {
        let guard = SqlGuard::new(["album"]);
        for sql in [
            "DROP TABLE album",
            "DELETE FROM album",
            "SELECT * FROM album; DROP TABLE album",
            "SELECT * FROM employee",
            "WITH x AS (SELECT 1) SELECT * FROM x",
            "SELECT * FROM album WHERE id IN (SELECT id FROM secrets)",
            "SELECT * FROM (SELECT 1) AS t, secrets",
            "SELECT * FROM album a JOIN album b ON 1=1, secrets",
            "SELECT title FROM album WHERE title IN secrets",
            "SELECT * FROM album, 'secrets'",
            "",
        ] {
            assert!(
                matches!(guard.check(sql), Err(ToolError::Refused { .. })),
                "{sql} should be refused"
            );
        }
    }

    #[test]
    fn extract_sql_prefers_fenced_block() {
        assert_eq!(
            extract_sql("Here:\n```sql\nSELECT 1\n```"),
            Some("SELECT 1")
        );
        assert_eq!(extract_sql("  select * from t  "), Some("select * from t"));
        assert_eq!(extract_sql("I don't know"), None);
    }

    #[test]
    fn connection_string_forms() {
        assert_eq!(
            parse_connection_string("sqlite:///data/chinook.db").unwrap(),
            PathBuf::from("data/chinook.db")
        );
        assert_eq!(
            parse_connection_string("sqlite:////tmp/x.db").unwrap(),
            PathBuf::from("/tmp/x.db")
        );
        assert_eq!(
            parse_connection_string("sqlite://rel.db").unwrap(),
            PathBuf::from("rel.db")
        );
        assert!(parse_connection_string("postgres://localhost/db").is_err());
        assert!(parse_connection_string("sqlite:///").is_err());
    }

    #[test]
    fn render_outcome() {
        let outcome = QueryOutcome {
            columns: vec!["name".into()],
            rows: vec![vec!["Ada".into()]],
            truncated: true,
        };
        assert_eq!(outcome.render(), "name\nAda\n(truncated to 1 rows)");
        assert_eq!(QueryOutcome::default().render(), "(no rows)");
    }

    #[tokio::test]
    async fn connect_lists_allowed_tables() {
        let (_dir, url) = fixture().await;
        let db = SqlDatabase::connect(&config(&url, &[])).await.unwrap();
        assert_eq!(db.tables(), ["customers", "orders", "secrets"]);

        let db = SqlDatabase::connect(&config(&url, &["Customers", "missing"]))
            .await
            .unwrap();
        assert_eq!(db.tables(), ["customers"]);
    }

    #[tokio::test]
    async fn connect_rejects_bad_url_and_empty_allow_list_match() {
        let err = SqlDatabase::connect(&config("mysql://x", &[])).await.unwrap_err();
        assert!(matches!(err, ToolError::Config(ConfigError::InvalidConnectionString(_))));

        let (_dir, url) = fixture().await;
        let err = SqlDatabase::connect(&config(&url, &["nope"])).await.unwrap_err();
        assert!(matches!(err, ToolError::Config(_)));
    }

    #[tokio::test]
    async fn run_formats_rows_by_type() {
        let (_dir, url) = fixture().await;
        let db = SqlDatabase::connect(&config(&url, &["customers", "orders"])).await.unwrap();
        let outcome = db
            .run("SELECT name, balance FROM customers ORDER BY id")
            .await
            .unwrap();
        assert_eq!(outcome.columns, ["name", "balance"]);
        assert_eq!(outcome.rows[0], ["Ada", "10.5"]);
        assert_eq!(outcome.rows[1], ["Linus", "NULL"]);

        let count = db.run("SELECT COUNT(*) AS n FROM orders").await.unwrap();
        assert_eq!(count.rows, [["2"]]);
    }

    #[tokio::test]
    async fn run_refuses_disallowed_table() {
        let (_dir, url) = fixture().await;
        let db = SqlDatabase::connect(&config(&url, &["customers"])).await.unwrap();
        let err = db.run("SELECT token FROM secrets").await.unwrap_err();
        assert!(matches!(err, ToolError::Refused { .. }));
    }

    #[tokio::test]
    async fn run_refuses_tables_after_a_subquery_source() {
        let (_dir, url) = fixture().await;
        let db = SqlDatabase::connect(&config(&url, &["customers"])).await.unwrap();
        for sql in [
            "SELECT token FROM (SELECT 1) AS t, secrets",
            "SELECT name FROM customers WHERE name IN secrets",
        ] {
            let err = db.run(sql).await.unwrap_err();
            assert!(matches!(err, ToolError::Refused { .. }), "{sql} should be refused");
        }
    }

    #[tokio::test]
    async fn run_caps_rows() {
        let (_dir, url) = fixture().await;
        let mut cfg = config(&url, &[]);
        cfg.max_rows = 2;
        let db = SqlDatabase::connect(&cfg).await.unwrap();
        let outcome = db.run("SELECT id FROM customers").await.unwrap();
        assert_eq!(outcome.rows.len(), 2);
        assert!(outcome.truncated);
    }

    #[tokio::test]
    async fn schema_includes_columns_and_sample_row() {
        let (_dir, url) = fixture().await;
        let db = SqlDatabase::connect(&config(&url, &["customers"])).await.unwrap();
        let schema = db.schema().await.unwrap();
        assert!(schema.contains("CREATE TABLE \"customers\" (id INTEGER, name TEXT, balance REAL)"));
        assert!(schema.contains("-- sample row: id=1, name=Ada, balance=10.5"));
        assert!(!schema.contains("secrets"));
    }
}
