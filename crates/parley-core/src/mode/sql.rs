use parley_llm::LlmProvider;
use parley_llm::provider::Message;
use parley_tools::sql::extract_sql;
use parley_tools::{REFUSAL, SqlDatabase, ToolError};

use super::Reply;
use crate::channel::{Channel, Reference};
use crate::error::ChatError;
use crate::synthesizer::Synthesizer;

fn sql_prompt(tables: &[String], schema: &str) -> String {
    format!(
        "You are a SQL expert working with a SQLite database.\n\
ONLY use existing tables: {}.\n\
Never invent or assume columns or tables.\n\
Reply with exactly one read-only SELECT statement inside a ```sql block.\n\
If uncertain, respond with: \"{REFUSAL}\"\n\n\
Schema:\n{schema}",
        tables.join(", ")
    )
}

fn answer_prompt(query: &str, sql: &str, rows: &str) -> String {
    format!(
        "Question: {query}\n\nSQL query:\n{sql}\n\nResult:\n{rows}\n\n\
Answer the question in plain language using only this result."
    )
}

/// Listing of the tables the session may query.
#[must_use]
pub fn table_listing(db: &SqlDatabase) -> String {
    format!("Available tables: {}", db.tables().join(", "))
}

async fn reply_with<C: Channel>(text: String, channel: &mut C) -> Result<Reply, ChatError> {
    channel.send(&text).await?;
    Ok(Reply::text(text))
}

/// Natural-language question to a guarded SELECT, then rows to an answer.
///
/// Questions mentioning "tables" are answered from the table list. Statements the guard
/// rejects yield the fixed refusal without touching the database.
///
/// # Errors
///
/// Returns [`ChatError::Generation`] if either LLM call fails and [`ChatError::Tool`] if the
/// schema cannot be read.
pub async fn answer<P: LlmProvider, C: Channel>(
    synth: &Synthesizer<'_, P>,
    db: &SqlDatabase,
    query: &str,
    history: &[Message],
    channel: &mut C,
) -> Result<Reply, ChatError> {
    if query.to_lowercase().contains("tables") {
        return reply_with(table_listing(db), channel).await;
    }

    let schema = db.schema().await?;
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Message::system(sql_prompt(db.tables(), &schema)));
    messages.extend_from_slice(history);
    messages.push(Message::user(query));
    let draft = synth.complete(&messages).await?;

    let Some(sql) = extract_sql(&draft) else {
        tracing::info!("LLM produced no SQL statement");
        return reply_with(REFUSAL.to_owned(), channel).await;
    };
    tracing::debug!(sql, "generated SQL");

    let outcome = match db.run(sql).await {
        Ok(outcome) => outcome,
        Err(ToolError::Refused { reason }) => {
            tracing::warn!(sql, reason = %reason, "SQL refused");
            return reply_with(REFUSAL.to_owned(), channel).await;
        }
        Err(ToolError::Sql(e)) => {
            tracing::warn!(sql, "SQL execution failed: {e}");
            let text = format!("The query could not be run: {e}\n\n{}", table_listing(db));
            return reply_with(text, channel).await;
        }
        Err(e) => return Err(e.into()),
    };

    let prompt = answer_prompt(query, sql, &outcome.render());
    let text = synth.generate(&[Message::user(prompt)], channel).await?;
    Ok(Reply::text(text).with_references(vec![Reference::new("SQL").with_detail(sql)]))
}

#[cfg(test)]
mod tests {
    use parley_llm::mock::MockProvider;
    use parley_tools::SqlConfig;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

    use super::*;
    use crate::channel::RecordingChannel;

    async fn database(dir: &tempfile::TempDir, allowed: &[&str]) -> SqlDatabase {
        let path = dir.path().join("music.db");
        let pool = SqlitePoolOptions::new()
            .connect_with(
                SqliteConnectOptions::new()
                    .filename(&path)
                    .create_if_missing(true),
            )
            .await
            .unwrap();
        for stmt in [
            "CREATE TABLE Artist (ArtistId INTEGER PRIMARY KEY, Name TEXT)",
            "CREATE TABLE Album (AlbumId INTEGER PRIMARY KEY, Title TEXT, ArtistId INTEGER)",
            "CREATE TABLE Employee (EmployeeId INTEGER PRIMARY KEY, Salary REAL)",
            "INSERT INTO Artist VALUES (1, 'AC/DC'), (2, 'Accept')",
            "INSERT INTO Album VALUES (1, 'For Those About To Rock', 1), (2, 'Balls to the Wall', 2), (3, 'Let There Be Rock', 1)",
            "INSERT INTO Employee VALUES (1, 1000.0)",
        ] {
            sqlx::query(stmt).execute(&pool).await.unwrap();
        }
        pool.close().await;

        SqlDatabase::connect(&SqlConfig {
            url: Some(format!("sqlite:///{}", path.display())),
            allowed_tables: allowed.iter().map(|s| (*s).to_owned()).collect(),
            max_rows: 50,
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn tables_question_skips_llm() {
        let dir = tempfile::tempdir().unwrap();
        let db = database(&dir, &["Album", "Artist"]).await;
        let provider = MockProvider::default();
        let synth = Synthesizer::new(&provider, false);
        let mut ch = RecordingChannel::default();

        let reply = answer(&synth, &db, "Which tables exist?", &[], &mut ch)
            .await
            .unwrap();
        assert_eq!(reply.text, "Available tables: Album, Artist");
        assert!(provider.prompts().is_empty());
    }

    #[tokio::test]
    async fn generated_select_is_run_and_summarized() {
        let dir = tempfile::tempdir().unwrap();
        let db = database(&dir, &["Album", "Artist"]).await;
        let provider = MockProvider::with_responses(vec![
            "```sql\nSELECT COUNT(*) AS n FROM Album a JOIN Artist ar ON a.ArtistId = ar.ArtistId WHERE ar.Name = 'AC/DC'\n```".into(),
            "AC/DC has 2 albums.".into(),
        ]);
        let synth = Synthesizer::new(&provider, false);
        let mut ch = RecordingChannel::default();

        let reply = answer(&synth, &db, "How many albums does AC/DC have?", &[], &mut ch)
            .await
            .unwrap();
        assert_eq!(reply.text, "AC/DC has 2 albums.");
        assert_eq!(reply.references[0].label, "SQL");

        let prompts = provider.prompts();
        assert!(prompts[0][0].content.contains("ONLY use existing tables: Album, Artist."));
        assert!(prompts[0][0].content.contains("-- sample row:"));
        assert!(prompts[1][0].content.contains("n\n2"));
        assert_eq!(ch.sent, ["AC/DC has 2 albums."]);
    }

    #[tokio::test]
    async fn disallowed_table_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let db = database(&dir, &["Album", "Artist"]).await;
        let provider = MockProvider::with_responses(vec![
            "```sql\nSELECT Salary FROM Employee\n```".into(),
        ]);
        let synth = Synthesizer::new(&provider, false);
        let mut ch = RecordingChannel::default();

        let reply = answer(&synth, &db, "What is the top salary?", &[], &mut ch)
            .await
            .unwrap();
        assert_eq!(reply.text, REFUSAL);
        assert_eq!(provider.prompts().len(), 1);
    }

    #[tokio::test]
    async fn write_statement_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let db = database(&dir, &[]).await;
        let provider =
            MockProvider::with_responses(vec!["```sql\nDELETE FROM Album\n```".into()]);
        let synth = Synthesizer::new(&provider, false);
        let mut ch = RecordingChannel::default();

        let reply = answer(&synth, &db, "Remove all albums", &[], &mut ch)
            .await
            .unwrap();
        assert_eq!(reply.text, REFUSAL);
    }

    #[tokio::test]
    async fn llm_refusal_passes_through() {
        let dir = tempfile::tempdir().unwrap();
        let db = database(&dir, &[]).await;
        let provider = MockProvider::with_responses(vec![REFUSAL.into()]);
        let synth = Synthesizer::new(&provider, false);
        let reply = answer(&synth, &db, "Who won the 1998 World Cup?", &[], &mut RecordingChannel::default())
            .await
            .unwrap();
        assert_eq!(reply.text, REFUSAL);
    }

    #[tokio::test]
    async fn bad_column_reports_tables() {
        let dir = tempfile::tempdir().unwrap();
        let db = database(&dir, &["Album"]).await;
        let provider = MockProvider::with_responses(vec!["SELECT Price FROM Album".into()]);
        let synth = Synthesizer::new(&provider, false);
        let reply = answer(&synth, &db, "Album prices?", &[], &mut RecordingChannel::default())
            .await
            .unwrap();
        assert!(reply.text.starts_with("The query could not be run"));
        assert!(reply.text.ends_with("Available tables: Album"));
    }

    #[tokio::test]
    async fn generation_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let db = database(&dir, &[]).await;
        let provider = MockProvider::failing();
        let synth = Synthesizer::new(&provider, false);
        let err = answer(&synth, &db, "How many artists?", &[], &mut RecordingChannel::default())
            .await
            .unwrap_err();
        assert!(err.is_generation());
    }
}
