use crate::domain::error::{AppError, Result};
use crate::domain::query::QueryResponse;
use crate::infrastructure::db::executor::QueryExecutor;
use std::sync::Arc;
use tracing::{error, info};

use super::sql_synthesizer::SqlSynthesizer;

const EMPTY_SQL_TEXT: &str = "Could not generate SQL";
const EMPTY_SQL_ERROR: &str = "SQL generation failed";
const EXECUTION_FAILED_TEXT: &str = "SQL execution failed";

/// Sequences synthesis and execution for one question and assembles the
/// response envelope. Exactly one terminal state per call:
///
/// - synthesis fault            → `Err` (service-level, surfaced by the boundary)
/// - empty SQL                  → `Ok`, no execution attempted
/// - statement rejected         → `Ok`, engine message in `error`
/// - connectivity fault         → `Err` (service-level)
/// - success                    → `Ok` with rows and a count summary
pub struct QueryPipeline {
    synthesizer: SqlSynthesizer,
    executor: Arc<dyn QueryExecutor>,
}

impl QueryPipeline {
    pub fn new(synthesizer: SqlSynthesizer, executor: Arc<dyn QueryExecutor>) -> Self {
        Self {
            synthesizer,
            executor,
        }
    }

    pub async fn answer(&self, question: &str) -> Result<QueryResponse> {
        info!("Query: {}", question);

        let sql = self.synthesizer.synthesize(question).await?;
        info!("Generated SQL: {}", sql);

        if sql.is_empty() {
            return Ok(QueryResponse {
                question: question.to_string(),
                sql: String::new(),
                results: Vec::new(),
                text: EMPTY_SQL_TEXT.to_string(),
                error: Some(EMPTY_SQL_ERROR.to_string()),
            });
        }

        match self.executor.execute(&sql).await {
            Ok(result) => {
                info!("Returned {} results", result.row_count);
                Ok(QueryResponse {
                    question: question.to_string(),
                    text: summarize(result.row_count),
                    sql,
                    results: result.rows,
                    error: None,
                })
            }
            Err(AppError::ExecutionFailed(message)) => {
                error!("SQL error: {}", message);
                Ok(QueryResponse {
                    question: question.to_string(),
                    sql,
                    results: Vec::new(),
                    text: EXECUTION_FAILED_TEXT.to_string(),
                    error: Some(message),
                })
            }
            Err(other) => Err(other),
        }
    }
}

fn summarize(row_count: usize) -> String {
    format!(
        "Found {} result{}",
        row_count,
        if row_count == 1 { "" } else { "s" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::Result;
    use crate::domain::llm_config::LLMConfig;
    use crate::domain::query::{CellValue, ExecutionResult, Row};
    use crate::infrastructure::llm_clients::LLMClient;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Echoes back a canned reply, or a SQL statement derived from the
    /// question when none is canned.
    struct MockLLM {
        reply: Option<std::result::Result<String, String>>,
    }

    #[async_trait]
    impl LLMClient for MockLLM {
        async fn generate(&self, _: &LLMConfig, _: &str, question: &str) -> Result<String> {
            match &self.reply {
                Some(Ok(sql)) => Ok(sql.clone()),
                Some(Err(msg)) => Err(AppError::GenerationFailed(msg.clone())),
                None => Ok(format!("SELECT '{}' as q", question)),
            }
        }
    }

    /// Counts executions and returns a canned outcome.
    struct SpyExecutor {
        calls: AtomicUsize,
        outcome: std::result::Result<Vec<Row>, AppError>,
    }

    impl SpyExecutor {
        fn returning_rows(rows: Vec<Row>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                outcome: Ok(rows),
            })
        }

        fn failing_with(err: AppError) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                outcome: Err(err),
            })
        }
    }

    #[async_trait]
    impl QueryExecutor for SpyExecutor {
        async fn execute(&self, _sql: &str) -> Result<ExecutionResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.outcome {
                Ok(rows) => Ok(ExecutionResult {
                    columns: rows
                        .first()
                        .map(|r| r.cells.iter().map(|(n, _)| n.clone()).collect())
                        .unwrap_or_default(),
                    row_count: rows.len(),
                    rows: rows.clone(),
                }),
                Err(AppError::ExecutionFailed(m)) => Err(AppError::ExecutionFailed(m.clone())),
                Err(AppError::ConnectionFailed(m)) => Err(AppError::ConnectionFailed(m.clone())),
                Err(_) => Err(AppError::Internal("unexpected".to_string())),
            }
        }
    }

    fn pipeline(
        llm_reply: Option<std::result::Result<String, String>>,
        executor: Arc<SpyExecutor>,
    ) -> QueryPipeline {
        let synthesizer = SqlSynthesizer::new(
            Some(Arc::new(MockLLM { reply: llm_reply })),
            LLMConfig::default(),
            "prompt".to_string(),
        );
        QueryPipeline::new(synthesizer, executor)
    }

    fn row(cells: Vec<(&str, CellValue)>) -> Row {
        Row {
            cells: cells
                .into_iter()
                .map(|(n, v)| (n.to_string(), v))
                .collect(),
        }
    }

    #[tokio::test]
    async fn success_with_single_row_uses_singular_summary() {
        let executor = SpyExecutor::returning_rows(vec![row(vec![(
            "total_spend",
            CellValue::Float(350.0),
        )])]);
        let pipeline = pipeline(
            Some(Ok(
                "```sql\nSELECT SUM(ABS(\"invoiceTotal\")) as total_spend FROM \"Summary\"\n```"
                    .to_string(),
            )),
            executor.clone(),
        );

        let response = pipeline.answer("Total spend").await.unwrap();

        assert_eq!(response.question, "Total spend");
        assert_eq!(
            response.sql,
            "SELECT SUM(ABS(\"invoiceTotal\")) as total_spend FROM \"Summary\""
        );
        assert_eq!(response.results.len(), 1);
        assert_eq!(
            response.results[0].get("total_spend"),
            Some(&CellValue::Float(350.0))
        );
        assert_eq!(response.text, "Found 1 result");
        assert!(response.error.is_none());
        assert_eq!(executor.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn success_with_many_rows_uses_plural_summary() {
        let rows = vec![
            row(vec![("name", CellValue::Text("Acme".into()))]),
            row(vec![("name", CellValue::Text("Globex".into()))]),
        ];
        let pipeline = pipeline(
            Some(Ok("SELECT name FROM \"Vendor\"".to_string())),
            SpyExecutor::returning_rows(rows),
        );

        let response = pipeline.answer("vendors").await.unwrap();
        assert_eq!(response.text, "Found 2 results");
    }

    #[tokio::test]
    async fn empty_rows_use_plural_summary() {
        let pipeline = pipeline(
            Some(Ok("SELECT name FROM \"Vendor\" WHERE false".to_string())),
            SpyExecutor::returning_rows(vec![]),
        );

        let response = pipeline.answer("vendors").await.unwrap();
        assert_eq!(response.text, "Found 0 results");
        assert!(response.error.is_none());
    }

    #[tokio::test]
    async fn empty_sql_short_circuits_without_execution() {
        let executor = SpyExecutor::returning_rows(vec![]);
        let pipeline = pipeline(Some(Ok("```sql\n```".to_string())), executor.clone());

        let response = pipeline.answer("gibberish").await.unwrap();

        assert_eq!(response.sql, "");
        assert!(response.results.is_empty());
        assert_eq!(response.text, "Could not generate SQL");
        assert_eq!(response.error.as_deref(), Some("SQL generation failed"));
        assert_eq!(executor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rejected_statement_reports_engine_message() {
        let pipeline = pipeline(
            Some(Ok("SELECT * FROM \"Nope\"".to_string())),
            SpyExecutor::failing_with(AppError::ExecutionFailed(
                "relation \"Nope\" does not exist".to_string(),
            )),
        );

        let response = pipeline.answer("show me nope").await.unwrap();

        assert_eq!(response.sql, "SELECT * FROM \"Nope\"");
        assert!(response.results.is_empty());
        assert_eq!(response.text, "SQL execution failed");
        assert_eq!(
            response.error.as_deref(),
            Some("relation \"Nope\" does not exist")
        );
    }

    #[tokio::test]
    async fn generation_failure_propagates_as_service_fault() {
        let executor = SpyExecutor::returning_rows(vec![]);
        let pipeline = pipeline(Some(Err("model timed out".to_string())), executor.clone());

        assert!(matches!(
            pipeline.answer("q").await,
            Err(AppError::GenerationFailed(_))
        ));
        assert_eq!(executor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_model_client_propagates_as_service_fault() {
        let synthesizer =
            SqlSynthesizer::new(None, LLMConfig::default(), "prompt".to_string());
        let pipeline = QueryPipeline::new(synthesizer, SpyExecutor::returning_rows(vec![]));

        assert!(matches!(
            pipeline.answer("q").await,
            Err(AppError::ModelUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn connection_failure_propagates_as_service_fault() {
        let pipeline = pipeline(
            Some(Ok("SELECT 1".to_string())),
            SpyExecutor::failing_with(AppError::ConnectionFailed(
                "connection refused".to_string(),
            )),
        );

        assert!(matches!(
            pipeline.answer("q").await,
            Err(AppError::ConnectionFailed(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_questions_keep_their_own_envelope() {
        let pipeline = Arc::new(pipeline(None, SpyExecutor::returning_rows(vec![])));

        let mut handles = Vec::new();
        for i in 0..16 {
            let pipeline = pipeline.clone();
            handles.push(tokio::spawn(async move {
                let question = format!("question number {}", i);
                let response = pipeline.answer(&question).await.unwrap();
                (question, response)
            }));
        }

        for handle in handles {
            let (question, response) = handle.await.unwrap();
            assert_eq!(response.question, question);
            assert!(response.sql.contains(&question));
        }
    }
}
