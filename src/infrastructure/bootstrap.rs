use std::sync::Arc;

use tracing::{info, warn};

use crate::application::{QueryPipeline, SqlPromptBuilder, SqlSynthesizer};
use crate::domain::error::Result;
use crate::infrastructure::config::ServiceConfig;
use crate::infrastructure::db::catalog::SchemaCatalog;
use crate::infrastructure::db::executor::PgQueryExecutor;
use crate::infrastructure::llm_clients::{GroqClient, LLMClient};

/// What came up during startup; consumed by the health boundary.
#[derive(Debug, Clone, Copy)]
pub struct Readiness {
    pub schema_loaded: bool,
    pub model_ready: bool,
}

/// Process-wide state: the pipeline plus the read-only facts the health
/// endpoint reports. Shared via `Arc`, no locks needed.
pub struct AppState {
    pub pipeline: QueryPipeline,
    pub catalog: SchemaCatalog,
    pub readiness: Readiness,
    pub table_count: usize,
}

/// Two-phase, best-effort startup: a missing API key or an unreachable
/// database degrades the service (reported via `Readiness`) instead of
/// aborting the process. Only invalid configuration is fatal.
pub async fn bootstrap(config: &ServiceConfig) -> Result<AppState> {
    let catalog = SchemaCatalog::new(&config.database)?;
    let executor = PgQueryExecutor::new(&config.database)?;

    let client: Option<Arc<dyn LLMClient + Send + Sync>> = if config.llm.api_key.is_some() {
        info!("Groq client initialized (model: {})", config.llm.model);
        Some(Arc::new(GroqClient::new()))
    } else {
        warn!("No Groq API key configured; SQL synthesis will be unavailable");
        None
    };
    let model_ready = client.is_some();

    let schema = catalog.introspect().await;
    let schema_loaded = !schema.is_empty();
    if schema_loaded {
        info!("Loaded schema for {} tables", schema.table_count());
    } else {
        warn!("Starting with an empty schema description");
    }

    let prompt = SqlPromptBuilder::new().build(&schema);
    let synthesizer = SqlSynthesizer::new(client, config.llm.clone(), prompt);
    let pipeline = QueryPipeline::new(synthesizer, Arc::new(executor));

    Ok(AppState {
        pipeline,
        catalog,
        readiness: Readiness {
            schema_loaded,
            model_ready,
        },
        table_count: schema.table_count(),
    })
}
