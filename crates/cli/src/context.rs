//! Application context - wires configuration, history and engine together

use std::path::Path;
use std::sync::Arc;

use amlwatch_core::EvaluationContext;
use amlwatch_engine::{EngineBuilder, RiskConfig, RiskEvaluationEngine, RiskVerdict};
use amlwatch_history::{InMemoryHistory, TransactionLog, TransactionRecord};

/// Application context
///
/// History is replayed from the JSONL log on startup; every recorded
/// evaluation is appended to both the log and the in-memory store.
pub struct AppContext {
    pub engine: RiskEvaluationEngine,
    pub history: Arc<InMemoryHistory>,
    log: TransactionLog,
}

impl AppContext {
    /// Load configuration (defaults when no path is given) and history
    pub fn open(config_path: Option<&Path>, history_path: &Path) -> Result<Self, anyhow::Error> {
        let config = match config_path {
            Some(path) => RiskConfig::from_file(path)?,
            None => RiskConfig::default(),
        };
        Self::with_config(config, history_path)
    }

    pub fn with_config(config: RiskConfig, history_path: &Path) -> Result<Self, anyhow::Error> {
        let log = TransactionLog::open(history_path)?;
        let history = Arc::new(log.load()?);

        let engine = EngineBuilder::new(config, history.clone()).build()?;

        Ok(Self {
            engine,
            history,
            log,
        })
    }

    /// Evaluate a transaction, optionally recording it with its flag
    pub async fn evaluate(
        &mut self,
        ctx: &EvaluationContext,
        record: bool,
    ) -> Result<RiskVerdict, anyhow::Error> {
        let verdict = self.engine.evaluate(ctx).await?;

        if record {
            let record = TransactionRecord::from_context(ctx, verdict.flagged);
            self.log.append(&record)?;
            self.history.record(record)?;
        }

        Ok(verdict)
    }

    pub fn config(&self) -> &RiskConfig {
        self.engine.config()
    }

    pub fn history_path(&self) -> &Path {
        self.log.path()
    }
}
