//! CLI commands

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use amlwatch_core::EvaluationContext;
use amlwatch_engine::RiskVerdict;

use crate::context::AppContext;

/// Totals of a replay run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayStats {
    pub evaluated: usize,
    pub flagged: usize,
}

/// Evaluate a single transaction and print the verdict as JSON
pub async fn evaluate(
    ctx: &mut AppContext,
    entity: &str,
    amount: Decimal,
    currency: &str,
    country: &str,
    timestamp: DateTime<Utc>,
    record: bool,
) -> Result<RiskVerdict, anyhow::Error> {
    let context = EvaluationContext::new(entity, amount, currency, country, timestamp)?;
    let verdict = ctx.evaluate(&context, record).await?;

    println!("{}", serde_json::to_string_pretty(&verdict)?);
    Ok(verdict)
}

/// Evaluate a JSONL stream of contexts in order, recording each one so
/// later transactions see the earlier ones
pub async fn replay(ctx: &mut AppContext, input: &Path) -> Result<ReplayStats, anyhow::Error> {
    let reader = BufReader::new(File::open(input)?);
    let mut stats = ReplayStats::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let location = || format!("{}:{}", input.display(), index + 1);
        let context: EvaluationContext = serde_json::from_str(&line).with_context(location)?;
        let verdict = ctx.evaluate(&context, true).await.with_context(location)?;

        stats.evaluated += 1;
        if verdict.flagged {
            stats.flagged += 1;
        }

        println!("{}", serde_json::to_string(&verdict)?);
    }

    tracing::info!(
        input = %input.display(),
        evaluated = stats.evaluated,
        flagged = stats.flagged,
        "Replay complete"
    );
    println!(
        "✅ Replayed {} transactions, {} flagged",
        stats.evaluated, stats.flagged
    );
    Ok(stats)
}

/// Print the number of flagged transactions per UTC day
pub fn summary(ctx: &AppContext) -> Result<BTreeMap<NaiveDate, u64>, anyhow::Error> {
    let per_day = ctx.history.flagged_per_day()?;

    if per_day.is_empty() {
        println!("No flagged transactions in {}", ctx.history_path().display());
    }
    for (day, count) in &per_day {
        println!("{}  {}", day, count);
    }

    Ok(per_day)
}

/// Print the effective configuration
pub fn config(ctx: &AppContext) -> Result<(), anyhow::Error> {
    println!("{}", serde_json::to_string_pretty(ctx.config())?);
    Ok(())
}
