//! Timezone report binary.
//!
//! Loads tenants and orders from a JSON seed file into the in-memory
//! repository and prints one report as JSON.
//!
//! # Usage
//!
//! ```bash
//! tz-report <seed.json> demo
//! tz-report <seed.json> compare 2024-08-19T23:30:00Z
//! tz-report <seed.json> analysis 2024-08-19
//! tz-report <seed.json> orders [timezone] [limit] [offset]
//! tz-report <seed.json> aggregate local_date timezone
//! tz-report <seed.json> merchants
//! tz-report <seed.json> health
//! ```
//!
//! # Environment Variables
//!
//! - `TZ_ENGINE_CONFIG`: Path to a `tz_engine.toml` (otherwise the default
//!   locations are searched; built-in defaults apply only when no file
//!   exists there)
//! - `RUST_LOG`: Log level (default: info)

use std::env;

use anyhow::{anyhow, bail, Context};
use serde::Serialize;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use merchant_tz::config::EngineConfig;
use merchant_tz::db::{seed::SeedData, services, RecordFilter, ServiceError};
use merchant_tz::services::{Dimension, OrderQuery};
use merchant_tz::time::{parse_local_date, parse_utc_instant};
use merchant_tz::EngineError;

const USAGE: &str = "usage: tz-report <seed.json> <demo|compare [utc]|analysis <date>|orders [timezone] [limit] [offset]|aggregate <dimension>...|merchants|health>";

fn load_config() -> anyhow::Result<EngineConfig> {
    if let Ok(path) = env::var("TZ_ENGINE_CONFIG") {
        return EngineConfig::from_file(&path)
            .with_context(|| format!("loading configuration from {}", path));
    }
    match EngineConfig::from_default_location().context("loading tz_engine.toml")? {
        Some(config) => Ok(config),
        None => {
            warn!("No tz_engine.toml found; using built-in defaults");
            Ok(EngineConfig::default())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_dimension(name: &str) -> anyhow::Result<Dimension> {
    serde_json::from_value(serde_json::Value::String(name.to_string()))
        .map_err(|_| anyhow!("unknown dimension '{}'", name))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let result = run().await;
    if let Err(e) = &result {
        if let Some(service) = e.downcast_ref::<ServiceError>() {
            error!(
                code = service.code(),
                caller_error = service.is_caller_error(),
                retryable = service.is_retryable(),
                "Report failed"
            );
        } else if let Some(engine) = e.downcast_ref::<EngineError>() {
            error!(code = engine.code(), "Report failed");
        }
    }
    result
}

fn init_logging() {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let (seed_path, command, rest) = match args.as_slice() {
        [seed, command, rest @ ..] => (seed, command.as_str(), rest),
        _ => bail!(USAGE),
    };

    let engine = load_config()?.build_engine()?;
    let repo = SeedData::from_file(seed_path)?.into_repository();
    info!(
        "Loaded {} tenants and {} records",
        repo.tenant_count(),
        repo.record_count()
    );

    match command {
        "demo" => print_json(&services::timezone_demo(&repo, &engine).await?),
        "compare" => {
            let instant = match rest.first() {
                Some(s) => parse_utc_instant(s)?,
                None => engine.demo_instant(),
            };
            print_json(&services::compare_all(&repo, &engine, instant).await?)
        }
        "analysis" => {
            let date = rest.first().ok_or_else(|| anyhow!("analysis needs a YYYY-MM-DD date"))?;
            let date = parse_local_date(date)?;
            print_json(&services::analyze_date(&repo, &engine, date).await?)
        }
        "orders" => {
            let mut query = OrderQuery::default();
            if let Some(tz) = rest.first() {
                query = query.in_timezone(tz.as_str());
            }
            query.limit = rest.get(1).and_then(|s| s.parse().ok());
            query.offset = rest.get(2).and_then(|s| s.parse().ok());
            print_json(&services::list_orders(&repo, &engine, &query).await?)
        }
        "aggregate" => {
            let dimensions = rest
                .iter()
                .map(|d| parse_dimension(d))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let result =
                services::aggregate_records(&repo, &engine, &RecordFilter::new(), &dimensions)
                    .await?;
            print_json(&result)
        }
        "merchants" => print_json(&services::list_tenants(&repo).await?),
        "health" => print_json(&services::health_check(&repo).await?),
        other => bail!("unknown command '{}'\n{}", other, USAGE),
    }
}
