//! Command line interface of the operator binary

mod scenario;

pub use scenario::Scenario;

use clap::{Args, Parser, Subcommand};
use mesh_resilience::{
    AdaptiveBackoff, ContextAwareRetry, DependencyHealthGraph, Priority, ResilienceConfig,
    RetryContext,
};
use std::path::PathBuf;

/// Resilience core operator tool
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct CliArgs {
    /// Configuration file (YAML); defaults are used when omitted
    #[arg(long, short, env = "MESH_RESILIENCE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Commands {
    /// Replay a dependency graph scenario and print the resulting metrics
    Simulate(SimulateArgs),

    /// Classify an error and print the retry decision
    Classify(ClassifyArgs),

    /// Drive the adaptive backoff engine for one key
    Backoff(BackoffArgs),
}

#[derive(Debug, Args, Clone)]
pub struct SimulateArgs {
    /// Scenario file (YAML)
    #[arg(long)]
    pub scenario: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct ClassifyArgs {
    /// Error type name, e.g. TimedOut
    #[arg(long)]
    pub error_type: String,

    /// Error message
    #[arg(long, default_value = "")]
    pub message: String,

    #[arg(long, default_value = "GET")]
    pub method: String,

    /// 1-based attempt number that just failed
    #[arg(long, default_value_t = 1)]
    pub attempt: u32,

    #[arg(long)]
    pub priority: Option<Priority>,
}

#[derive(Debug, Args, Clone)]
pub struct BackoffArgs {
    #[arg(long, default_value = "default")]
    pub key: String,

    /// Number of attempts to simulate
    #[arg(long, default_value_t = 5)]
    pub attempts: u32,

    /// Outcomes to cycle through, T for success and F for failure
    #[arg(long, default_value = "F")]
    pub fail_pattern: String,

    /// Resource usage sample in 0..=1 passed with every delay request
    #[arg(long)]
    pub resource_usage: Option<f64>,
}

pub async fn load_config(path: Option<&PathBuf>) -> anyhow::Result<ResilienceConfig> {
    match path {
        Some(path) => Ok(ResilienceConfig::from_file(path).await?),
        None => Ok(ResilienceConfig::default()),
    }
}

pub async fn simulate(config: &ResilienceConfig, args: &SimulateArgs) -> anyhow::Result<String> {
    let scenario = Scenario::from_file(&args.scenario).await?;
    let graph = DependencyHealthGraph::new(config.graph.clone());

    let metrics = scenario.run(&graph).await;
    graph.shutdown().await;

    Ok(serde_json::to_string_pretty(&metrics?)?)
}

pub fn classify(config: &ResilienceConfig, args: &ClassifyArgs) -> anyhow::Result<String> {
    let mut context = RetryContext::new(&args.error_type, &args.message)
        .with_method(&args.method)
        .with_attempt(args.attempt);
    if let Some(priority) = args.priority {
        context = context.with_priority(priority);
    }

    let retry = ContextAwareRetry::new(config.retry.clone());
    let decision = retry.decide(&context);
    Ok(serde_json::to_string_pretty(&decision)?)
}

pub fn backoff(config: &ResilienceConfig, args: &BackoffArgs) -> anyhow::Result<Vec<String>> {
    let outcomes = parse_outcomes(&args.fail_pattern)?;
    let engine = AdaptiveBackoff::new(config.backoff.clone());

    let mut lines = Vec::with_capacity(args.attempts as usize);
    for (attempt, success) in (1..=args.attempts).zip(outcomes.iter().copied().cycle()) {
        let delay = engine.get_delay(&args.key, args.resource_usage);
        let strategy = engine
            .state_snapshot(&args.key)
            .and_then(|state| state.last_strategy);
        engine.record_attempt(&args.key, success);

        lines.push(format!(
            "attempt={} delay={:.3}s strategy={:?} success={}",
            attempt,
            delay.as_secs_f64(),
            strategy,
            success
        ));
    }
    Ok(lines)
}

fn parse_outcomes(pattern: &str) -> anyhow::Result<Vec<bool>> {
    let outcomes = pattern
        .chars()
        .map(|c| match c.to_ascii_uppercase() {
            'T' => Ok(true),
            'F' => Ok(false),
            other => Err(anyhow::anyhow!("Invalid outcome '{}', expected T or F", other)),
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    if outcomes.is_empty() {
        anyhow::bail!("Outcome pattern cannot be empty");
    }
    Ok(outcomes)
}
