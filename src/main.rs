use anyhow::Context;
use clap::Parser;
use trip_planner::config::cli::Command;
use trip_planner::utils::error::ErrorSeverity;
use trip_planner::utils::{logger, validation::Validate};
use trip_planner::{Cli, DispatchOutcome, Dispatcher, ToolContext, TravelConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting trip-planner CLI");

    let config = match &cli.config {
        Some(path) => TravelConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => TravelConfig::from_env(),
    };
    if cli.verbose {
        tracing::debug!("Config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }

    let mut dispatcher = Dispatcher::from_config(config);

    let Some(call) = cli.command.to_tool_call() else {
        let definitions = dispatcher.tool_definitions();
        println!("{}", serde_json::to_string_pretty(&definitions)?);
        return Ok(());
    };

    let mut ctx = ToolContext::new(format!("cli-{}", chrono::Utc::now().timestamp_millis()));
    let mut outcome = dispatcher.dispatch(call, &mut ctx).await;

    let transferred_to = match &outcome {
        DispatchOutcome::Transferred { to } => Some(*to),
        DispatchOutcome::Completed { .. } => None,
    };
    if let (Command::Transfer { args: Some(args), .. }, Some(to)) = (&cli.command, transferred_to) {
        tracing::info!("🔀 Running {} after transfer", to);
        let arguments: serde_json::Value =
            serde_json::from_str(args).context("--args must be a JSON object")?;
        outcome = dispatcher.resume(arguments, &mut ctx).await;
    }

    let failed = outcome.envelope().is_some_and(|e| e.is_error());
    println!("{}", serde_json::to_string_pretty(&outcome.into_json())?);

    if failed {
        std::process::exit(1);
    }
    Ok(())
}
