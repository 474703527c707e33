use clap::Parser;
use results_engine::utils::error::{EngineError, ErrorSeverity};
use results_engine::utils::{logger, validation::Validate};
use results_engine::{CliConfig, ResultsEngine, TomlConfig, View};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", cli.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if config.json_logs() {
        logger::init_json_logger(config.log_level());
    } else {
        logger::init_cli_logger(cli.verbose, config.log_level());
    }

    tracing::info!("🚀 Starting results-engine");
    tracing::debug!("CLI config: {:?}", cli);

    if let Some(concurrency) = cli.concurrency {
        config.set_concurrency(concurrency);
        tracing::info!("🔧 Concurrency overridden to: {}", concurrency);
    }

    // 驗證配置
    if let Err(e) = cli.validate().and_then(|_| config.validate()) {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    match run(&cli, &config).await {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                "❌ Request failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
            Ok(())
        }
    }
}

async fn run(cli: &CliConfig, config: &TomlConfig) -> Result<String, EngineError> {
    let repository = Arc::new(config.build_repository()?);
    let engine = ResultsEngine::from_config(repository, config)?;
    let criteria = cli.criteria();
    let target = cli.target_id()?;

    let output = match cli.view {
        View::Summary => {
            serde_json::to_string_pretty(&engine.class_summary(target, &criteria).await?)?
        }
        View::Report => engine.class_report(target, &criteria).await?.to_json_pretty()?,
        View::Student => {
            serde_json::to_string_pretty(&engine.student_summary(target, &criteria).await?)?
        }
        View::Classes => serde_json::to_string_pretty(&engine.list_classes(target).await?)?,
    };

    Ok(output)
}
