use anyhow::Context;
use clap::Parser;
use placer::domain::ports::ConfigProvider;
use placer::utils::error::{ErrorSeverity, PlacerError};
use placer::utils::{logger, validation::Validate};
use placer::{render_ledger, render_round, CliConfig, Command, DirectoryStore, PlacerEngine};
use std::io::Write;

fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 載入配置
    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.logging.json {
        logger::init_json_logger(config.log_level());
    } else {
        logger::init_cli_logger(config.log_level());
    }

    tracing::info!("Starting placer in {}", config.data_dir());
    tracing::debug!("Resolved config: {:?}", config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let store = DirectoryStore::from_config(&config);
    let engine = PlacerEngine::with_policy(store, config.reuse_policy());
    let format = config.report_format();

    let result = match cli.command {
        Command::Next { dry_run: true } => {
            tracing::info!("🔍 DRY RUN MODE - the round will not be written");
            engine
                .plan_next()
                .and_then(|round| render_round(&round, format))
        }
        Command::Next { dry_run: false } => engine.run_next().and_then(|outcome| {
            tracing::info!(
                "✅ Round {} saved to: {}",
                outcome.round.number,
                outcome.location
            );
            render_round(&outcome.round, format)
        }),
        Command::Summary => engine
            .summary()
            .and_then(|ledger| render_ledger(&ledger, format)),
        Command::Show { round } => engine
            .show_round(round)
            .and_then(|round| render_round(&round, format)),
    };

    match result {
        Ok(report) => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(report.as_bytes())
                .and_then(|_| stdout.flush())
                .context("failed to write report to stdout")?;
            Ok(())
        }
        Err(e) => exit_with(e),
    }
}

fn exit_with(e: PlacerError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ placer failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
