use anyhow::Context;
use clap::Parser;
use contract_split::config::LogFormat;
use contract_split::utils::error::ErrorSeverity;
use contract_split::utils::{logger, validation::Validate};
use contract_split::{CliConfig, LocalStorage, PartitionEngine, PartitionPipeline, TomlConfig};

fn main() -> anyhow::Result<()> {
    let args = CliConfig::parse();

    // 初始化日誌
    match args.log_format {
        LogFormat::Compact => logger::init_cli_logger(args.verbose),
        LogFormat::Json => logger::init_json_logger(args.verbose),
    }

    tracing::info!("🚀 Starting contract-split");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("Failed to load config file '{}'", args.config))?;

    // 套用命令列覆蓋設定
    if let Some(root) = &args.root {
        config.project.root = Some(root.clone());
        tracing::info!("🔧 Project root overridden to: {}", root);
    }
    if let Some(checked) = args.checked_factory {
        config.set_checked_factory(checked);
        tracing::info!("🔧 checked_factory overridden to: {}", checked);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let storage = LocalStorage::new(config.root());
    let engine = PartitionEngine::new(PartitionPipeline::new(storage, config));

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no files will be written");
        match engine.analyze() {
            Ok(result) => {
                println!("{}", result.coverage.render_text());
                return Ok(());
            }
            Err(e) => exit_with(e),
        }
    }

    match engine.run() {
        Ok(summary) => {
            tracing::info!(
                "✅ {} sections, {} contracts, {} coverage gaps",
                summary.sections,
                summary.contracts,
                summary.coverage_gaps
            );
            for path in &summary.written {
                println!("📁 {}", path);
            }
        }
        Err(e) => exit_with(e),
    }

    Ok(())
}

fn exit_with(e: contract_split::PartitionError) -> ! {
    tracing::error!(
        "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());

    // 依錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
