use clap::Parser;
use verified_copy::core::report;
use verified_copy::utils::error::{ErrorSeverity, VerifyError};
use verified_copy::utils::{logger, validation::Validate};
use verified_copy::{AppConfig, Backends, CliConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 是選用的
    dotenvy::dotenv().ok();

    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting verified-copy");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 驗證命令列參數
    if let Err(e) = cli.validate() {
        fail(&e, "Argument validation failed");
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => fail(&e, "Configuration failed"),
    };
    tracing::info!("✅ Configuration loaded and validated successfully");

    if cli.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let backends = match Backends::from_config(&config) {
        Ok(backends) => backends,
        Err(e) => fail(&e, "Failed to build HTTP clients"),
    };
    let pipeline = backends.pipeline(&config).with_monitoring(cli.monitor);

    let request = cli.copy_request();
    let result = pipeline.run(&request).await;
    pipeline.shutdown();

    let report = match result {
        Ok(report) => report,
        Err(e) => fail(&e, "Ad copy generation failed"),
    };

    tracing::info!(
        "✅ Done: {} of {} claims verified",
        report.verified_claims().len(),
        report.outcomes.len()
    );

    if cli.json {
        println!("{}", report::to_json(&report)?);
    } else {
        print!("{}", report::render_text(&report));
    }

    if let Some(path) = &cli.report_csv {
        if let Err(e) = report::save_csv(&report, path) {
            fail(&e, "Failed to write CSV report");
        }
        tracing::info!("📁 CSV report saved to: {}", path);
    }

    Ok(())
}

fn load_config(cli: &CliConfig) -> verified_copy::Result<AppConfig> {
    if let Some(path) = &cli.config {
        tracing::info!("📁 Loading configuration from: {}", path);
    }
    let config = cli.load_app_config()?;
    config.validate()?;
    config.validate_credentials()?;
    Ok(config)
}

fn fail(e: &VerifyError, context: &str) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ {}: {} (Category: {:?}, Severity: {:?})",
        context,
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    // 輸出用戶友好的錯誤信息
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low | ErrorSeverity::High => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
