use anyhow::{bail, Context};
use clap::Parser;
use verified_copy::domain::model::{ClaimOutcome, VerificationOutcome};
use verified_copy::utils::{logger, validation::Validate};
use verified_copy::{AppConfig, Backends};

#[derive(Parser)]
#[command(name = "verify-claims")]
#[command(about = "Fact-checks claims against web sources without generating ad copy")]
struct Args {
    /// Claims to verify
    claims: Vec<String>,

    /// Read additional claims from a file, one per line
    #[arg(short, long)]
    file: Option<String>,

    /// Product page URL, used to resolve the official domain
    #[arg(long)]
    product_url: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Override the worker count from the config file
    #[arg(long)]
    workers: Option<usize>,

    /// Print outcomes as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    let claims = collect_claims(&args)?;
    if claims.is_empty() {
        bail!("no claims given: pass them as arguments or with --file");
    }

    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("failed to load config file '{}'", path))?,
        None => AppConfig::from_env(),
    };
    if let Some(workers) = args.workers {
        tracing::info!("🔧 Worker count overridden to: {}", workers);
        config.verification.workers = workers;
    }
    config.validate().context("invalid configuration")?;

    let backends = Backends::from_config(&config).context("failed to build HTTP clients")?;
    let pool = backends.verification_pool(&config);

    let outcomes = pool
        .verify_batch(&claims, args.product_url.as_deref())
        .await;
    pool.shutdown();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    } else {
        print_outcomes(&outcomes);
    }

    Ok(())
}

fn collect_claims(args: &Args) -> anyhow::Result<Vec<String>> {
    let mut claims: Vec<String> = args
        .claims
        .iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();

    if let Some(path) = &args.file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read claims file '{}'", path))?;
        claims.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string),
        );
    }

    Ok(claims)
}

fn print_outcomes(outcomes: &[ClaimOutcome]) {
    for outcome in outcomes {
        match &outcome.outcome {
            VerificationOutcome::Verified { source_url } => {
                println!("✅ {}\n   Source: {}", outcome.claim, source_url);
            }
            VerificationOutcome::Unverified => {
                println!("❌ {}\n   Not verified", outcome.claim);
            }
        }
    }

    let verified = outcomes.iter().filter(|o| o.outcome.is_verified()).count();
    println!("\n{} of {} claims verified", verified, outcomes.len());
}
