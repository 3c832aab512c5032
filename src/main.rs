use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use aws_cost_notifier::{load_event, logging, parse_event, CostNotifier};

/// Post an AWS cost report to a Discord webhook.
///
/// Reads one scheduler event (JSON, EventBridge shape) from EVENT or stdin,
/// runs a single invocation, and prints the result object.
#[derive(Parser)]
#[command(name = "aws-cost-notifier", version, about)]
struct Cli {
    /// Event JSON file. Reads stdin when omitted.
    event: Option<PathBuf>,

    /// Print the message instead of posting it.
    #[arg(long)]
    dry_run: bool,

    /// Compute the report for this date (YYYY-MM-DD) instead of today (UTC).
    #[arg(long)]
    today: Option<chrono::NaiveDate>,

    /// Webhook request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init();

    let event = match &cli.event {
        Some(path) => load_event(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            parse_event(&buf)?
        }
    };

    let mut builder = CostNotifier::builder()
        .dry_run(cli.dry_run)
        .timeout(Duration::from_secs(cli.timeout));
    if let Some(today) = cli.today {
        builder = builder.today(today);
    }
    let notifier = builder.build().await?;

    let result = notifier.handle(&event).await;
    println!("{}", serde_json::to_string_pretty(&result)?);

    if !result.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
