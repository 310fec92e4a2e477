use clap::Parser;
use reqwest::Client;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Fairness probe — drives a running batch server with repeated generate
/// calls and reports the resulting count spread.
#[derive(Parser)]
#[command(name = "loadgen")]
struct Args {
    /// Target batch server URL
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    server_url: String,

    /// Range size (N)
    #[arg(long, default_value_t = 50)]
    n: u32,

    /// Batch size (k)
    #[arg(long, default_value_t = 5)]
    k: u32,

    /// Range start (inclusive)
    #[arg(long, default_value_t = 1)]
    start: i64,

    /// Number of generate calls to issue
    #[arg(long, default_value_t = 1000)]
    rounds: u64,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let client = Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("failed to build HTTP client");

    tracing::info!(
        server = %args.server_url,
        n = args.n,
        k = args.k,
        start = args.start,
        rounds = args.rounds,
        "fairness probe starting"
    );

    let generate_url = format!("{}/api/generate", args.server_url);
    let body = json!({"n": args.n, "k": args.k, "start": args.start});

    for round in 0..args.rounds {
        let resp = match client.post(&generate_url).json(&body).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(round, error = %e, "generate request failed");
                std::process::exit(1);
            }
        };
        if !resp.status().is_success() {
            tracing::error!(round, status = %resp.status(), "generate rejected");
            std::process::exit(1);
        }
        if (round + 1) % 100 == 0 {
            tracing::info!(completed = round + 1, "progress");
        }
    }

    // Pull the counts snapshot and measure the spread.
    let counts_url = format!("{}/api/progress/counts", args.server_url);
    let text = match client.get(&counts_url).send().await {
        Ok(r) => match r.text().await {
            Ok(t) => t,
            Err(e) => {
                tracing::error!(error = %e, "failed to read counts body");
                std::process::exit(1);
            }
        },
        Err(e) => {
            tracing::error!(error = %e, "counts request failed");
            std::process::exit(1);
        }
    };

    let counts: HashMap<String, u64> = match serde_json::from_str(&text) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "counts snapshot did not parse");
            std::process::exit(1);
        }
    };

    let min = counts.values().copied().min().unwrap_or(0);
    let max = counts.values().copied().max().unwrap_or(0);
    let total: u64 = counts.values().sum();

    tracing::info!(
        items = counts.len(),
        total,
        min,
        max,
        spread = max - min,
        "fairness probe finished"
    );
}
