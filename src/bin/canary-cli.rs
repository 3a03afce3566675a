use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, ETAG, IF_MATCH};
use serde_json::Value;

use canary_controller::health::{split_list, ProbeTarget};

#[derive(Parser)]
#[command(name = "canary-cli")]
#[command(about = "Management CLI for the canary controller", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[arg(short, long, default_value = "")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask for a cookie decision
    Decide {
        app: String,
        /// Force "success" or "fail"
        #[arg(long)]
        outcome: Option<String>,
    },
    /// Show controller status
    Status,
    /// List every application record
    List,
    /// Show one application record and its version
    Get { app: String },
    /// Replace an application record from a JSON file
    Update {
        app: String,
        file: PathBuf,
        /// Only apply if the store is still at this version (ETag)
        #[arg(long)]
        if_match: Option<String>,
    },
    /// Check that each release is served for its cookie
    HealthCheck {
        #[arg(long)]
        page: String,
        /// ';'-delimited release names
        #[arg(long)]
        releases: String,
        /// ';'-delimited cookie names
        #[arg(long)]
        cookie_names: String,
        /// ';'-delimited cookie values
        #[arg(long)]
        cookie_values: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "canary_controller=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if !cli.key.is_empty() {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
        );
    }

    match cli.command {
        Commands::Decide { app, outcome } => {
            let mut req = client.get(format!("{}/apps/{}/cookie", cli.url, app));
            if let Some(outcome) = outcome {
                req = req.query(&[("outcome", outcome)]);
            }
            print_response(req.send().await?).await?;
        }
        Commands::Status => {
            let res = client
                .get(format!("{}/admin/status", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::List => {
            let res = client
                .get(format!("{}/apps", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Get { app } => {
            let res = client
                .get(format!("{}/apps/{}", cli.url, app))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Update { app, file, if_match } => {
            let record: Value = serde_json::from_str(&std::fs::read_to_string(file)?)?;
            if let Some(version) = if_match {
                headers.insert(IF_MATCH, HeaderValue::from_str(&format!("\"{}\"", version))?);
            }
            let res = client
                .put(format!("{}/apps/{}", cli.url, app))
                .headers(headers)
                .json(&record)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::HealthCheck {
            page,
            releases,
            cookie_names,
            cookie_values,
        } => {
            let report = match ProbeTarget::from_lists(
                page,
                split_list(&releases),
                split_list(&cookie_names),
                split_list(&cookie_values),
            ) {
                Ok(target) => target.run(&client).await,
                Err(report) => report,
            };
            println!("{}", report.status_code());
            if !report.is_healthy() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: controller returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    if let Some(etag) = res.headers().get(ETAG).and_then(|v| v.to_str().ok()) {
        eprintln!("Version: {}", etag.trim_matches('"'));
    }
    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
