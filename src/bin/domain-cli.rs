use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};
use url::Url;

#[derive(Parser)]
#[command(name = "domain-cli")]
#[command(about = "Manage tenant custom domains through the dashboard API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Dashboard API key, if the server requires one.
    #[arg(short, long, env = "TENANT_EDGE_API_KEY")]
    key: Option<String>,

    /// Act as this user (site owner).
    #[arg(long = "user")]
    user_id: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Attach a custom domain to a site
    Set { site_id: String, domain: String },
    /// Detach the site's custom domain
    Remove { site_id: String },
    /// Check whether a domain points at the hosting platform
    Verify { domain: String },
    /// Check that the server is up
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = Url::parse(&cli.url)?;

    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {key}"))?);
    }
    if let Some(user_id) = &cli.user_id {
        headers.insert("x-user-id", HeaderValue::from_str(user_id)?);
    }

    let request = match &cli.command {
        Commands::Set { site_id, domain } => client
            .put(endpoint(&base, &["api", "sites", site_id, "domain"])?)
            .json(&json!({ "domain": domain })),
        Commands::Remove { site_id } => {
            client.delete(endpoint(&base, &["api", "sites", site_id, "domain"])?)
        }
        Commands::Verify { domain } => {
            client.get(endpoint(&base, &["api", "domains", domain, "verification"])?)
        }
        Commands::Health => client.get(endpoint(&base, &["healthz"])?),
    };

    let res = request.headers(headers).send().await?;
    print_response(res).await
}

/// Append percent-encoded path segments to the server URL.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, Box<dyn std::error::Error>> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| format!("'{base}' cannot be used as a base URL"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    match serde_json::from_str::<Value>(&text) {
        Ok(json) if status.is_success() => println!("{}", serde_json::to_string_pretty(&json)?),
        Ok(json) => {
            eprintln!("Error: dashboard API returned status {status}");
            eprintln!("{}", serde_json::to_string_pretty(&json)?);
            std::process::exit(1);
        }
        Err(_) => {
            eprintln!("Error: unexpected response (status {status}): {text}");
            std::process::exit(1);
        }
    }
    Ok(())
}
