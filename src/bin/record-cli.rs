use clap::{Parser, Subcommand};
use reqwest::Url;

#[derive(Parser)]
#[command(name = "record-cli")]
#[command(about = "Query a running CSW record proxy", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch one record by identifier
    Record {
        /// Catalog file identifier
        id: String,
        /// Output format: structured, raw or page (json, xml, html also accepted)
        #[arg(short, long)]
        format: Option<String>,
    },
    /// Print the sitemap
    Sitemap,
    /// Check proxy liveness
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = Url::parse(&cli.url)?;

    let url = match &cli.command {
        Commands::Record { id, format } => {
            let mut url = endpoint(&base, &["record", id.as_str()])?;
            if let Some(format) = format {
                url.query_pairs_mut().append_pair("f", format);
            }
            url
        }
        Commands::Sitemap => endpoint(&base, &["sitemap.xml"])?,
        Commands::Health => endpoint(&base, &["health"])?,
    };

    let res = client.get(url).send().await?;
    print_response(res).await
}

/// Append `segments` to the proxy URL, keeping any path prefix it carries.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, Box<dyn std::error::Error>> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| "proxy URL cannot be a base")?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let is_json = res
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: proxy returned status {}", status);
        eprintln!("Response: {}", text);
        return Ok(());
    }

    if is_json {
        let json: serde_json::Value = serde_json::from_str(&text)?;
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        println!("{}", text);
    }
    Ok(())
}
