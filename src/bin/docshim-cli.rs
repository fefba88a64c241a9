use anyhow::{Context, Result};
use axum::http::{header, HeaderMap, HeaderValue, Uri};
use clap::{Parser, Subcommand};
use docshim::redirect::{compute_destination, resolve, PathRule, RedirectDecision};
use docshim::request::decoded_path;
use docshim::tee::should_tee;

#[derive(Parser)]
#[command(name = "docshim-cli")]
#[command(about = "Inspect docshim redirect and mirroring decisions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the new-site URL for a legacy URL
    Destination {
        /// Legacy URL or path, e.g. "/github.com/foo/bar?imports"
        url: String,
    },
    /// Report whether requests for a path are mirrored to the collector
    Tee {
        /// Request path
        path: String,
    },
    /// Show the full redirect decision for a request
    Decide {
        /// Legacy URL or path
        url: String,
        /// Value of the consent cookie, if the visitor has one
        #[arg(long)]
        cookie: Option<String>,
        /// Host header of the request
        #[arg(long, default_value = "godoc.org")]
        host: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Destination { url } => {
            let uri = parse_uri(&url)?;
            let rule = PathRule::for_path(&decoded_path(&uri));
            println!("{}", compute_destination(&uri));
            println!("  rule: {:?}", rule);
        }
        Commands::Tee { path } => {
            if should_tee(&path) {
                println!("✅ {} is mirrored", path);
            } else {
                println!("⏭️  {} is not mirrored", path);
            }
        }
        Commands::Decide { url, cookie, host } => {
            let uri = parse_uri(&url)?;

            let mut headers = HeaderMap::new();
            headers.insert(
                header::HOST,
                HeaderValue::from_str(&host).context("invalid host")?,
            );
            if let Some(value) = cookie {
                let cookie = format!("pkggodev-redirect={value}");
                headers.insert(
                    header::COOKIE,
                    HeaderValue::from_str(&cookie).context("invalid cookie value")?,
                );
            }

            let decision = resolve(&uri, &headers);
            match &decision {
                RedirectDecision::Redirect { destination, .. } => {
                    println!("redirect → {}", destination);
                }
                RedirectDecision::Stay { .. } => println!("stay on legacy site"),
            }
            if let Some(update) = decision.cookie() {
                let value = update.header_value();
                println!("  Set-Cookie: {}", value.to_str().unwrap_or_default());
            }
        }
    }

    Ok(())
}

fn parse_uri(url: &str) -> Result<Uri> {
    url.parse::<Uri>()
        .with_context(|| format!("'{url}' is not a valid URL"))
}
