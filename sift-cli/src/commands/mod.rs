//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod analyze;
mod collect;

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use sift_client::ClientError;

use crate::config::Config;

/// Shop hosts the collect worker knows how to scrape
const SUPPORTED_SHOPS: &[&str] = &["trendyol.com", "hepsiburada.com"];

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Collect reviews for a product page
    Collect {
        /// Product page URL
        #[arg(long)]
        url: String,

        /// Maximum number of review pages to fetch
        #[arg(long)]
        max_pages: Option<u32>,

        /// Maximum number of reviews to fetch
        #[arg(long)]
        max_reviews: Option<u32>,
    },
    /// Collect reviews and rebuild the search index
    Index {
        /// Product page URL
        #[arg(long)]
        url: String,

        /// Maximum number of review pages to fetch
        #[arg(long)]
        max_pages: Option<u32>,

        /// Maximum number of reviews to fetch
        #[arg(long)]
        max_reviews: Option<u32>,
    },
    /// Ask a question against the reviews indexed so far
    Analyze {
        /// Question to answer
        #[arg(long, short)]
        question: String,
    },
    /// Collect, index and answer a question in one go
    Ask {
        /// Product page URL
        #[arg(long)]
        url: String,

        /// Question to answer
        #[arg(long, short)]
        question: String,

        /// Maximum number of review pages to fetch
        #[arg(long)]
        max_pages: Option<u32>,

        /// Maximum number of reviews to fetch
        #[arg(long)]
        max_reviews: Option<u32>,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    let client = sift_client::SiftClient::new(&config.server_url);

    let result = match command {
        Commands::Collect {
            url,
            max_pages,
            max_reviews,
        } => collect::collect(&client, url, max_pages, max_reviews, false).await,
        Commands::Index {
            url,
            max_pages,
            max_reviews,
        } => collect::collect(&client, url, max_pages, max_reviews, true).await,
        Commands::Analyze { question } => analyze::analyze(&client, question).await,
        Commands::Ask {
            url,
            question,
            max_pages,
            max_reviews,
        } => analyze::ask(&client, url, question, max_pages, max_reviews).await,
    };

    match result {
        Err(err) => match err.downcast_ref::<ClientError>() {
            Some(client_err) => {
                print_client_error(client_err);
                anyhow::bail!("request failed")
            }
            None => Err(err),
        },
        ok => ok,
    }
}

/// Warns when a URL is not on a shop the collect worker supports
pub(crate) fn warn_if_unsupported(product_url: &str) {
    if !is_supported_shop(product_url) {
        eprintln!(
            "{}",
            format!(
                "Warning: {} is not a {} product page; collection may find nothing.",
                product_url,
                SUPPORTED_SHOPS.join(" or ")
            )
            .yellow()
        );
    }
}

fn is_supported_shop(product_url: &str) -> bool {
    let Ok(url) = url::Url::parse(product_url) else {
        return false;
    };
    let Some(host) = url.host_str() else {
        return false;
    };

    SUPPORTED_SHOPS
        .iter()
        .any(|shop| host == *shop || host.ends_with(&format!(".{}", shop)))
}

/// Prints a client error, including stage diagnostics when the server sent them
fn print_client_error(err: &ClientError) {
    let Some(body) = err.error_body() else {
        eprintln!("{} {}", "Error:".red().bold(), err);
        if err.is_timeout() {
            eprintln!("{}", "The request took too long. Please try again.".yellow());
        }
        return;
    };

    eprintln!("{} {}", "Error:".red().bold(), body.error);

    if let Some(stage) = &body.stage {
        eprintln!("  {} {}", "Stage:".bold(), stage);
    }
    if !body.skipped.is_empty() {
        eprintln!("  {} {}", "Skipped:".bold(), body.skipped.join(", "));
    }
    for (label, output) in [
        ("Collect output:", &body.collect_output),
        ("Index output:", &body.index_output),
        ("Stage output:", &body.output),
    ] {
        if let Some(output) = output.as_deref().filter(|o| !o.trim().is_empty()) {
            eprintln!("  {}", label.bold());
            eprintln!("{}", indent(output));
        }
    }
    if let Some(details) = body.details.as_deref().filter(|d| !d.trim().is_empty()) {
        eprintln!("  {}", "Details:".bold());
        eprintln!("{}", indent(details).red());
    }
}

pub(crate) fn indent(text: &str) -> String {
    text.trim_end()
        .lines()
        .map(|line| format!("    {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}
