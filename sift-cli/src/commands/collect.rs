//! Collect command handlers

use anyhow::Result;
use colored::*;
use sift_client::SiftClient;
use sift_core::dto::analysis::CollectRequest;

use super::{indent, warn_if_unsupported};

/// Collect reviews, optionally rebuilding the index afterwards
pub async fn collect(
    client: &SiftClient,
    url: String,
    max_pages: Option<u32>,
    max_reviews: Option<u32>,
    with_index: bool,
) -> Result<()> {
    warn_if_unsupported(&url);

    let req = CollectRequest {
        product_url: Some(url),
        max_pages,
        max_reviews,
    };

    println!("{}", "Collecting reviews...".dimmed());
    let response = if with_index {
        client.fetch_reviews(&req).await?
    } else {
        client.collect(&req).await?
    };

    println!("{}", response.message.green().bold());
    println!("{}", "Collect output:".bold());
    println!("{}", indent(&response.collect_output));

    if let Some(index_output) = &response.index_output {
        println!("{}", "Index output:".bold());
        println!("{}", indent(index_output));
    }

    Ok(())
}
