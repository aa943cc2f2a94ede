//! Analyze command handlers

use anyhow::Result;
use colored::*;
use sift_client::SiftClient;
use sift_core::dto::analysis::{AnalyzeRequest, CollectAndAnalyzeRequest};

use super::warn_if_unsupported;

/// Ask a question against the existing index
pub async fn analyze(client: &SiftClient, question: String) -> Result<()> {
    let response = client
        .analyze(&AnalyzeRequest {
            question: Some(question),
        })
        .await?;

    print_answer(&response.answer);
    Ok(())
}

/// Collect, index and answer in one request
pub async fn ask(
    client: &SiftClient,
    url: String,
    question: String,
    max_pages: Option<u32>,
    max_reviews: Option<u32>,
) -> Result<()> {
    warn_if_unsupported(&url);

    println!(
        "{}",
        "Collecting reviews, building the index and asking... this can take a few minutes."
            .dimmed()
    );

    let response = client
        .collect_and_analyze(&CollectAndAnalyzeRequest {
            question: Some(question),
            product_url: Some(url),
            max_pages,
            max_reviews,
        })
        .await?;

    print_answer(&response.answer);
    Ok(())
}

fn print_answer(answer: &str) {
    println!("{}", "Answer:".green().bold());
    if answer.is_empty() {
        println!("{}", "(the query worker printed nothing)".yellow());
    } else {
        // Answers come back as markdown; bold markers are noise in a terminal
        println!("{}", answer.replace("**", ""));
    }
}
