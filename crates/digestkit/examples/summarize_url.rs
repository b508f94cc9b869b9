//! Example: Summarize a URL and show each pipeline stage
//!
//! Run with: GROQ_API_KEY=... cargo run -p digestkit --example summarize_url -- <URL> [MODEL]

use digestkit::{classify, validate_url, SummarizeRequest, Summarizer};

const DEFAULT_URL: &str = "https://example.com";
const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

#[tokio::main]
async fn main() {
    let mut args = std::env::args().skip(1);
    let url = args.next().unwrap_or_else(|| DEFAULT_URL.to_string());
    let model = args.next().unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let api_key = std::env::var("GROQ_API_KEY").unwrap_or_default();

    println!("DigestKit Example");
    println!("=================\n");

    match validate_url(&url) {
        Ok(parsed) => println!("Strategy: {}", classify(&parsed).name()),
        Err(e) => println!("Strategy: none ({})", e),
    }

    let summarizer = Summarizer::builder().verify_certificates(true).build();
    let request = SummarizeRequest::new(url, api_key, model);

    let result = summarizer
        .digest_with_status(&request, |stage| println!("  -> {}", stage))
        .await;

    match result {
        Ok(digest) => {
            println!();
            for (key, value) in &digest.source_metadata {
                println!("{}: {}", key, value);
            }
            println!("\n{}", digest.summary.text);
        }
        Err(e) => {
            eprintln!("\nError: {}", e);
            std::process::exit(1);
        }
    }
}
