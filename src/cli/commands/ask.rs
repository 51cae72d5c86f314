//! Ask command implementation.

use crate::agent::{Agent, ToolContext};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Credentials, Settings};
use crate::embedding::OpenAIEmbedder;
use crate::knowledge_base::Retriever;
use crate::weather::WeatherClient;
use anyhow::Result;
use std::sync::Arc;

/// Run the ask command.
pub async fn run_ask(question: &str, settings: Settings) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Ask, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'reise doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let credentials = Credentials::from_env()?;

    let embedder = Arc::new(OpenAIEmbedder::new(
        &credentials,
        &settings.embedding.model,
        settings.embedding.dimensions as usize,
    ));

    let weather = WeatherClient::new(&credentials, &settings.weather);
    let retriever = Retriever::open(&settings, embedder)?;
    let tools = ToolContext::new(weather, retriever);

    let agent = Agent::new(&credentials, &settings.agent, tools);

    let spinner = Output::spinner("Thinking...");

    match agent.run(question).await {
        Ok(response) => {
            spinner.finish_and_clear();

            println!("\n{}\n", response.content);

            if !response.tool_calls.is_empty() {
                Output::header(&format!("Tool calls ({})", response.tool_calls.len()));
                for call in &response.tool_calls {
                    Output::info(&format!("  {} {}", call.name, truncate(&call.arguments, 60)));
                }
                println!();
            }

            Output::info(&format!(
                "Completed in {} iteration(s)",
                response.iterations
            ));
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Agent failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
