//! Live build demo.
//!
//! Generates a component and prints the artifact as it grows.
//!
//! With `GEMINI_API_KEY` (or `GOOGLE_API_KEY`) set, this talks to Gemini;
//! otherwise a scripted generator stands in. Press Ctrl-C to cancel a
//! running generation.
//!
//! ```text
//! RUST_LOG=shellbay_session=debug cargo run -p shellbay --example live_build -- "A tip calculator"
//! ```

use shellbay::prelude::*;
use shellbay::{FixedGeneratorFactory, RetryConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

const DEFAULT_PROMPT: &str = "A counter with increment and reset buttons";

fn scripted_generator() -> MockGenerator {
    MockGenerator::new()
        .with_chunk_delay(Duration::from_millis(150))
        .with_chunks([
            "import React, { useState } from 'react';\n\n",
            "export default function App() {\n",
            "  const [count, setCount] = useState(0);\n",
            "  return (\n    <div className=\"p-8 space-x-2\">\n",
            "      <span>{count}</span>\n",
            "      <button onClick={() => setCount(count + 1)}>+</button>\n",
            "      <button onClick={() => setCount(0)}>Reset</button>\n",
            "    </div>\n  );\n}\n",
        ])
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let prompt = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_PROMPT.to_string());

    let settings = Settings::from_env()?;
    let workspace = if settings.api_key(AiProvider::Gemini).is_some() {
        tracing::info!("Using Gemini");
        Workspace::in_memory(Arc::new(settings)).with_retry(RetryConfig::for_api())
    } else {
        tracing::info!("No Gemini key found, using the scripted generator");
        let settings = settings.with_api_key(AiProvider::Gemini, "demo");
        Workspace::in_memory(Arc::new(settings))
            .with_factory(FixedGeneratorFactory::new(scripted_generator()))
    };

    let project = workspace.create_project(Some("Live build demo")).await?;
    let session = workspace.open(&project.id).await?;

    let mut events = session.chat().subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(ChatEvent::ArtifactReplaced(code)) => {
                    println!("--- artifact ({} bytes) ---\n{code}", code.len());
                }
                Ok(ChatEvent::MessageAppended(message)) => {
                    println!("[{}] {}", message.role, message.content);
                }
                Ok(ChatEvent::GenerationFinished) => break,
                Ok(ChatEvent::GenerationStarted) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Printer fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let outcome = session.submit_with_cancel(&prompt, cancel).await?;
    ctrl_c.abort();
    printer.await?;

    println!("\nOutcome: {outcome:?}");
    Ok(())
}
