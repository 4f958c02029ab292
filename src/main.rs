use std::process::ExitCode;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

use commitgen::{Agent, Config, GeminiClient, Result};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let interactive = std::env::args()
        .skip(1)
        .any(|arg| arg == "--interactive" || arg == "-i");

    match run(interactive).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("commitgen: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(interactive: bool) -> Result<()> {
    let config = Config::load(std::path::Path::new("."))?;
    let model = GeminiClient::from_config(&config)?;
    let mut agent = Agent::new(Arc::new(model)).with_max_tool_calls(config.max_tool_calls);

    if interactive {
        run_interactive(&mut agent).await
    } else {
        let message = agent.process("").await?;
        println!("{message}");
        Ok(())
    }
}

/// Read lines from stdin until EOF, feeding each to the agent. A failed
/// exchange reports its error and keeps the session alive; the transcript
/// keeps accumulating across lines.
async fn run_interactive<M: commitgen::LanguageModel>(agent: &mut Agent<M>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"> ").await.ok();
        stdout.flush().await.ok();
        // EOF or an unreadable stdin both end the session.
        let Some(line) = lines.next_line().await.ok().flatten() else {
            return Ok(());
        };

        match agent.process(line).await {
            Ok(result) => println!(">>> {result}\n"),
            Err(err) => eprintln!("commitgen: {err}"),
        }
    }
}
