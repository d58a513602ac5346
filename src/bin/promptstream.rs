//! Command-line host for a streaming chat backend.
//!
//! Sends a prompt to the backend's chat route and prints the answer as it
//! streams in.
//!
//! # Usage
//!
//! ```bash
//! # Ask one question
//! promptstream Where is the nearest community center?
//!
//! # Ask the default question
//! promptstream
//!
//! # Point at another backend and keep asking
//! promptstream --base-url http://10.0.0.5:8000 --repl
//! ```
//!
//! When `--base-url` is absent, `PROMPTSTREAM_BASE_URL` is consulted before
//! falling back to the local default.

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use promptstream::{ChatArgs, ChatClient, ClientConfig, TerminalDisplay, resolve_prompt};

/// Environment variable naming the backend when no flag is given.
const BASE_URL_ENV: &str = "PROMPTSTREAM_BASE_URL";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (mut args, words) =
        ChatArgs::from_command_line_relaxed("promptstream [OPTIONS] [PROMPT]...");
    if args.base_url.is_none() {
        args.base_url = std::env::var(BASE_URL_ENV).ok();
    }
    let use_color = !args.no_color;
    let repl = args.repl;

    let client = ChatClient::new(ClientConfig::from(args))?;
    let mut display = TerminalDisplay::with_color(use_color);

    if !repl {
        let input = words.join(" ");
        let outcome = client.submit(resolve_prompt(&input), &mut display).await;
        if !outcome.is_success() {
            std::process::exit(1);
        }
        return Ok(());
    }

    let mut rl = DefaultEditor::new()?;
    println!("Connected to {}", client.chat_url());
    println!("Press Ctrl+D to exit\n");

    loop {
        match rl.readline("You: ") {
            Ok(line) => {
                let prompt = resolve_prompt(&line);
                let _ = rl.add_history_entry(prompt);
                if line.trim().is_empty() {
                    println!("(asking: {prompt})");
                }
                client.submit(prompt, &mut display).await;
                println!();
            }
            Err(ReadlineError::Interrupted) => {
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                eprintln!("Input error: {err}");
                break;
            }
        }
    }

    Ok(())
}
