use std::io::{BufRead, Write};

use clap::{Parser, Subcommand};
use serde_json::json;

#[derive(Parser)]
#[command(name = "vera", version, about = "Vera Health CLI - conversational health tracking client")]
struct Cli {
    /// API base URL
    #[arg(long, env = "VERA_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    /// Conversation key; keep it to resume a session, omit for a fresh one
    #[arg(long, env = "VERA_CONVERSATION_ID")]
    conversation_id: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check API health
    Health,
    /// Interactive chat session (default)
    Chat,
}

fn client() -> reqwest::Client {
    reqwest::Client::new()
}

fn exit_error(message: &str) -> ! {
    let err = json!({
        "error": "cli_error",
        "message": message
    });
    eprintln!("{}", serde_json::to_string_pretty(&err).unwrap());
    std::process::exit(1);
}

const BANNER: &str = "🎉 **Welcome to your Personal Health Assistant!**\n\n\
This system helps you track and manage your health data:\n\
• Mood tracking with trend analysis\n\
• Glucose monitoring with smart alerts\n\
• Food logging with nutrition analysis\n\
• Personalized meal planning\n\
• Health insights and correlations\n\n\
To get started, please provide your User ID or tell me your name.\n\
Type 'quit' to exit.";

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Health) => health(&cli.api_url).await,
        Some(Commands::Chat) | None => {
            let conversation_id = cli
                .conversation_id
                .unwrap_or_else(|| uuid::Uuid::now_v7().to_string());
            chat(&cli.api_url, &conversation_id).await
        }
    };

    if let Err(e) = result {
        exit_error(&e.to_string());
    }
}

async fn health(api_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let resp = client().get(format!("{api_url}/health")).send().await?;
    let body: serde_json::Value = resp.json().await?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

async fn chat(api_url: &str, conversation_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("{BANNER}");

    let http = client();
    let mut state = "unauthenticated".to_string();
    let stdin = std::io::stdin();

    loop {
        print!("\n[{state}] You: ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let message = line.trim();

        if ["quit", "exit", "bye"].contains(&message.to_lowercase().as_str()) {
            println!("\n👋 Thank you for using the Health Agent System. Stay healthy!");
            break;
        }

        let resp = http
            .post(format!("{api_url}/v1/turn"))
            .json(&json!({
                "conversation_id": conversation_id,
                "message": message
            }))
            .send()
            .await?;

        let status = resp.status();
        let body: serde_json::Value = resp.json().await?;
        if !status.is_success() {
            eprintln!("{}", serde_json::to_string_pretty(&body)?);
            continue;
        }

        if let Some(session_state) = body["session"]["state"].as_str() {
            state = session_state.to_string();
        }
        let reply = body["reply"].as_str().unwrap_or("(no reply)");
        println!("\nAssistant: {reply}");
    }

    Ok(())
}
