use clap::{Parser, Subcommand};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Operator CLI for the upload relay", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:10000")]
    url: String,

    /// Value sent as X-Proxy-Token.
    #[arg(short, long)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the relay is up
    Health,
    /// Upload a file through the relay
    Upload {
        /// File to send
        path: PathBuf,

        /// Content type of the file part
        #[arg(long, default_value = "application/octet-stream")]
        content_type: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{}/", base)).send().await?;
            println!("{}", res.status());
            println!("{}", res.text().await?);
        }
        Commands::Upload { path, content_type } => {
            let data = tokio::fs::read(&path).await?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload.bin".to_string());

            let part = Part::bytes(data)
                .file_name(file_name)
                .mime_str(&content_type)?;
            let form = Form::new().part("file", part);

            let mut req = client.post(format!("{}/upload", base)).multipart(form);
            if let Some(token) = &cli.token {
                req = req.header("X-Proxy-Token", token);
            }

            print_response(req.send().await?).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if status.is_success() {
        println!("{}", status);
    } else {
        eprintln!("Error: relay returned status {}", status);
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
