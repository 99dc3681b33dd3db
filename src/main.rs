use gitmad::{cli, logger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    if let Err(e) = logger::init() {
        eprintln!("Failed to initialize logging: {e}");
    }

    cli::main().await
}
