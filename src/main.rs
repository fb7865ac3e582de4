use anyhow::Result;
use mentor::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
