#[tokio::main]
async fn main() -> anyhow::Result<()> {
    whoiswrong::cli::run().await
}
