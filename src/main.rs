#[tokio::main]
async fn main() -> anyhow::Result<()> {
    nailedit::run().await
}
