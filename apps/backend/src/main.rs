#[tokio::main]
async fn main() -> anyhow::Result<()> {
    engkids_backend::run().await
}
