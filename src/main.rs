#[tokio::main]
async fn main() -> anyhow::Result<()> {
    quizmark_rust::run().await
}
