#[tokio::main]
async fn main() {
    if let Err(error) = ml_service::app::run().await {
        tracing::error!(%error, "ml-service terminated");
        std::process::exit(1);
    }
}
