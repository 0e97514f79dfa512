#[tokio::main]
async fn main() {
    if let Err(error) = document_service::app::run().await {
        tracing::error!(%error, "document-service terminated");
        std::process::exit(1);
    }
}
