//! Notification Service - Entry Point

use core_config::tracing::install_color_eyre;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    notification_service::run().await
}
