//! User Service - Entry Point

use core_config::tracing::install_color_eyre;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Before any fallible operation, so early errors are rendered too
    install_color_eyre();

    user_service::run().await
}
