//! Roomcast collaboration room server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin roomcast-server -- --port 8080 --max-users 4
//! ```

use clap::Parser;
use roomcast_server::ServerArgs;
use roomcast_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    let args = ServerArgs::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    // Run the server
    if let Err(e) = roomcast_server::run(args).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
