use std::sync::Arc;

use socketioxide::SocketIo;

use comanda_server::realtime::SocketIoBroadcaster;
use comanda_server::{Config, Server, ServerState, init_logger_with_file};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    init_logger_with_file(None, config.log_dir.as_deref());

    tracing::info!(environment = %config.environment, "comanda-server starting...");

    // Socket.IO layer first: the broadcaster it yields is wired into
    // the service graph, the layer itself is mounted by the server.
    let (socket_layer, io) = SocketIo::new_layer();
    SocketIoBroadcaster::attach_handlers(&io);
    let broadcaster = Arc::new(SocketIoBroadcaster::new(io));

    let state = ServerState::initialize(&config, broadcaster).await?;
    let server = Server::new(config, state, Some(socket_layer));

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {e}");
        return Err(e.into());
    }

    Ok(())
}
