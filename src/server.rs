//! Gateway Server
//!
//! Binds the HTTP adapter to a TCP listener and serves it. The surrounding
//! deployment decides ports and process lifecycle; this just owns the
//! listen-and-serve loop.

use {
    crate::{gateway::Gateway, http::HttpGateway, logging},
    anyhow::{Context, Result},
    tokio_stream::wrappers::TcpListenerStream,
};

pub struct GatewayServer<C> {
    gateway: Gateway<C>,
}

impl<C: Send + Sync + 'static> GatewayServer<C> {
    pub fn new(gateway: Gateway<C>) -> Self {
        Self { gateway }
    }

    /// Start serving on `127.0.0.1:port`. Runs until the process exits.
    pub async fn start(&self, port: u16) -> Result<()> {
        logging::log_server_startup(port);

        let routes = HttpGateway::new(self.gateway.clone()).routes();

        let addr = format!("127.0.0.1:{port}")
            .parse::<std::net::SocketAddr>()
            .context("Invalid address")?;

        // Bind first so a taken port fails loudly instead of inside warp
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| anyhow::anyhow!("Could not bind to {}: {}", addr, e))?;

        logging::log_server_ready(&addr.to_string());
        println!("🌐 Gateway '{}' listening on http://{addr}", self.gateway.name());
        println!("📡 Available endpoints:");
        println!("  POST /invoke (tool invocation)");
        println!("  GET  /tools (tool listing)");
        println!("  POST /templates/resolve (widget templates)");
        println!("  GET  /health");

        warp::serve(routes)
            .run_incoming(TcpListenerStream::new(listener))
            .await;

        Ok(())
    }
}
