//! WebSocket endpoint and server lifecycle.

use std::net::{SocketAddr, ToSocketAddrs};

use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::info;
use warp::filters::BoxedFilter;
use warp::{Filter, Reply};

use crate::connection::handle_connection;
use crate::coordinator::{Coordinator, CoordinatorConfig};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8765;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    host: String,
    port: u16,
    shuffle_seed: Option<u64>,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            shuffle_seed: None,
        }
    }

    /// Pin the deck's RNG for reproducible tournaments.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    pub fn for_tests() -> Self {
        Self::new("127.0.0.1", 0).with_seed(0)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("configuration error: {0}")]
    ConfigError(String),
}

/// The tournament server: one coordinator task plus a warp WebSocket
/// acceptor feeding it connections.
#[derive(Debug)]
pub struct PokerServer {
    config: ServerConfig,
}

impl PokerServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub async fn start(self) -> Result<ServerHandle, ServerError> {
        let bind_addr = Self::bind_addr(&self.config)?;

        let mut coordinator_config = CoordinatorConfig::default();
        if let Some(seed) = self.config.shuffle_seed {
            coordinator_config.shuffle_seed = seed;
        }
        let (commands, coordinator) = Coordinator::new(coordinator_config);
        let coordinator_task = tokio::spawn(coordinator.run());

        let routes = Self::routes(commands);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
        };

        let (addr, server_future) = warp::serve(routes)
            .try_bind_with_graceful_shutdown(bind_addr, shutdown_signal)
            .map_err(Self::map_warp_error)?;

        info!(%addr, "listening for bots on ws://{addr}");
        let server_task = tokio::spawn(server_future);

        Ok(ServerHandle {
            addr,
            shutdown: Some(shutdown_tx),
            server_task: Some(server_task),
            coordinator_task: Some(coordinator_task),
        })
    }

    fn routes(
        commands: tokio::sync::mpsc::Sender<crate::coordinator::Command>,
    ) -> BoxedFilter<(warp::reply::Response,)> {
        warp::path::end()
            .and(warp::ws())
            .map(move |ws: warp::ws::Ws| {
                let commands = commands.clone();
                ws.on_upgrade(move |socket| handle_connection(socket, commands))
                    .into_response()
            })
            .boxed()
    }

    fn bind_addr(config: &ServerConfig) -> Result<SocketAddr, ServerError> {
        let host = config.host();

        if let Ok(ip) = host.parse::<std::net::IpAddr>() {
            return Ok(SocketAddr::new(ip, config.port()));
        }

        let candidate = format!("{}:{}", host, config.port());
        let mut addrs = candidate.to_socket_addrs().map_err(|err| {
            ServerError::ConfigError(format!("failed to resolve address `{candidate}`: {err}"))
        })?;
        addrs.next().ok_or_else(|| {
            ServerError::ConfigError(format!("failed to resolve address `{candidate}`"))
        })
    }

    fn map_warp_error(err: warp::Error) -> ServerError {
        use std::error::Error as StdError;

        if let Some(source) = err.source() {
            if let Some(io_err) = source.downcast_ref::<std::io::Error>() {
                let recreated = std::io::Error::new(io_err.kind(), io_err.to_string());
                return ServerError::BindError(recreated);
            }
        }
        ServerError::ConfigError(err.to_string())
    }
}

#[derive(Debug)]
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    server_task: Option<JoinHandle<()>>,
    coordinator_task: Option<JoinHandle<()>>,
}

impl ServerHandle {
    pub fn address(&self) -> SocketAddr {
        self.addr
    }

    pub async fn shutdown(mut self) -> Result<(), ServerError> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.server_task.take() {
            task.await
                .map_err(|err| ServerError::ConfigError(format!("server task join error: {err}")))?;
        }
        if let Some(task) = self.coordinator_task.take() {
            task.abort();
        }
        Ok(())
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.server_task.take() {
            task.abort();
        }
        if let Some(task) = self.coordinator_task.take() {
            task.abort();
        }
    }
}
