use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Semaphore, oneshot};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{Instrument, info, warn};
use url::Url;

use crate::config::ServerConfig;
use crate::http::connection::{Connection, Outcome};

/// Accepts connections and serves each one on its own task.
pub struct Server {
    listener: TcpListener,
    limit: Option<Arc<Semaphore>>,
}

impl Server {
    pub async fn bind(cfg: &ServerConfig) -> anyhow::Result<Self> {
        let addr = cfg.listen_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        info!("Listening on {}", listener.local_addr()?);

        Ok(Self {
            listener,
            limit: cfg.max_connections.map(|n| Arc::new(Semaphore::new(n))),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// URL a browser on this host can open.
    pub fn url(&self) -> anyhow::Result<Url> {
        reachable_url(self.local_addr()?)
    }

    /// Runs the accept loop until `shutdown` resolves.
    ///
    /// The listening socket is closed first, then in-flight connections
    /// are allowed to finish.
    pub async fn serve(self, shutdown: impl Future<Output = ()>) -> anyhow::Result<()> {
        let Server { listener, limit } = self;
        let mut tasks = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            let permit = match &limit {
                Some(sem) => tokio::select! {
                    permit = sem.clone().acquire_owned() => Some(permit?),
                    _ = &mut shutdown => break,
                },
                None => None,
            };

            tokio::select! {
                _ = &mut shutdown => break,

                accepted = listener.accept() => {
                    let (socket, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            warn!(error = %e, "Failed to accept connection");
                            continue;
                        }
                    };
                    info!("Accepted connection from {}", peer);

                    let span = tracing::info_span!("conn", %peer);
                    tasks.spawn(
                        async move {
                            // Held until the connection is done.
                            let _permit = permit;
                            handle(socket, peer).await;
                        }
                        .instrument(span),
                    );
                }

                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    log_join(joined);
                }
            }
        }

        drop(listener);
        info!(in_flight = tasks.len(), "Listener closed, draining connections");

        while let Some(joined) = tasks.join_next().await {
            log_join(joined);
        }

        info!("Server stopped");
        Ok(())
    }

    /// Runs the server on a background task.
    pub fn start(self) -> anyhow::Result<ServerHandle> {
        let local_addr = self.local_addr()?;
        let (tx, rx) = oneshot::channel::<()>();

        let task = tokio::spawn(self.serve(async move {
            // A dropped sender also stops the server.
            let _ = rx.await;
        }));

        Ok(ServerHandle {
            local_addr,
            shutdown: tx,
            task,
        })
    }
}

/// Control side of a server started with [`Server::start`].
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<anyhow::Result<()>>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn url(&self) -> anyhow::Result<Url> {
        reachable_url(self.local_addr)
    }

    /// Stops accepting and waits for in-flight connections to finish.
    pub async fn stop(self) -> anyhow::Result<()> {
        // Err only if the loop already exited
        let _ = self.shutdown.send(());
        self.task.await.context("Server task panicked")?
    }

    /// Like [`ServerHandle::stop`], but gives up on draining once `force`
    /// resolves. Connections still open at that point are dropped.
    pub async fn stop_or_abort(self, force: impl Future<Output = ()>) -> anyhow::Result<Stopped> {
        let ServerHandle { shutdown, mut task, .. } = self;
        let _ = shutdown.send(());

        tokio::select! {
            joined = &mut task => {
                joined.context("Server task panicked")??;
                Ok(Stopped::Drained)
            }
            _ = force => {
                task.abort();
                // Dropping the loop aborts every connection task it spawned.
                let _ = task.await;
                warn!("Drain interrupted, open connections dropped");
                Ok(Stopped::Aborted)
            }
        }
    }
}

/// How [`ServerHandle::stop_or_abort`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stopped {
    /// Every in-flight connection finished.
    Drained,
    /// The drain was cut short.
    Aborted,
}

async fn handle(socket: TcpStream, peer: SocketAddr) {
    match Connection::new(socket).run().await {
        Ok(Outcome::Responded(status)) => {
            info!(status = status.as_u16(), "Response sent to {}", peer);
        }
        Ok(Outcome::PeerClosed) => {}
        Err(e) => {
            warn!("Connection from {} dropped: {}", peer, e);
        }
    }
}

fn log_join(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        tracing::error!(error = %e, "Connection task failed");
    }
}

/// Unspecified bind addresses are announced as `localhost`.
pub fn reachable_url(addr: SocketAddr) -> anyhow::Result<Url> {
    let host = if addr.ip().is_unspecified() {
        "localhost".to_string()
    } else {
        match addr {
            SocketAddr::V4(v4) => v4.ip().to_string(),
            SocketAddr::V6(v6) => format!("[{}]", v6.ip()),
        }
    };

    Url::parse(&format!("http://{}:{}/", host, addr.port()))
        .with_context(|| format!("Cannot build URL for {}", addr))
}
