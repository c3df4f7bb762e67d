use std::{future::Future, net::SocketAddr};

use anyhow::Context;
use tokio::{
    net::{TcpListener, TcpSocket},
    task::JoinSet,
};

use crate::{config::Config, connection, SharedLottery};

pub struct Server {
    listener: TcpListener,
}

impl Server {
    /// Opens the listening socket described by the configuration
    pub fn bind(config: &Config) -> anyhow::Result<Self> {
        let addr: SocketAddr = config
            .bind_address()
            .parse()
            .with_context(|| format!("\"{}\" is not a bindable address", config.bind_address()))?;

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;

        let listener = socket.listen(config.backlog)?;
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> tokio::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts agency connections until the shutdown future resolves
    ///
    /// every connection is served on its own task. once shutdown begins the
    /// listening socket is closed so no new connection gets in, and the
    /// in-flight sessions are left to finish on their own.
    pub async fn run(
        self,
        lottery: SharedLottery,
        shutdown: impl Future<Output = ()>,
    ) -> anyhow::Result<()> {
        tokio::pin!(shutdown);

        let mut sessions = JoinSet::new();
        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    let (conn, addr) = accepted?;
                    tracing::info!("accepted a connection from: {}", addr);

                    let lottery = lottery.clone();
                    sessions.spawn(async move {
                        if let Err(err) = connection::handle(conn, lottery).await {
                            tracing::warn!("session with {} failed: {}", addr, err);
                        }
                    });
                }
                // reap finished sessions as the server runs
                Some(_) = sessions.join_next(), if !sessions.is_empty() => {}
                _ = &mut shutdown => break,
            }
        }

        drop(self.listener);

        tracing::info!(
            "shutdown requested, waiting for {} open session(s)",
            sessions.len()
        );
        while sessions.join_next().await.is_some() {}
        tracing::info!("every session has finished, shutting down");

        Ok(())
    }
}
