use std::net::SocketAddr;
use std::sync::Arc;

use crate::clients::GhostClient;
use crate::infra::config::{Config, Transport};
use crate::tools::registry;

/// Owns the shared Admin API client for the lifetime of the serving loop.
/// Dropping it releases the transport; that happens exactly once, on every
/// exit path out of [`run`].
pub struct ClientScope {
    client: Arc<GhostClient>,
}

impl ClientScope {
    pub fn open(client: GhostClient) -> Self {
        tracing::debug!(base = client.base_url(), "ghost api client ready");
        Self {
            client: Arc::new(client),
        }
    }

    pub fn client(&self) -> Arc<GhostClient> {
        self.client.clone()
    }
}

impl Drop for ClientScope {
    fn drop(&mut self) {
        tracing::info!(
            refs = Arc::strong_count(&self.client),
            "releasing ghost api client"
        );
    }
}

pub async fn run(cfg: Config, transport: Transport, port: u16) -> anyhow::Result<()> {
    let groups: Vec<&str> = cfg.selection.groups().iter().map(|g| g.name()).collect();
    tracing::info!(
        url = %cfg.url,
        key_id = cfg.admin_key.id(),
        groups = %groups.join(","),
        read_only = cfg.selection.read_only,
        transport = ?transport,
        "BOOT ghost-mcp"
    );

    let scope = ClientScope::open(GhostClient::new(&cfg.url, cfg.admin_key.clone())?);
    let factory = registry::factory(scope.client(), cfg.selection.clone());

    match transport {
        Transport::Stdio => {
            tokio::select! {
                res = crate::infra::runtime::mcp_transport::serve_stdio(factory) => {
                    res.map_err(|e| anyhow::anyhow!(e))?;
                }
                _ = shutdown_signal() => {
                    tracing::info!("shutdown requested");
                }
            }
        }
        Transport::Http => {
            let app = crate::infra::http_app::build_app(factory);
            let addr: SocketAddr = ([0, 0, 0, 0], port).into();
            tracing::info!(%addr, "listening");
            axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::AdminKey;

    #[test]
    fn scope_hands_out_the_same_client() {
        let key = AdminKey::parse("abc123:00ff00ff").unwrap();
        let scope = ClientScope::open(GhostClient::new("http://localhost", key).unwrap());
        let a = scope.client();
        let b = scope.client();
        assert!(Arc::ptr_eq(&a, &b));
        drop(scope);
        assert_eq!(Arc::strong_count(&a), 2);
    }
}
