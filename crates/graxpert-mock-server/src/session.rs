//! A single watched client session: send one processing request, then report
//! every reply until the server closes the connection or the caller stops.
//!
//! With `spawn` set the mock is started in-process first and shut down again
//! once the session ends, so no separately running server is needed.

use std::future::Future;

use tokio::sync::oneshot;

use crate::client::{MockClient, Reply};
use crate::config::ServerConfig;
use crate::transport::WebSocketServer;
use crate::types::ServerResult;

#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Server to connect to. Ignored when `spawn` is set.
    pub url: String,
    pub filename: String,
    /// Start a server with this config for the duration of the session.
    pub spawn: Option<ServerConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    /// URL the session actually connected to.
    pub url: String,
    pub replies: Vec<Reply>,
}

/// Run one session. `on_reply` sees each reply as it arrives; `stop` ends the
/// session early and closes the connection from our side.
pub async fn run<F, R>(
    options: SessionOptions,
    stop: F,
    on_reply: R,
) -> ServerResult<SessionOutcome>
where
    F: Future<Output = ()>,
    R: FnMut(&Reply),
{
    let Some(config) = options.spawn else {
        return watch(options.url, &options.filename, stop, on_reply).await;
    };

    let server = WebSocketServer::bind(&config).await?;
    let url = format!("ws://{}", server.local_addr()?);
    tracing::info!("Started mock server at {url}");

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let running = tokio::spawn(server.run_until(async {
        let _ = shutdown_rx.await;
    }));

    let outcome = watch(url, &options.filename, stop, on_reply).await;

    let _ = shutdown_tx.send(());
    match running.await {
        Ok(Ok(())) => tracing::info!("Mock server stopped"),
        Ok(Err(e)) => tracing::error!("Mock server failed: {e}"),
        Err(e) => tracing::error!("Mock server task panicked: {e}"),
    }

    outcome
}

async fn watch<F, R>(
    url: String,
    filename: &str,
    stop: F,
    mut on_reply: R,
) -> ServerResult<SessionOutcome>
where
    F: Future<Output = ()>,
    R: FnMut(&Reply),
{
    let mut client = MockClient::connect(&url).await?;
    tracing::info!("Connected to {}", client.url());

    client.request_processing(filename).await?;
    tracing::info!("Sent PROCESS_IMAGE_REQUEST for {filename}");

    tokio::pin!(stop);
    let mut replies = Vec::new();

    loop {
        let next = tokio::select! {
            biased;
            _ = &mut stop => None,
            reply = client.next_reply() => Some(reply?),
        };

        let Some(reply) = next else {
            tracing::info!("Stopped, closing connection");
            client.close().await?;
            break;
        };

        on_reply(&reply);
        let closed = matches!(reply, Reply::Closed { .. });
        replies.push(reply);
        if closed {
            break;
        }
    }

    Ok(SessionOutcome { url, replies })
}
