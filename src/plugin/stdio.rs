//! JSON-lines transport.
//!
//! One request per line in, one response per line out:
//!
//! ```text
//! {"id":1,"method":"createContainer","pod":{...},"container":{...}}
//! {"id":1,"adjust":{"hooks":{...}},"update":null,"error":null}
//! ```
//!
//! A line that cannot be handled, including one that is not valid UTF-8,
//! gets an error response and the loop moves on. End of input ends the loop.

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::PluginError;
use crate::plugin::{Container, ContainerAdjustment, ContainerPlugin, ContainerUpdate, PodSandbox};

const CREATE_CONTAINER: &str = "createContainer";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Request {
    #[serde(default)]
    id: u64,
    method: String,
    #[serde(default)]
    pod: PodSandbox,
    #[serde(default)]
    container: Container,
}

#[derive(Debug, Serialize)]
struct Response {
    id: u64,
    adjust: Option<ContainerAdjustment>,
    update: Option<Vec<ContainerUpdate>>,
    error: Option<String>,
}

impl Response {
    fn failed(id: u64, error: &PluginError) -> Self {
        Self {
            id,
            adjust: None,
            update: None,
            error: Some(error.to_string()),
        }
    }
}

/// Serve `plugin` until `reader` hits end of input.
///
/// Only transport failures end the loop early; per-request failures are
/// reported on the wire.
pub async fn serve<P, R, W>(plugin: &P, mut reader: R, mut writer: W) -> Result<(), PluginError>
where
    P: ContainerPlugin + ?Sized,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    tracing::info!(plugin = plugin.name(), "Serving plugin requests");

    let mut buf = Vec::new();
    let mut handled = 0usize;
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let line = buf.trim_ascii();
        if line.is_empty() {
            continue;
        }

        let response = handle_line(plugin, line).await;
        let mut encoded = serde_json::to_vec(&response)?;
        encoded.push(b'\n');
        writer.write_all(&encoded).await?;
        writer.flush().await?;
        handled += 1;
    }

    tracing::info!(requests = handled, "Input closed, stopping");
    Ok(())
}

async fn handle_line<P>(plugin: &P, line: &[u8]) -> Response
where
    P: ContainerPlugin + ?Sized,
{
    let request: Request = match serde_json::from_slice(line) {
        Ok(request) => request,
        Err(e) => {
            let error = PluginError::Protocol(e.to_string());
            tracing::warn!(error = %error, "Rejecting request");
            return Response::failed(0, &error);
        }
    };

    if request.method != CREATE_CONTAINER {
        let error = PluginError::UnsupportedMethod(request.method);
        tracing::warn!(id = request.id, error = %error, "Rejecting request");
        return Response::failed(request.id, &error);
    }

    match plugin
        .create_container(&request.pod, &request.container)
        .await
    {
        Ok((adjust, update)) => Response {
            id: request.id,
            adjust,
            update,
            error: None,
        },
        Err(error) => {
            tracing::error!(
                id = request.id,
                container = %request.container.name,
                error = %error,
                "CreateContainer failed"
            );
            Response::failed(request.id, &error)
        }
    }
}
