//! Websocket push transport.
//!
//! Connects to `{base}/{process_instance_id}` and yields every text message.
//! Binary, ping and pong messages are skipped; a close message ends the
//! stream.

use super::transport::{FrameStream, PushTransport};
use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use tokio_stream::StreamExt;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;
use url::Url;

pub struct WebSocketTransport {
    base: Url,
}

impl WebSocketTransport {
    /// # Errors
    ///
    /// Returns an error if `base` is not a valid URL.
    pub fn new(base: &str) -> SyncResult<Self> {
        let base = Url::parse(base).map_err(|source| SyncError::InvalidUrl {
            url: base.to_string(),
            source,
        })?;
        Ok(Self { base })
    }

    /// Address of the channel for one process instance.
    pub fn channel_url(&self, process_instance_id: &str) -> SyncResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| SyncError::InvalidUrl {
                url: self.base.to_string(),
                source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
            })?
            .pop_if_empty()
            .push(process_instance_id);
        Ok(url)
    }
}

#[async_trait]
impl PushTransport for WebSocketTransport {
    async fn connect(&self, process_instance_id: &str) -> SyncResult<FrameStream> {
        let url = self.channel_url(process_instance_id)?;

        let (mut socket, _response) =
            connect_async(url.as_str())
                .await
                .map_err(|e| SyncError::Connect {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?;

        let frames = async_stream::stream! {
            while let Some(message) = socket.next().await {
                match message {
                    Ok(Message::Text(text)) => yield Ok(text),
                    Ok(Message::Close(frame)) => {
                        debug!(?frame, "push channel closed by peer");
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        yield Err(SyncError::Stream(e.to_string()));
                        break;
                    }
                }
            }
        };

        Ok(Box::pin(frames))
    }
}
