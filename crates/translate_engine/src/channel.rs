use std::time::Duration;

use client_logging::{client_debug, client_info, client_trace};
use url::Url;

use crate::api::ProgressSink;
use crate::push::decode_push;
use crate::socketio::{
    decode_payload, ChannelError, EnginePacket, OpenInfo, SocketPacket, CONNECT_PACKET,
    PONG_PACKET,
};
use crate::EngineEvent;

const ENGINE_IO_VERSION: &str = "4";

#[derive(Debug, Clone)]
pub struct ChannelSettings {
    pub base_url: Url,
    /// Mount point of the Socket.IO server, without slashes.
    pub path: String,
    pub connect_timeout: Duration,
}

impl ChannelSettings {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            path: "socket.io".to_string(),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Socket.IO client over the Engine.IO long-polling transport.
///
/// Receives `progress` and `file_progress` pushes; emits nothing beyond the
/// handshake, namespace connect and pong replies.
#[derive(Debug, Clone)]
pub struct PollingChannel {
    settings: ChannelSettings,
    client: reqwest::Client,
}

impl PollingChannel {
    pub fn new(settings: ChannelSettings) -> Result<Self, ChannelError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| ChannelError::Http(err.to_string()))?;
        Ok(Self { settings, client })
    }

    /// Runs the session until the server closes it. Events go to `sink` in arrival order.
    pub async fn run(&self, sink: &dyn ProgressSink) -> Result<(), ChannelError> {
        let open = self.handshake().await?;
        client_info!(
            "socket.io session {} opened (ping interval {} ms)",
            open.sid,
            open.ping_interval
        );
        self.post_packet(&open.sid, CONNECT_PACKET).await?;

        // The server holds a poll for up to one ping interval before answering.
        let poll_timeout = Duration::from_millis(open.ping_interval + open.ping_timeout);
        loop {
            let body = self.poll(Some(&open.sid), Some(poll_timeout)).await?;
            for packet in decode_payload(&body)? {
                match packet {
                    EnginePacket::Ping => self.post_packet(&open.sid, PONG_PACKET).await?,
                    EnginePacket::Close => {
                        client_info!("socket.io session {} closed by server", open.sid);
                        return Ok(());
                    }
                    EnginePacket::Message(SocketPacket::Event { name, args }) => {
                        match decode_push(&name, &args) {
                            Some(event) => sink.emit(EngineEvent::Push(event)),
                            None => client_debug!("ignoring socket.io event {}", name),
                        }
                    }
                    EnginePacket::Message(SocketPacket::Connect(_)) => {
                        client_debug!("socket.io namespace connected");
                    }
                    EnginePacket::Message(SocketPacket::Disconnect) => {
                        client_info!("socket.io namespace disconnected by server");
                        return Ok(());
                    }
                    EnginePacket::Message(SocketPacket::ConnectError(data)) => {
                        return Err(ChannelError::ConnectRefused(
                            data.map(|value| value.to_string()).unwrap_or_default(),
                        ));
                    }
                    EnginePacket::Open(_) => {
                        return Err(ChannelError::Protocol(
                            "open packet inside an established session".to_string(),
                        ));
                    }
                    other => client_trace!("skipping packet {:?}", other),
                }
            }
        }
    }

    async fn handshake(&self) -> Result<OpenInfo, ChannelError> {
        let body = self.poll(None, None).await?;
        match decode_payload(&body)?.into_iter().next() {
            Some(EnginePacket::Open(open)) => Ok(open),
            Some(other) => Err(ChannelError::Protocol(format!(
                "expected open packet, got {other:?}"
            ))),
            None => Err(ChannelError::Protocol("empty handshake".to_string())),
        }
    }

    fn polling_url(&self, sid: Option<&str>) -> Result<Url, ChannelError> {
        let mut url = self.settings.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ChannelError::Http(format!("{} cannot be a base url", self.settings.base_url)))?
            .pop_if_empty()
            .push(&self.settings.path)
            .push("");
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("EIO", ENGINE_IO_VERSION)
                .append_pair("transport", "polling");
            if let Some(sid) = sid {
                query.append_pair("sid", sid);
            }
        }
        Ok(url)
    }

    async fn poll(&self, sid: Option<&str>, timeout: Option<Duration>) -> Result<String, ChannelError> {
        let url = self.polling_url(sid)?;
        let mut request = self.client.get(url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let response = request
            .send()
            .await
            .map_err(|err| ChannelError::Http(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ChannelError::Http(format!("poll returned {status}")));
        }
        let body = response
            .text()
            .await
            .map_err(|err| ChannelError::Http(err.to_string()))?;
        client_trace!("poll payload: {:?}", body);
        Ok(body)
    }

    async fn post_packet(&self, sid: &str, packet: &str) -> Result<(), ChannelError> {
        let url = self.polling_url(Some(sid))?;
        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "text/plain;charset=UTF-8")
            .body(packet.to_string())
            .send()
            .await
            .map_err(|err| ChannelError::Http(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ChannelError::Http(format!("post returned {status}")));
        }
        Ok(())
    }
}
