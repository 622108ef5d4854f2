use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use tandem_core::events::{ChatMessage, ClientEvent, LoginMsg, ServerEvent};
use tandem_core::protocol::{
    Frame, WireFormat, decode_server_event, encode_client_event,
};
use tandem_core::room::RoomId;

use tandem_server::build_app;
use tandem_server::config::{LimitsConfig, ServerConfig};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub const HOME_HTML: &str = "<html><body>home</body></html>";
pub const CHAT_HTML: &str = "<html><body>chat</body></html>";

pub struct TestServer {
    pub addr: SocketAddr,
    _web_root: tempfile::TempDir,
    _shutdown: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn new() -> Self {
        Self::from_limits(LimitsConfig::default()).await
    }

    /// Start a test server that accepts at most `max` live sockets.
    pub async fn with_max_connections(max: usize) -> Self {
        Self::from_limits(LimitsConfig {
            max_ws_connections: max,
            ..LimitsConfig::default()
        })
        .await
    }

    async fn from_limits(limits: LimitsConfig) -> Self {
        let web_root = tempfile::tempdir().unwrap();
        std::fs::write(web_root.path().join("home.html"), HOME_HTML).unwrap();
        std::fs::write(web_root.path().join("chat.html"), CHAT_HTML).unwrap();
        std::fs::write(web_root.path().join("app.js"), "console.log('tandem');").unwrap();

        let config = ServerConfig {
            listen_addr: "127.0.0.1:0".to_string(),
            web_root: web_root.path().to_string_lossy().into_owned(),
            limits,
            ..ServerConfig::default()
        };

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (app, _state) = build_app(config);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the server a moment to start accepting
        tokio::time::sleep(Duration::from_millis(20)).await;

        Self {
            addr,
            _web_root: web_root,
            _shutdown: handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/socket", self.addr)
    }
}

/// Connect a JSON-framed WebSocket client to the test server.
pub async fn ws_connect(server: &TestServer) -> WsStream {
    let (stream, _) = tokio_tungstenite::connect_async(server.ws_url())
        .await
        .unwrap();
    stream
}

/// Connect a client that speaks the given wire format.
pub async fn ws_connect_with_format(server: &TestServer, format: &str) -> WsStream {
    let url = format!("{}?format={format}", server.ws_url());
    let (stream, _) = tokio_tungstenite::connect_async(url).await.unwrap();
    stream
}

pub async fn ws_send_event(stream: &mut WsStream, event: &ClientEvent, format: WireFormat) {
    let message = match encode_client_event(event, format).unwrap() {
        Frame::Text(text) => Message::Text(text.into()),
        Frame::Binary(data) => Message::Binary(data.into()),
    };
    stream.send(message).await.unwrap();
}

pub async fn ws_send(stream: &mut WsStream, event: &ClientEvent) {
    ws_send_event(stream, event, WireFormat::Json).await;
}

pub async fn ws_load(stream: &mut WsStream, room: &str) {
    ws_send(stream, &ClientEvent::Load(RoomId::from(room))).await;
}

pub async fn ws_login(stream: &mut WsStream, room: &str, user: &str, sex: &str, lang: &str) {
    let login = LoginMsg {
        id: Some(RoomId::from(room)),
        user: Some(user.to_string()),
        sex: Some(sex.to_string()),
        lang: Some(lang.to_string()),
    };
    ws_send(stream, &ClientEvent::Login(login)).await;
}

pub async fn ws_msg(stream: &mut WsStream, text: &str, user: &str) {
    let msg = ChatMessage {
        msg: Some(text.to_string()),
        user: Some(user.to_string()),
        img: Some(format!("{user}.png")),
    };
    ws_send(stream, &ClientEvent::Msg(msg)).await;
}

/// Read the next data frame as a `Frame` (5s timeout).
pub async fn ws_read_frame(stream: &mut WsStream) -> Frame {
    let deadline = Duration::from_secs(5);
    tokio::time::timeout(deadline, async {
        loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => return Frame::Text(text.as_str().to_owned()),
                Some(Ok(Message::Binary(data))) => return Frame::Binary(data.to_vec()),
                Some(Ok(Message::Close(_))) => panic!("WebSocket closed unexpectedly"),
                Some(Err(e)) => panic!("WebSocket error: {e}"),
                None => panic!("WebSocket stream ended"),
                _ => continue,
            }
        }
    })
    .await
    .expect("Timed out waiting for WebSocket message")
}

/// Read the next JSON-framed ServerEvent (5s timeout).
pub async fn ws_read_event(stream: &mut WsStream) -> ServerEvent {
    let frame = ws_read_frame(stream).await;
    decode_server_event(&frame, WireFormat::Json).unwrap()
}

/// Try to read a JSON-framed ServerEvent, returning None on timeout.
pub async fn ws_try_read_event(stream: &mut WsStream, timeout_ms: u64) -> Option<ServerEvent> {
    let deadline = Duration::from_millis(timeout_ms);
    tokio::time::timeout(deadline, async {
        loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    let frame = Frame::Text(text.as_str().to_owned());
                    return decode_server_event(&frame, WireFormat::Json).unwrap();
                },
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => {
                    panic!("WebSocket error or closed")
                },
                _ => continue,
            }
        }
    })
    .await
    .ok()
}

/// Log in and consume the `sex`/`lang` echoes that always follow.
pub async fn ws_login_and_ack(stream: &mut WsStream, room: &str, user: &str, sex: &str, lang: &str) {
    ws_login(stream, room, user, sex, lang).await;
    assert_eq!(
        ws_read_event(stream).await,
        ServerEvent::Sex(Some(sex.to_string()))
    );
    assert_eq!(
        ws_read_event(stream).await,
        ServerEvent::Lang(Some(lang.to_string()))
    );
}

/// Put two fresh clients into `room` and drain both `startChat` events.
pub async fn ws_pair(server: &TestServer, room: &str) -> (WsStream, WsStream) {
    let mut first = ws_connect(server).await;
    ws_login_and_ack(&mut first, room, "ana", "f", "pt").await;

    let mut second = ws_connect(server).await;
    ws_login_and_ack(&mut second, room, "bo", "m", "en").await;

    for stream in [&mut first, &mut second] {
        match ws_read_event(stream).await {
            ServerEvent::StartChat(start) => assert_eq!(start.id, RoomId::from(room)),
            other => panic!("Expected startChat, got: {other:?}"),
        }
    }
    (first, second)
}
