//! Loopback stream tests: a local WebSocket server plays the venue.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;

use csgf_core::policy::RetryConfig;
use csgf_core::{
    Amount, ChatMessage, ClientState, EventObserver, RoundId, RoundUpdate, Session, TransferNotice,
    UserId,
};
use csgf_ws::{Dispatcher, StreamClient, StreamConfig, StreamError};

const OWN: UserId = UserId(555);

// ─── Helpers ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Recorder(Mutex<Vec<String>>);

#[async_trait]
impl EventObserver for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    async fn on_round_update(&self, update: &RoundUpdate, _state: &ClientState) {
        self.0
            .lock()
            .await
            .push(format!("{:?}:{}", update.reason, update.round.id));
    }

    async fn on_chat_message(&self, message: &ChatMessage) {
        self.0
            .lock()
            .await
            .push(format!("chat:{}:{}", message.user, message.text));
    }

    async fn on_transfer(&self, notice: &TransferNotice) {
        self.0
            .lock()
            .await
            .push(format!("transfer:{}:{}", notice.from_display_name, notice.amount));
    }
}

/// What the server saw on one connection.
struct Seen {
    cookie: Option<String>,
    connect: Value,
    subscribes: Vec<Value>,
}

fn publication(channel: &str, data: Value) -> String {
    serde_json::json!({"result": {"channel": channel, "data": {"data": data}}}).to_string()
}

async fn next_text<S>(ws: &mut S) -> String
where
    S: futures::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        match ws.next().await.expect("client hung up").expect("read") {
            Message::Text(text) => return text.to_string(),
            _ => continue,
        }
    }
}

/// Accept one connection, do the venue side of the handshake, send `frames`
/// and close.
async fn serve_once(listener: &TcpListener, frames: Vec<String>) -> Seen {
    let (tcp, _) = listener.accept().await.unwrap();
    let mut cookie = None;
    let mut ws = tokio_tungstenite::accept_hdr_async(tcp, |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
        cookie = req
            .headers()
            .get("cookie")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Ok(resp)
    })
    .await
    .unwrap();

    let connect: Value = serde_json::from_str(&next_text(&mut ws).await).unwrap();
    ws.send(Message::Text(r#"{"id":1,"result":{"client":"c1"}}"#.to_string().into()))
        .await
        .unwrap();

    let batch = next_text(&mut ws).await;
    let subscribes = batch
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();

    for frame in frames {
        ws.send(Message::Text(frame.into())).await.unwrap();
    }
    ws.close(None).await.unwrap();

    Seen {
        cookie,
        connect,
        subscribes,
    }
}

fn session() -> Session {
    Session {
        token: "secret-token".into(),
        user_id: OWN,
        balance: Amount::from_units(10),
    }
}

fn client_for(addr: std::net::SocketAddr, max_retries: u32, recorder: Arc<Recorder>) -> StreamClient {
    let mut config = StreamConfig::new(format!("ws://{addr}/connection/websocket"));
    config.cookie = Some("session=abc".into());
    config.retry = RetryConfig {
        max_retries,
        initial_backoff: Duration::from_millis(20),
        max_backoff: Duration::from_millis(50),
        multiplier: 2.0,
    };
    let session = session();
    let state = Arc::new(ClientState::new(&session));
    let mut dispatcher = Dispatcher::new();
    dispatcher.register(recorder);
    StreamClient::new(config, &session, state, dispatcher)
}

// ─── Handshake + dispatch ─────────────────────────────────────────────────────

#[tokio::test]
async fn handshake_then_dispatch() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let events = vec![
        // Acks and two publications in one frame.
        [
            r#"{"id":2,"result":{}}"#.to_string(),
            r#"{"id":3,"result":{}}"#.to_string(),
            publication("new_game", serde_json::json!({"room": 1, "blade": "<div id=\"game_70\"></div>"})),
            publication(
                "new_bet",
                serde_json::json!({"game": 70, "bank": 5, "blade": "<a href=\"/user/9\">x</a><span class=\"sum\">5</span>"}),
            ),
        ]
        .join("\n"),
        publication(
            "new_bet",
            serde_json::json!({"game": 70, "bank": 7, "blade": "<a href=\"/user/555\">me</a><span class=\"sum\">2</span>"}),
        ),
        publication("new_game", serde_json::json!({"room": 42, "blade": "game_71"})),
        publication(
            "chat_new",
            serde_json::json!({"blade": "<div data-user=\"42\" data-text=\"Alice\"><span class=\"text2\">7</span></div>"}),
        ),
        publication(
            "notify#555",
            serde_json::json!({"message": {"text": "Переведено 100.00<br>от Bob"}}),
        ),
        publication("balance#555", serde_json::json!({"balance": "110.00"})),
        publication("end_game", serde_json::json!({"game": 70})),
    ];
    let server = tokio::spawn(async move { serve_once(&listener, events).await });

    let recorder = Arc::new(Recorder::default());
    let client = client_for(addr, 0, recorder.clone());
    let err = client.run().await;
    assert!(matches!(err, StreamError::Closed), "{err}");

    let seen = server.await.unwrap();
    assert_eq!(seen.cookie.as_deref(), Some("session=abc"));
    assert_eq!(seen.connect["params"]["token"], "secret-token");
    assert_eq!(seen.connect["id"], 1);

    let channels: Vec<_> = seen
        .subscribes
        .iter()
        .map(|s| s["params"]["channel"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        channels,
        [
            "test", "new_bet", "new_game", "time_game", "end_game", "stats", "balance#555",
            "chat_new", "notify#555"
        ]
    );
    let ids: Vec<_> = seen.subscribes.iter().map(|s| s["id"].as_u64().unwrap()).collect();
    assert_eq!(ids, (2..=10).collect::<Vec<_>>());
    assert!(seen.subscribes.iter().all(|s| s["method"] == 1));

    // Own stake and the unknown room are not reported.
    assert_eq!(
        *recorder.0.lock().await,
        [
            "New:70",
            "Stake:70",
            "chat:42:7",
            "transfer:Bob:100.00",
            "End:70"
        ]
    );
    assert_eq!(client.state().balance().await, Amount::from_units(110));
    assert!(client.state().registry().await.get(RoundId(70)).is_none());
}

// ─── Reconnect ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn reconnect_clears_registry() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let first = serve_once(
            &listener,
            vec![publication("new_game", serde_json::json!({"room": 2, "blade": "game_81"}))],
        )
        .await;
        let second = serve_once(&listener, vec![]).await;
        // Listener dropped here: further attempts are refused.
        (first, second)
    });

    let recorder = Arc::new(Recorder::default());
    let client = client_for(addr, 1, recorder.clone());
    let err = client.run().await;
    assert!(matches!(err, StreamError::Connect(_)), "{err}");

    let (first, second) = server.await.unwrap();
    assert_eq!(first.subscribes.len(), 9);
    assert_eq!(second.subscribes.len(), 9);
    // Ids restart on every connection.
    assert_eq!(second.connect["id"], 1);
    assert_eq!(second.subscribes[0]["id"], 2);

    assert_eq!(*recorder.0.lock().await, ["New:81"]);
    assert!(client.state().registry().await.is_empty());
}
