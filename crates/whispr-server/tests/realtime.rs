use std::time::Duration;

use futures_util::StreamExt;
use serde_json::Value;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use whispr_api::AppStateInner;
use whispr_gateway::Dispatcher;
use whispr_store::persist::MemorySnapshotStore;
use whispr_store::{Whispr, WhisprBuilder};
use whispr_types::api::{CreateConfessionRequest, SendCrushRequest};

async fn serve() -> (String, Whispr) {
    let dispatcher = Dispatcher::new();
    let whispr = WhisprBuilder::new(MemorySnapshotStore::new())
        .notifier(dispatcher.clone())
        .open()
        .await
        .unwrap();
    let app = whispr_api::router(AppStateInner::new(whispr.clone(), dispatcher));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("ws://{addr}/api/ws"), whispr)
}

async fn next_event<S>(stream: &mut S) -> Value
where
    S: StreamExt<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .expect("timed out waiting for event")
            .expect("socket closed")
            .unwrap();
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

#[tokio::test]
async fn observers_are_greeted_then_receive_mutations() {
    let (url, whispr) = serve().await;
    let (mut socket, _) = connect_async(url.as_str()).await.unwrap();

    let hello = next_event(&mut socket).await;
    assert_eq!(hello["type"], "hello");
    assert!(hello["timestamp"].is_string());

    let created = whispr
        .create_confession(CreateConfessionRequest {
            content: "live from the quad".into(),
            author_id: "u1".into(),
            category: "wholesome".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    let event = next_event(&mut socket).await;
    assert_eq!(event["type"], "confession:new");
    assert_eq!(event["payload"]["id"], created.id.to_string());
}

#[tokio::test]
async fn crush_events_hide_the_sender() {
    let (url, whispr) = serve().await;
    let (mut socket, _) = connect_async(url.as_str()).await.unwrap();
    next_event(&mut socket).await;

    whispr
        .send_crush(SendCrushRequest {
            from_user_id: "secret-admirer".into(),
            to_alias: "Onyx Glow".into(),
            message: "nice jacket".into(),
        })
        .await
        .unwrap();

    let event = next_event(&mut socket).await;
    assert_eq!(event["type"], "crush:new");
    let raw = event.to_string();
    assert!(!raw.contains("secret-admirer"));
    assert!(!raw.contains("nice jacket"));
}
