//! End-to-end: snapshot seed over HTTP, live updates over a websocket,
//! alerts out through a sink.

use std::time::Duration;

use anyhow::Result;
use arbwatch_core::{AlertIntent, AlertSink, AlertTier, ConnectionState};
use arbwatch_feed::{ConnectionConfig, ConnectionManager, HttpSnapshotClient, ReconnectPolicy};
use arbwatch_session::{CountdownTicker, Session};
use async_trait::async_trait;
use futures_util::SinkExt;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn opportunity(id: &str, profit_percent: f64) -> serde_json::Value {
    let created_at = chrono::Utc::now();
    let expires_at = created_at + chrono::Duration::minutes(5);
    serde_json::json!({
        "id": id,
        "event_id": format!("evt-{id}"),
        "sport": "basketball_nba",
        "home_team": "Lakers",
        "away_team": "Celtics",
        "bookmaker_home": "draftkings",
        "bookmaker_away": "fanduel",
        "home_odds": 1.91,
        "away_odds": 2.20,
        "profit_percent": profit_percent,
        "home_stake": 535.28,
        "away_stake": 464.72,
        "total_stake": 1000,
        "expected_return": 1022.38,
        "created_at": created_at.to_rfc3339(),
        "expires_at": expires_at.to_rfc3339(),
        "status": "active"
    })
}

fn frame(data: serde_json::Value) -> String {
    serde_json::json!({
        "type": "arbitrage",
        "data": data,
        "timestamp": chrono::Utc::now().to_rfc3339()
    })
    .to_string()
}

struct ChannelSink(mpsc::UnboundedSender<AlertIntent>);

#[async_trait]
impl AlertSink for ChannelSink {
    async fn deliver(&self, intent: &AlertIntent) -> Result<()> {
        self.0.send(intent.clone())?;
        Ok(())
    }
}

#[tokio::test]
async fn test_seeded_board_alerts_only_for_new_live_opportunities() {
    // Snapshot endpoint with one known opportunity.
    let http = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/arbitrage"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([opportunity("arb-1", 1.5)])),
        )
        .mount(&http)
        .await;

    // Feed: update to the known id, garbage, then a new high-profit id.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let ws_addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        ws.send(Message::Text(frame(opportunity("arb-1", 1.6))))
            .await
            .unwrap();
        ws.send(Message::Text("not json".to_string())).await.unwrap();
        ws.send(Message::Text(frame(opportunity("arb-2", 2.8))))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    let mut session = Session::from_config(&arbwatch_core::AppConfig::default());
    let snapshot = HttpSnapshotClient::with_timeout(http.uri(), Duration::from_secs(5)).unwrap();
    assert_eq!(session.seed(&snapshot).await, 1);

    let (manager, events) = ConnectionManager::spawn(ConnectionConfig {
        url: format!("ws://{ws_addr}"),
        policy: ReconnectPolicy::default(),
        ping_interval: Duration::from_secs(30),
        channel_buffer_size: 64,
    });
    manager.open().await.unwrap();

    let (alert_tx, mut alert_rx) = mpsc::unbounded_channel();
    let sink = ChannelSink(alert_tx);

    // Stop the feed once the first alert is out.
    let stopper = manager.clone();
    let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        if let Some(intent) = alert_rx.recv().await {
            let _ = seen_tx.send(intent);
        }
        stopper.shutdown().await;
    });

    let ticker = CountdownTicker::with_period(Duration::from_millis(50));
    tokio::time::timeout(
        Duration::from_secs(10),
        session.run(events, &sink, &ticker, |_, _| {}),
    )
    .await
    .expect("session did not end after feed shutdown");

    let alert = seen_rx.recv().await.expect("no alert delivered");
    assert_eq!(alert.opportunity_id, "arb-2");
    assert_eq!(alert.tier, AlertTier::HighProfit);
    assert_eq!(alert.message, "HIGH PROFIT: 2.80% - Lakers vs Celtics");
    assert!(alert.audible);

    let ids: Vec<_> = session.snapshot().iter().map(|o| o.id.clone()).collect();
    assert_eq!(ids, vec!["arb-2", "arb-1"]);
    assert_eq!(
        session.store().get("arb-1").unwrap().profit_percent.to_string(),
        "1.6"
    );
    assert_eq!(session.connection_state(), ConnectionState::Disconnected);
}
