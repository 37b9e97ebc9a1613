use std::time::Duration;

use scoreboard_back::{
    channel::{ConnectionState, SyncChannel, TungsteniteConnector},
    config::AppConfig,
    dto::wire::WireUpdate,
    routes,
    state::{AppState, SharedState},
};
use tokio::{net::TcpListener, sync::mpsc, time::timeout};

const WAIT: Duration = Duration::from_secs(5);

async fn serve() -> (SharedState, String) {
    let state = AppState::new(AppConfig::default());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = routes::router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (state, format!("ws://{addr}/ws"))
}

async fn peer(endpoint: &str) -> (SyncChannel, mpsc::UnboundedReceiver<WireUpdate>) {
    let channel = SyncChannel::connect(TungsteniteConnector, endpoint, Duration::from_millis(100));
    let (tx, rx) = mpsc::unbounded_channel();
    channel.on_message(move |update| {
        let _ = tx.send(update);
    });
    let mut connectivity = channel.connectivity();
    timeout(
        WAIT,
        connectivity.wait_for(|state| *state == ConnectionState::Open),
    )
    .await
    .unwrap()
    .unwrap();
    (channel, rx)
}

async fn wait_for_update(rx: &mut mpsc::UnboundedReceiver<WireUpdate>, expected: &WireUpdate) {
    timeout(WAIT, async {
        while let Some(update) = rx.recv().await {
            if &update == expected {
                return;
            }
        }
        panic!("channel closed before `{expected:?}` arrived");
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn new_peers_receive_the_full_record() {
    let (_state, endpoint) = serve().await;
    let (channel, mut rx) = peer(&endpoint).await;

    let mut received = Vec::new();
    for _ in 0..7 {
        received.push(timeout(WAIT, rx.recv()).await.unwrap().unwrap());
    }
    assert!(received.contains(&WireUpdate::TeamAName("Team A".into())));
    assert!(received.contains(&WireUpdate::GameTimer("10:00".into())));
    assert!(received.contains(&WireUpdate::ShotClock("24".into())));

    channel.close().await;
}

#[tokio::test]
async fn updates_from_one_peer_reach_the_other_and_the_server() {
    let (state, endpoint) = serve().await;
    let (sender, mut sender_rx) = peer(&endpoint).await;
    let (receiver, mut receiver_rx) = peer(&endpoint).await;

    // Let the initial full-state frames land before sending.
    wait_for_update(&mut sender_rx, &WireUpdate::Period("1".into())).await;
    wait_for_update(&mut receiver_rx, &WireUpdate::Period("1".into())).await;

    sender.send(&WireUpdate::TeamBScore(7));
    sender.send(&WireUpdate::Period("2".into()));

    wait_for_update(&mut receiver_rx, &WireUpdate::TeamBScore(7)).await;
    wait_for_update(&mut receiver_rx, &WireUpdate::Period("2".into())).await;

    let game = state.snapshot().await;
    assert_eq!(game.team_b.score, 7);
    assert_eq!(game.team_a.score, 0);
    assert_eq!(game.period, "2");

    // The sender is never echoed its own updates.
    assert!(sender_rx.try_recv().is_err());

    sender.close().await;
    receiver.close().await;
}
