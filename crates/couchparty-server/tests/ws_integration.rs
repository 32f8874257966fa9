#[allow(dead_code)]
mod common;

use couchparty_core::net::messages::{
    ActionKind, ActionMsg, ClientMessage, InputMsg, JoinMsg, RoundResultsMsg, ScoreUpdateMsg,
    ServerMessage, StartRoundMsg, TiltMsg, VibrateRequestMsg,
};
use couchparty_core::player::PlayerColor;
use couchparty_core::ranking::RankedEntry;
use couchparty_core::session::{GameKind, GamePhase};

use common::{
    TestServer, join_display, join_player, ws_connect, ws_drain, ws_read, ws_read_until, ws_send,
    ws_try_read_raw,
};

#[tokio::test]
async fn players_get_palette_colors_in_join_order() {
    let server = TestServer::new().await;

    let (_a, alice) = join_player(&server, "Alice").await;
    let (_b, bob) = join_player(&server, "  Bob  ").await;

    assert_eq!(alice.name, "Alice");
    assert_eq!(alice.color, PlayerColor::PALETTE[0]);
    assert_eq!(bob.name, "Bob");
    assert_eq!(bob.color, PlayerColor::PALETTE[1]);
    assert_ne!(alice.id, bob.id);
    assert!(!alice.is_ready);
    assert_eq!(alice.score, 0);
}

#[tokio::test]
async fn blank_name_gets_numbered_default() {
    let server = TestServer::new().await;
    let (_a, _) = join_player(&server, "Alice").await;

    let mut ws = ws_connect(&server.ws_url()).await;
    ws_send(&mut ws, &ClientMessage::Join(JoinMsg { name: None })).await;
    match ws_read(&mut ws).await {
        ServerMessage::Joined(p) => assert_eq!(p.name, "Player 2"),
        other => panic!("Expected Joined, got: {other:?}"),
    }
}

#[tokio::test]
async fn ninth_player_is_rejected() {
    let server = TestServer::new().await;
    let mut held = Vec::new();
    for i in 0..8 {
        held.push(join_player(&server, &format!("P{i}")).await);
    }

    let mut late = ws_connect(&server.ws_url()).await;
    ws_send(
        &mut late,
        &ClientMessage::Join(JoinMsg {
            name: Some("Late".into()),
        }),
    )
    .await;
    match ws_read(&mut late).await {
        ServerMessage::JoinRejected(r) => assert_eq!(r.reason, "Game is full!"),
        other => panic!("Expected JoinRejected, got: {other:?}"),
    }

    let state: serde_json::Value = reqwest::get(format!("{}/state", server.base_url()))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(state["players"].as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn all_ready_fires_on_each_transition() {
    let server = TestServer::new().await;
    let mut display = join_display(&server).await;

    let (mut a, _) = join_player(&server, "A").await;
    let (mut b, _) = join_player(&server, "B").await;
    ws_read_until(&mut display, |m| {
        matches!(m, ServerMessage::Roster(r) if r.players.len() == 2)
    })
    .await;

    ws_send(&mut a, &ClientMessage::ReadyToggle).await;
    let roster = ws_read(&mut display).await;
    match roster {
        ServerMessage::Roster(r) => {
            assert!(r.players[0].is_ready);
            assert!(!r.players[1].is_ready);
        },
        other => panic!("Expected Roster, got: {other:?}"),
    }

    ws_send(&mut b, &ClientMessage::ReadyToggle).await;
    assert!(matches!(ws_read(&mut display).await, ServerMessage::Roster(_)));
    assert_eq!(ws_read(&mut display).await, ServerMessage::AllReady);

    // Nothing further while the roster stays ready
    assert!(ws_try_read_raw(&mut display, 200).await.is_none());

    // Unready then ready again rearms the latch
    ws_send(&mut b, &ClientMessage::ReadyToggle).await;
    ws_send(&mut b, &ClientMessage::ReadyToggle).await;
    let rest = ws_drain(&mut display, 300).await;
    assert_eq!(rest.len(), 3, "unexpected frames: {rest:?}");
    assert!(matches!(rest[0], ServerMessage::Roster(_)));
    assert!(matches!(rest[1], ServerMessage::Roster(_)));
    assert_eq!(rest[2], ServerMessage::AllReady);
}

#[tokio::test]
async fn display_joining_a_ready_lobby_is_told_so() {
    let server = TestServer::new().await;
    let (mut a, _) = join_player(&server, "A").await;
    ws_send(&mut a, &ClientMessage::ReadyToggle).await;

    let url = format!("{}/state", server.base_url());
    let mut ready = false;
    for _ in 0..100 {
        let state: serde_json::Value = reqwest::get(&url).await.unwrap().json().await.unwrap();
        if state["players"][0]["is_ready"] == true {
            ready = true;
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert!(ready, "ready toggle never applied");

    let mut display = join_display(&server).await;
    assert_eq!(ws_read(&mut display).await, ServerMessage::AllReady);
}

#[tokio::test]
async fn controller_input_is_relayed_to_displays() {
    let server = TestServer::new().await;
    let mut d1 = join_display(&server).await;
    let mut d2 = join_display(&server).await;
    let (mut phone, me) = join_player(&server, "Tilty").await;

    ws_send(
        &mut phone,
        &ClientMessage::Input(InputMsg {
            x: 0.5,
            y: -0.25,
            action: false,
        }),
    )
    .await;
    ws_send(&mut phone, &ClientMessage::Tilt(TiltMsg { x: 1.0, y: 0.0 })).await;
    ws_send(
        &mut phone,
        &ClientMessage::Action(ActionMsg::new(ActionKind::Boost)),
    )
    .await;

    for display in [&mut d1, &mut d2] {
        match ws_read_until(display, |m| matches!(m, ServerMessage::PlayerInput(_))).await {
            ServerMessage::PlayerInput(msg) => {
                assert_eq!(msg.player_id, me.id);
                assert_eq!(msg.input.x, 0.5);
                assert_eq!(msg.input.y, -0.25);
            },
            _ => unreachable!(),
        }
        match ws_read(display).await {
            ServerMessage::PlayerTilt(msg) => {
                assert_eq!(msg.player_id, me.id);
                assert_eq!(msg.tilt.x, 1.0);
            },
            other => panic!("Expected PlayerTilt, got: {other:?}"),
        }
        match ws_read(display).await {
            ServerMessage::PlayerAction(msg) => {
                assert_eq!(msg.player_id, me.id);
                assert_eq!(msg.action.kind, ActionKind::Boost);
            },
            other => panic!("Expected PlayerAction, got: {other:?}"),
        }
    }

    // The sender never hears its own input back
    assert!(ws_try_read_raw(&mut phone, 200).await.is_none());
}

#[tokio::test]
async fn score_and_vibrate_reach_only_the_target() {
    let server = TestServer::new().await;
    let mut display = join_display(&server).await;
    let (mut a, alice) = join_player(&server, "A").await;
    let (mut b, _) = join_player(&server, "B").await;

    ws_send(
        &mut display,
        &ClientMessage::StartRound(StartRoundMsg {
            game: GameKind::Battle,
        }),
    )
    .await;
    assert!(matches!(ws_read(&mut a).await, ServerMessage::RoundStarted(_)));
    assert!(matches!(ws_read(&mut b).await, ServerMessage::RoundStarted(_)));

    ws_send(
        &mut display,
        &ClientMessage::ScoreUpdate(ScoreUpdateMsg {
            player_id: alice.id,
            score: 125,
        }),
    )
    .await;
    ws_send(
        &mut display,
        &ClientMessage::Vibrate(VibrateRequestMsg {
            player_id: alice.id,
            pattern: Vec::new(),
        }),
    )
    .await;

    match ws_read(&mut a).await {
        ServerMessage::Score(s) => assert_eq!(s.score, 125),
        other => panic!("Expected Score, got: {other:?}"),
    }
    match ws_read(&mut a).await {
        ServerMessage::Vibrate(v) => assert_eq!(v.pattern, vec![100]),
        other => panic!("Expected Vibrate, got: {other:?}"),
    }
    assert!(ws_try_read_raw(&mut b, 200).await.is_none());
}

#[tokio::test]
async fn round_lifecycle_round_trip() {
    let server = TestServer::new().await;
    let mut display = join_display(&server).await;
    let (mut phone, me) = join_player(&server, "Solo").await;

    ws_send(
        &mut display,
        &ClientMessage::StartRound(StartRoundMsg {
            game: GameKind::Quiz,
        }),
    )
    .await;
    match ws_read_until(&mut display, |m| matches!(m, ServerMessage::RoundStarted(_))).await {
        ServerMessage::RoundStarted(started) => {
            assert_eq!(started.game, GameKind::Quiz);
            assert_eq!(started.players.len(), 1);
        },
        _ => unreachable!(),
    }
    assert!(matches!(ws_read(&mut phone).await, ServerMessage::RoundStarted(_)));

    let results = RoundResultsMsg {
        game: Some(GameKind::Quiz),
        results: vec![RankedEntry {
            rank: 1,
            player_id: me.id,
            name: me.name.clone(),
            color: me.color,
            score: 150,
        }],
    };
    ws_send(&mut display, &ClientMessage::EndRound(results.clone())).await;
    assert_eq!(
        ws_read_until(&mut display, |m| matches!(m, ServerMessage::RoundEnded(_))).await,
        ServerMessage::RoundEnded(results.clone())
    );
    assert_eq!(ws_read(&mut phone).await, ServerMessage::RoundEnded(results));

    ws_send(&mut display, &ClientMessage::ReturnToLobby).await;
    assert_eq!(ws_read(&mut phone).await, ServerMessage::ReturnedToLobby);
    match ws_read(&mut phone).await {
        ServerMessage::Roster(r) => {
            assert_eq!(r.players[0].score, 0);
            assert!(!r.players[0].is_ready);
        },
        other => panic!("Expected Roster, got: {other:?}"),
    }

    let state: serde_json::Value = reqwest::get(format!("{}/state", server.base_url()))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(state["phase"], "lobby");
}

#[tokio::test]
async fn phone_cannot_start_a_round() {
    let server = TestServer::new().await;
    let (mut phone, _) = join_player(&server, "Sneaky").await;

    ws_send(
        &mut phone,
        &ClientMessage::StartRound(StartRoundMsg {
            game: GameKind::Racing,
        }),
    )
    .await;
    assert!(ws_try_read_raw(&mut phone, 200).await.is_none());

    let state: serde_json::Value = reqwest::get(format!("{}/state", server.base_url()))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(state["phase"], "lobby");
}

#[tokio::test]
async fn departing_player_updates_display_roster() {
    let server = TestServer::new().await;
    let mut display = join_display(&server).await;
    let (_a, _) = join_player(&server, "Stays").await;
    let (b, _) = join_player(&server, "Leaves").await;
    ws_read_until(&mut display, |m| {
        matches!(m, ServerMessage::Roster(r) if r.players.len() == 2)
    })
    .await;

    drop(b);

    match ws_read_until(&mut display, |m| matches!(m, ServerMessage::Roster(_))).await {
        ServerMessage::Roster(r) => {
            assert_eq!(r.players.len(), 1);
            assert_eq!(r.players[0].name, "Stays");
        },
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn last_display_leaving_returns_players_to_lobby() {
    let server = TestServer::new().await;
    let mut display = join_display(&server).await;
    let (mut phone, _) = join_player(&server, "Left Behind").await;

    ws_send(
        &mut display,
        &ClientMessage::StartRound(StartRoundMsg {
            game: GameKind::Racing,
        }),
    )
    .await;
    assert!(matches!(ws_read(&mut phone).await, ServerMessage::RoundStarted(_)));

    drop(display);

    assert_eq!(ws_read(&mut phone).await, ServerMessage::ReturnedToLobby);
    assert!(matches!(ws_read(&mut phone).await, ServerMessage::Roster(_)));

    let state: serde_json::Value = reqwest::get(format!("{}/state", server.base_url()))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(state["phase"], serde_json::json!(GamePhase::Lobby));
}

#[tokio::test]
async fn garbage_frames_do_not_kill_the_connection() {
    use futures::SinkExt;
    use tokio_tungstenite::tungstenite::Message;

    let server = TestServer::new().await;
    let mut ws = ws_connect(&server.ws_url()).await;
    ws.send(Message::Binary(vec![0xEE, 0x01, 0x02].into()))
        .await
        .unwrap();
    ws.send(Message::Text("hello".into())).await.unwrap();

    ws_send(
        &mut ws,
        &ClientMessage::Join(JoinMsg {
            name: Some("Survivor".into()),
        }),
    )
    .await;
    match ws_read(&mut ws).await {
        ServerMessage::Joined(p) => assert_eq!(p.name, "Survivor"),
        other => panic!("Expected Joined, got: {other:?}"),
    }
}
