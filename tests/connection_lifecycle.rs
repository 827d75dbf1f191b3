//! Integration tests for the connection lifecycle.
//!
//! Registration, nickname collisions, channel joins, keepalive, quitting
//! and the ways a connection can fail.

mod common;

use std::time::Duration;

use common::{MockServer, eventually, wait_for_state};
use slirc_bot::{Bot, ConnectionState, EngineError};

#[tokio::test]
async fn test_registration_sends_nick_then_user() {
    let server = MockServer::bind().await.expect("bind");
    let bot = Bot::new(server.settings("lifebot"));
    let client = bot.client();
    let run = tokio::spawn(bot.run());

    let mut peer = server.accept().await.expect("accept");
    peer.expect("NICK lifebot").await.expect("NICK");
    peer.expect("USER lifebot 0 * :slirc bot").await.expect("USER");
    assert_eq!(client.state(), ConnectionState::Registering);

    peer.send(":irc.test 001 lifebot :Welcome").await.unwrap();
    wait_for_state(&client, ConnectionState::Connected)
        .await
        .expect("connected");

    client.quit().unwrap();
    assert!(run.await.unwrap().is_ok());
}

#[tokio::test]
async fn test_nick_collision_rotates_until_welcome() {
    let server = MockServer::bind().await.expect("bind");
    let mut settings = server.settings("taken");
    settings.channels = vec!["#first".into(), "#second".into()];
    let bot = Bot::new(settings);
    let client = bot.client();
    let run = tokio::spawn(bot.run());

    let mut peer = server.accept().await.expect("accept");
    peer.expect("NICK taken").await.unwrap();
    peer.recv().await.unwrap();

    peer.send(":irc.test 433 * taken :Nickname is already in use")
        .await
        .unwrap();
    peer.expect("NICK taken_001").await.unwrap();
    peer.send(":irc.test 433 * taken_001 :Nickname is already in use")
        .await
        .unwrap();
    peer.expect("NICK taken_002").await.unwrap();

    peer.send(":irc.test 001 taken_002 :Welcome").await.unwrap();
    peer.expect("JOIN #first").await.expect("first channel");
    peer.expect("JOIN #second").await.expect("second channel");

    wait_for_state(&client, ConnectionState::Connected)
        .await
        .unwrap();
    assert_eq!(client.nick(), "taken_002");

    client.quit().unwrap();
    assert!(run.await.unwrap().is_ok());
}

#[tokio::test]
async fn test_server_ping_is_answered() {
    let server = MockServer::bind().await.expect("bind");
    let bot = Bot::new(server.settings("pingbot"));
    let client = bot.client();
    let run = tokio::spawn(bot.run());

    let mut peer = server.accept().await.expect("accept");
    peer.register("pingbot").await.expect("register");
    peer.send("PING :irc.test").await.unwrap();
    peer.expect("PONG irc.test").await.expect("PONG");

    client.quit().unwrap();
    assert!(run.await.unwrap().is_ok());
}

#[tokio::test]
async fn test_unparsable_line_does_not_end_the_session() {
    let server = MockServer::bind().await.expect("bind");
    let bot = Bot::new(server.settings("tolerant"));
    let client = bot.client();
    let run = tokio::spawn(bot.run());

    let mut peer = server.accept().await.expect("accept");
    peer.register("tolerant").await.expect("register");
    peer.send(":only.a.prefix").await.unwrap();
    peer.send("PING still-here").await.unwrap();
    peer.expect("PONG still-here").await.expect("PONG");

    client.quit().unwrap();
    assert!(run.await.unwrap().is_ok());
}

#[tokio::test]
async fn test_quit_flushes_message_then_closes() {
    let server = MockServer::bind().await.expect("bind");
    let bot = Bot::new(server.settings("quitter"));
    let client = bot.client();
    let run = tokio::spawn(bot.run());

    let mut peer = server.accept().await.expect("accept");
    peer.register("quitter").await.expect("register");
    wait_for_state(&client, ConnectionState::Connected)
        .await
        .unwrap();

    client.quit().unwrap();
    let rest = peer.recv_to_eof().await.expect("eof");
    assert_eq!(rest, vec!["QUIT :I'll be back!"]);

    assert!(run.await.unwrap().is_ok());
    assert_eq!(client.state(), ConnectionState::Disconnected);
    assert!(client.is_shutdown());
}

#[tokio::test]
async fn test_server_close_is_an_error() {
    let server = MockServer::bind().await.expect("bind");
    let bot = Bot::new(server.settings("dropped"));
    let client = bot.client();
    let run = tokio::spawn(bot.run());

    let mut peer = server.accept().await.expect("accept");
    peer.register("dropped").await.expect("register");
    wait_for_state(&client, ConnectionState::Connected)
        .await
        .unwrap();
    drop(peer);

    let result = tokio::time::timeout(Duration::from_secs(5), run)
        .await
        .expect("run ends")
        .unwrap();
    assert!(matches!(result, Err(EngineError::Transport(_))));
    assert_eq!(client.state(), ConnectionState::Disconnected);
    assert!(!client.is_shutdown());
}

#[tokio::test]
async fn test_registration_timeout() {
    let server = MockServer::bind().await.expect("bind");
    let mut settings = server.settings("slowreg");
    settings.registration_timeout = Duration::from_millis(200);
    let run = tokio::spawn(Bot::new(settings).run());

    let mut peer = server.accept().await.expect("accept");
    peer.expect("NICK slowreg").await.unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), run)
        .await
        .expect("run ends")
        .unwrap();
    assert!(matches!(result, Err(EngineError::RegistrationTimeout { .. })));
}

#[tokio::test]
async fn test_idle_connection_self_pings_then_times_out() {
    let server = MockServer::bind().await.expect("bind");
    let mut settings = server.settings("idler");
    settings.keepalive = Duration::from_millis(300);
    let run = tokio::spawn(Bot::new(settings).run());

    let mut peer = server.accept().await.expect("accept");
    peer.register("idler").await.expect("register");
    peer.expect("PING idler").await.expect("self-ping");

    // Answering keeps the connection alive for another round.
    peer.send(":irc.test PONG irc.test :idler").await.unwrap();
    peer.expect("PING idler").await.expect("second self-ping");

    let result = tokio::time::timeout(Duration::from_secs(5), run)
        .await
        .expect("run ends")
        .unwrap();
    assert!(matches!(result, Err(EngineError::PingTimeout { .. })));
}

#[tokio::test]
async fn test_connect_refused() {
    let server = MockServer::bind().await.expect("bind");
    let settings = server.settings("nobody");
    drop(server);

    let result = Bot::new(settings).run().await;
    assert!(matches!(result, Err(EngineError::Transport(_))));
}

#[tokio::test]
async fn test_own_nick_change_is_tracked() {
    let server = MockServer::bind().await.expect("bind");
    let bot = Bot::new(server.settings("before"));
    let client = bot.client();
    let run = tokio::spawn(bot.run());

    let mut peer = server.accept().await.expect("accept");
    peer.register("before").await.expect("register");
    peer.send(":before!u@h NICK :after").await.unwrap();
    assert!(eventually(|| client.nick() == "after").await);

    // Someone else's change leaves ours alone.
    peer.send(":other!u@h NICK :before").await.unwrap();
    peer.send("PING sync").await.unwrap();
    peer.expect("PONG sync").await.unwrap();
    assert_eq!(client.nick(), "after");

    client.quit().unwrap();
    assert!(run.await.unwrap().is_ok());
}
