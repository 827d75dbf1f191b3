//! Integration tests for per-command access rights loaded from config.

mod common;

use std::time::Duration;

use common::{MockServer, Peer};
use slirc_bot::{Bot, Client, Config, HelloCommand};

async fn start(server: &MockServer, rights_toml: &str) -> (Client, tokio::task::JoinHandle<()>, Peer) {
    let toml = format!(
        "[[server]]\nhost = \"127.0.0.1\"\nport = {}\nnick = \"gate\"\n{rights_toml}",
        server.port()
    );
    let config = Config::parse(&toml).expect("valid config");
    let server_config = &config.servers[0];

    let bot = Bot::new(server_config.settings());
    bot.add_command_handler_with_rights(HelloCommand, server_config.rights())
        .expect("valid handler");
    let client = bot.client();
    let run = tokio::spawn(async move {
        assert!(bot.run().await.is_ok());
    });

    let mut peer = server.accept().await.expect("accept");
    peer.register("gate").await.expect("register");
    (client, run, peer)
}

#[tokio::test]
async fn test_allowed_and_denied_users() {
    let server = MockServer::bind().await.expect("bind");
    let (client, run, mut peer) = start(
        &server,
        r#"
[server.rights.commands.hello]
alice = ["public", "private"]
"*" = ["public"]
"#,
    )
    .await;

    peer.send(":Alice!a@h PRIVMSG gate :!hello").await.unwrap();
    peer.expect("PRIVMSG Alice :Hello Alice!").await.unwrap();

    peer.send(":bob!b@h PRIVMSG #chan :!hello").await.unwrap();
    peer.expect("PRIVMSG #chan :Hello bob!").await.unwrap();

    peer.send(":bob!b@h PRIVMSG gate :!hello").await.unwrap();
    peer.expect("NOTICE bob :You are not allowed to use the \x02hello\x0F command")
        .await
        .unwrap();

    client.quit().unwrap();
    run.await.unwrap();
}

#[tokio::test]
async fn test_denial_notice_follows_policy() {
    let server = MockServer::bind().await.expect("bind");
    let (client, run, mut peer) = start(
        &server,
        r#"
[server.rights]
notify = ["private"]
[server.rights.commands.hello]
alice = ["private"]
"#,
    )
    .await;

    // Public denial is silent under this policy.
    peer.send(":bob!b@h PRIVMSG #chan :!hello").await.unwrap();
    assert!(peer.collect_for(Duration::from_millis(300)).await.is_empty());

    peer.send(":bob!b@h PRIVMSG gate :!hello").await.unwrap();
    peer.expect("NOTICE bob :You are not allowed to use the \x02hello\x0F command")
        .await
        .unwrap();

    client.quit().unwrap();
    run.await.unwrap();
}

#[tokio::test]
async fn test_unrestricted_without_rules() {
    let server = MockServer::bind().await.expect("bind");
    let (client, run, mut peer) = start(&server, "").await;

    peer.send(":anyone!x@h PRIVMSG gate :!hello").await.unwrap();
    peer.expect("PRIVMSG anyone :Hello anyone!").await.unwrap();

    client.quit().unwrap();
    run.await.unwrap();
}
