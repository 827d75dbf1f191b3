//! Integration tests for handler dispatch over a live connection.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use common::MockServer;
use slirc_bot::handlers::ActionTable;
use slirc_bot::{
    Bot, Client, CommandHandler, CommandMap, EventKinds, Handler, HandlerConfigError,
    HandlerFuture, Invocation, MethodTable, TriggerTable,
};
use slirc_proto::Message;

/// Answers `!where` differently in channels and in private.
struct Where;

impl Where {
    fn public(_this: Arc<Self>, client: Client, inv: Invocation) -> HandlerFuture {
        Box::pin(async move {
            client.privmsg(inv.reply_target().unwrap_or_default(), "public")?;
            Ok(())
        })
    }

    fn private(_this: Arc<Self>, client: Client, inv: Invocation) -> HandlerFuture {
        Box::pin(async move {
            client.privmsg(inv.reply_target().unwrap_or_default(), "private")?;
            Ok(())
        })
    }
}

impl CommandHandler for Where {
    fn name(&self) -> &str {
        "where"
    }

    fn triggers(&self) -> TriggerTable {
        TriggerTable::new()
            .route("where", "public", EventKinds::PUBLIC)
            .route("here", "private", EventKinds::PRIVATE)
    }

    fn actions() -> ActionTable<Self> {
        ActionTable::new()
            .action("public", Self::public)
            .action("private", Self::private)
    }
}

/// `!slow` never finishes in test time; `!boom` panics; `!fast` answers.
struct Moody {
    fast: AtomicUsize,
}

impl Moody {
    fn slow(_this: Arc<Self>, _client: Client, _inv: Invocation) -> HandlerFuture {
        Box::pin(async move {
            tokio::time::sleep(Duration::from_secs(600)).await;
            Ok(())
        })
    }

    fn boom(_this: Arc<Self>, _client: Client, _inv: Invocation) -> HandlerFuture {
        Box::pin(async move { panic!("handler blew up") })
    }

    fn fast(this: Arc<Self>, client: Client, inv: Invocation) -> HandlerFuture {
        Box::pin(async move {
            this.fast.fetch_add(1, Ordering::SeqCst);
            client.privmsg(inv.reply_target().unwrap_or_default(), "fast")?;
            Ok(())
        })
    }
}

impl CommandHandler for Moody {
    fn name(&self) -> &str {
        "moody"
    }

    fn triggers(&self) -> TriggerTable {
        let kinds = EventKinds::PUBLIC | EventKinds::PRIVATE;
        TriggerTable::new()
            .on("slow", kinds)
            .on("boom", kinds)
            .on("fast", kinds)
    }

    fn actions() -> ActionTable<Self> {
        ActionTable::new()
            .action("slow", Self::slow)
            .action("boom", Self::boom)
            .action("fast", Self::fast)
    }
}

/// Routes TOPIC to a method it never defines.
struct Broken;

impl Broken {
    fn noop(_this: Arc<Self>, _client: Client, _msg: Arc<Message>) -> HandlerFuture {
        Box::pin(async { Ok(()) })
    }
}

impl Handler for Broken {
    fn name(&self) -> &str {
        "broken"
    }

    fn commands(&self) -> CommandMap {
        CommandMap::new().on("TOPIC", "on_topic")
    }

    fn methods() -> MethodTable<Self> {
        MethodTable::new().method("noop", Self::noop)
    }
}

#[tokio::test]
async fn test_event_kind_selects_the_action() {
    let server = MockServer::bind().await.expect("bind");
    let bot = Bot::new(server.settings("router"));
    bot.add_command_handler(Where).expect("valid handler");
    let client = bot.client();
    let run = tokio::spawn(bot.run());

    let mut peer = server.accept().await.expect("accept");
    peer.register("router").await.expect("register");

    peer.send(":alice!a@h PRIVMSG #chan :!where").await.unwrap();
    peer.expect("PRIVMSG #chan :public").await.unwrap();
    peer.send(":alice!a@h PRIVMSG router :!here").await.unwrap();
    peer.expect("PRIVMSG alice :private").await.unwrap();

    // Wrong kind, wrong prefix and notices are all ignored.
    peer.send(":alice!a@h PRIVMSG #chan :!here").await.unwrap();
    peer.send(":alice!a@h PRIVMSG router :!where").await.unwrap();
    peer.send(":alice!a@h PRIVMSG #chan :?where").await.unwrap();
    peer.send(":alice!a@h NOTICE #chan :!where").await.unwrap();
    let stray = peer.collect_for(Duration::from_millis(300)).await;
    assert!(stray.is_empty(), "unexpected replies: {stray:?}");

    client.quit().unwrap();
    assert!(run.await.unwrap().is_ok());
}

#[tokio::test]
async fn test_custom_trigger_character() {
    let server = MockServer::bind().await.expect("bind");
    let mut settings = server.settings("qbot");
    settings.trigger = '?';
    let bot = Bot::new(settings);
    bot.add_command_handler(Where).unwrap();
    let client = bot.client();
    let run = tokio::spawn(bot.run());

    let mut peer = server.accept().await.expect("accept");
    peer.register("qbot").await.expect("register");
    peer.send(":alice!a@h PRIVMSG #chan :!where").await.unwrap();
    peer.send(":alice!a@h PRIVMSG #chan :?where").await.unwrap();
    peer.expect("PRIVMSG #chan :public").await.unwrap();

    client.quit().unwrap();
    assert!(run.await.unwrap().is_ok());
}

#[tokio::test]
async fn test_slow_and_panicking_handlers_do_not_block_others() {
    let server = MockServer::bind().await.expect("bind");
    let bot = Bot::new(server.settings("busy"));
    bot.add_command_handler(Moody {
        fast: AtomicUsize::new(0),
    })
    .unwrap();
    let client = bot.client();
    let registry = bot.registry();
    let run = tokio::spawn(bot.run());

    let mut peer = server.accept().await.expect("accept");
    peer.register("busy").await.expect("register");

    peer.send(":alice!a@h PRIVMSG #chan :!slow").await.unwrap();
    peer.send(":alice!a@h PRIVMSG #chan :!boom").await.unwrap();
    peer.send(":alice!a@h PRIVMSG #chan :!fast").await.unwrap();
    peer.expect("PRIVMSG #chan :fast").await.expect("fast reply");

    peer.send("PING :alive").await.unwrap();
    peer.expect("PONG alive").await.expect("connection survives");

    client.quit().unwrap();
    assert!(run.await.unwrap().is_ok());
    assert!(common::eventually(|| registry.in_flight() == 1).await);
    registry.abort_in_flight();
}

#[tokio::test]
async fn test_invalid_handler_is_rejected_before_running() {
    let bot = Bot::new(slirc_bot::BotSettings::new("127.0.0.1", 6667, "bot"));
    let err = bot.add_handler(Broken).unwrap_err();
    assert_eq!(
        err,
        HandlerConfigError::UnknownMethod {
            handler: "broken".into(),
            command: "TOPIC".into(),
            method: "on_topic".into(),
        }
    );
    assert_eq!(bot.registry().handler_names(), vec!["ctcp", "ping", "unknown_code"]);
}

#[tokio::test]
async fn test_handler_added_while_running() {
    let server = MockServer::bind().await.expect("bind");
    let bot = Bot::new(server.settings("late"));
    let client = bot.client();
    let registry = bot.registry();
    let run = tokio::spawn(bot.run());

    let mut peer = server.accept().await.expect("accept");
    peer.register("late").await.expect("register");

    peer.send(":alice!a@h PRIVMSG #chan :!where").await.unwrap();
    assert!(peer.collect_for(Duration::from_millis(200)).await.is_empty());

    let id = registry.add_command_handler(Where).unwrap();
    peer.send(":alice!a@h PRIVMSG #chan :!where").await.unwrap();
    peer.expect("PRIVMSG #chan :public").await.unwrap();

    assert!(registry.remove_handler(id));
    peer.send(":alice!a@h PRIVMSG #chan :!where").await.unwrap();
    assert!(peer.collect_for(Duration::from_millis(200)).await.is_empty());

    client.quit().unwrap();
    assert!(run.await.unwrap().is_ok());
}

#[tokio::test]
async fn test_ctcp_version_reply() {
    let server = MockServer::bind().await.expect("bind");
    let bot = Bot::new(server.settings("ctcpbot"));
    let client = bot.client();
    let run = tokio::spawn(bot.run());

    let mut peer = server.accept().await.expect("accept");
    peer.register("ctcpbot").await.expect("register");
    peer.send(":alice!a@h PRIVMSG ctcpbot :\x01VERSION\x01")
        .await
        .unwrap();
    let reply = peer.recv().await.unwrap();
    assert!(
        reply.starts_with("NOTICE alice :\x01VERSION slirc-bot:"),
        "got {reply:?}"
    );

    peer.send(":alice!a@h PRIVMSG ctcpbot :\x01PING 12345\x01")
        .await
        .unwrap();
    peer.expect("NOTICE alice :\x01PING 12345\x01").await.unwrap();

    client.quit().unwrap();
    assert!(run.await.unwrap().is_ok());
}
