//! Subscribe Bot Demo
//!
//! Reads inbound messages as JSON lines from stdin, routes them and prints
//! each reply as a JSON line on stdout.
//!
//! # Rules
//!
//! | # | match                           | mode  | flow     | reply                 |
//! |---|---------------------------------|-------|----------|-----------------------|
//! | 0 | everything                      | async | `next()` | none, logs the sender |
//! | 1 | `event` / `subscribe`           | sync  | `end()`  | welcome text          |
//! | 2 | `event` / `CLICK` / `menu_news` | sync  | `end()`  | news article          |
//! | 3 | content `ping`                  | sync  | `end()`  | `pong`                |
//! | 4 | content matching `help.*`       | sync  | `end()`  | help text             |
//! | 5 | any `text` message              | sync  | `end()`  | echo, or nothing      |
//!
//! # Usage
//!
//! ```bash
//! echo '{"FromUserName":"o_1","ToUserName":"gh_1","MsgType":"event","Event":"subscribe","CreateTime":1}' \
//!     | cargo run --package subscribe-bot
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use courier::core::Article;
use courier::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(about = "Route JSON messages from stdin and print the replies")]
struct Args {
    /// Configuration file; defaults to searching for `courier.toml`.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Logs who sent what. Runs on the worker pool.
struct AuditLog;

#[async_trait]
impl Handler for AuditLog {
    async fn handle(
        &self,
        message: &InMessage,
        _ctx: &mut RuleContext,
        _client: &BoxedClient,
        _session: &BoxedSession,
    ) -> HandlerResult<Option<OutMessage>> {
        info!(
            from_user = message.from_user.as_deref().unwrap_or("?"),
            msg_type = message.msg_type.as_deref().unwrap_or("?"),
            "Message received"
        );
        Ok(None)
    }
}

/// Builds a text reply addressed back to the sender.
fn text_reply(message: &InMessage, content: impl Into<String>) -> OutMessage {
    OutMessage::text()
        .to_user(message.from_user.clone().unwrap_or_default())
        .from_user(message.to_user.clone().unwrap_or_default())
        .content(content)
        .build()
}

fn build_router(config: &CourierConfig) -> Result<Router, BuildError> {
    router_builder(&config.router)
        .rule()
        .name("audit")
        .handler(AuditLog)
        .next()
        .rule()
        .name("greeting")
        .r#async(false)
        .msg_type("event")
        .event("subscribe")
        .handler(handler_fn(|msg, _| {
            Ok(Some(text_reply(msg, "Thanks for subscribing! Send 'help' to see what I can do.")))
        }))
        .end()
        .rule()
        .name("news")
        .r#async(false)
        .msg_type("event")
        .event("CLICK")
        .event_key("menu_news")
        .handler(handler_fn(|msg, _| {
            Ok(Some(
                OutMessage::news()
                    .to_user(msg.from_user.clone().unwrap_or_default())
                    .from_user(msg.to_user.clone().unwrap_or_default())
                    .article(Article {
                        title: Some("Courier 0.1".into()),
                        description: Some("Rule-based routing for webhook messages".into()),
                        url: Some("https://github.com/courier-rs/courier".into()),
                        ..Default::default()
                    })
                    .build(),
            ))
        }))
        .end()
        .rule()
        .name("ping")
        .r#async(false)
        .content("ping")
        .handler(handler_fn(|msg, _| Ok(Some(text_reply(msg, "pong")))))
        .end()
        .rule()
        .name("help")
        .r#async(false)
        .content_pattern("(?i)help.*")
        .handler(handler_fn(|msg, _| {
            Ok(Some(text_reply(
                msg,
                "ping - check I'm alive\nhelp - this text\nanything else - echoed back",
            )))
        }))
        .end()
        .rule()
        .name("echo")
        .r#async(false)
        .msg_type("text")
        .interceptor(interceptor_fn(|msg, ctx| {
            // Nothing to echo for blank messages.
            match msg.trimmed_content().filter(|c| !c.is_empty()) {
                Some(content) => {
                    ctx.insert("echo", content.to_string());
                    Ok(true)
                }
                None => Ok(false),
            }
        }))
        .handler(handler_fn(|msg, ctx| {
            Ok(ctx.remove::<String>("echo").map(|content| text_reply(msg, content)))
        }))
        .end()
        .build()
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let loader = match &args.config {
        Some(path) => ConfigLoader::new().file(path),
        None => ConfigLoader::new(),
    };
    let config = bootstrap(loader).context("failed to load configuration")?;
    let router = build_router(&config).context("failed to build router")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let message = match InMessage::from_json(&line) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "Skipping malformed message");
                continue;
            }
        };

        match router.route(message).await {
            Ok(Some(reply)) => println!("{}", serde_json::to_string(&reply)?),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Routing failed"),
        }
    }

    router.shutdown().await;
    Ok(())
}
