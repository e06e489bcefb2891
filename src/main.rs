//! slcmd - Straylight Command Dispatch console host.
//!
//! Loads a configuration file, wires the dispatch engine with a handful of
//! built-in commands and feeds every stdin line through it as a message from
//! the configured console identity. Lines starting with `/` are host
//! directives:
//!
//! - `/dm <text>` sends `<text>` as a direct message
//! - `/block <author>` and `/unblock <author>` edit the blacklist
//! - `/metrics` prints the Prometheus text exposition

use slcmd::commands::CommandRegistry;
use slcmd::config::{self, Config, ConsoleConfig, LoggingConfig};
use slcmd::metrics;
use slcmd::{
    CommandContext, CommandDefinition, DispatchEngine, DispatchEngineBuilder, DispatchError,
    MemberContext, MessageEvent, PermissionRegistry, handler_fn,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Registries the `help` command reads; filled in once the engine is built.
type HelpSource = Arc<OnceLock<(Arc<CommandRegistry>, Arc<PermissionRegistry>)>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = match Config::load(&config_path) {
        Ok(config) => {
            init_tracing(&config.logging);
            config
        }
        Err(e) => {
            init_tracing(&LoggingConfig::default());
            error!(path = %config_path, error = %e, "Failed to load config");
            return Err(e.into());
        }
    };

    if let Err(errors) = config::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        return Err(anyhow::anyhow!(
            "configuration has {} error(s), see above",
            errors.len()
        ));
    }

    metrics::init();

    let help_source: HelpSource = Arc::new(OnceLock::new());
    let engine = DispatchEngineBuilder::from_config(&config)?
        .commands(builtin_commands(&help_source))
        .error_sink(|event: &MessageEvent, error: &DispatchError| {
            warn!(
                message = %event.id,
                author = %event.author_id,
                code = error.error_code(),
                error = %error,
                "Dispatch failed"
            );
        })
        .build()?;
    let _ = help_source.set((
        Arc::clone(engine.commands()),
        Arc::clone(engine.permissions()),
    ));
    let engine = Arc::new(engine);

    info!(
        config = %config_path,
        author = %config.console.author,
        guild = %config.console.guild,
        "Console host reading stdin"
    );

    let mut in_flight = JoinSet::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut sequence = 0u64;

    while let Some(line) = lines.next_line().await? {
        if let Some(directive) = line.strip_prefix('/') {
            if let Some(event) = handle_directive(directive, &engine, &config.console) {
                sequence += 1;
                spawn_dispatch(&mut in_flight, &engine, event.with_id(sequence.to_string()));
            }
            continue;
        }

        sequence += 1;
        let console = &config.console;
        let event = MessageEvent::guild(
            console.guild.clone(),
            console.author.clone(),
            line,
            MemberContext::with_permissions(console.permissions.iter().cloned()),
        )
        .with_id(sequence.to_string());
        spawn_dispatch(&mut in_flight, &engine, event);

        // Reap finished dispatches so the set does not grow unbounded.
        while in_flight.try_join_next().is_some() {}
    }

    while in_flight.join_next().await.is_some() {}
    info!(messages = sequence, "stdin closed, shutting down");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.filter.as_str()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn spawn_dispatch(set: &mut JoinSet<()>, engine: &Arc<DispatchEngine>, event: MessageEvent) {
    let engine = Arc::clone(engine);
    set.spawn(async move {
        let outcome = engine.process_incoming_message(event).await;
        tracing::debug!(outcome = outcome.label(), command = ?outcome.command(), "Dispatched");
    });
}

/// Apply a host directive. Returns an event when the directive produces one.
fn handle_directive(
    directive: &str,
    engine: &DispatchEngine,
    console: &ConsoleConfig,
) -> Option<MessageEvent> {
    let (name, rest) = directive.split_once(' ').unwrap_or((directive, ""));
    let rest = rest.trim();

    match name.to_ascii_lowercase().as_str() {
        "dm" => Some(MessageEvent::direct(console.author.clone(), rest)),
        "block" if !rest.is_empty() => {
            engine.blacklist().add(rest);
            None
        }
        "unblock" if !rest.is_empty() => {
            if !engine.blacklist().remove(rest) {
                warn!(author = %rest, "Author was not blacklisted");
            }
            None
        }
        "metrics" => {
            print!("{}", metrics::gather_metrics());
            None
        }
        _ => {
            warn!(directive = %directive, "Unknown directive (try /dm, /block, /unblock, /metrics)");
            None
        }
    }
}

fn builtin_commands(help_source: &HelpSource) -> Vec<CommandDefinition> {
    let started = Arc::new(AtomicU64::new(0));

    let ping = CommandDefinition::new(
        ["ping"],
        handler_fn(move |_ctx: CommandContext| {
            let started = Arc::clone(&started);
            async move {
                let n = started.fetch_add(1, Ordering::Relaxed) + 1;
                println!("pong ({n})");
                Ok(())
            }
        }),
    )
    .describe("Check that the bot is alive");

    let echo = CommandDefinition::new(
        ["echo", "say"],
        handler_fn(|ctx: CommandContext| async move {
            if ctx.arguments().is_empty() {
                anyhow::bail!("nothing to echo");
            }
            println!("{}", ctx.arguments());
            Ok(())
        }),
    )
    .describe("Repeat the arguments")
    .usage("<text>");

    let source = Arc::clone(help_source);
    let help = CommandDefinition::new(
        ["help", "commands"],
        handler_fn(move |ctx: CommandContext| {
            let source = Arc::clone(&source);
            async move {
                let Some((commands, permissions)) = source.get() else {
                    anyhow::bail!("command list is not available yet");
                };

                if let Some(wanted) = ctx.args().first() {
                    let Some(command) = commands.find(wanted) else {
                        anyhow::bail!("no command named '{wanted}'");
                    };
                    println!(
                        "{}{} {}: {}",
                        ctx.prefix(),
                        command.name(),
                        command.usage_text().unwrap_or(""),
                        command.description().unwrap_or("no description")
                    );
                    return Ok(());
                }

                for command in commands.visible_commands(ctx.event(), permissions) {
                    println!(
                        "{}{:<10} {}",
                        ctx.prefix(),
                        command.name(),
                        command.description().unwrap_or("")
                    );
                }
                Ok(())
            }
        }),
    )
    .describe("List the commands you can use")
    .usage("[command]");

    let source = Arc::clone(help_source);
    let stats = CommandDefinition::new(
        ["stats"],
        handler_fn(move |_ctx: CommandContext| {
            let source = Arc::clone(&source);
            async move {
                let Some((commands, _)) = source.get() else {
                    anyhow::bail!("command list is not available yet");
                };
                for (command, count) in commands.command_stats() {
                    println!("{command:<10} {count}");
                }
                Ok(())
            }
        }),
    )
    .describe("Show how often each command ran");

    vec![ping, echo, help, stats]
}
