// Framework bootstrap for the arena runtime: stdin in, JSON lines out.

use crate::frameworks::arena::{Arena, ArenaLayout, build_arena};
use crate::frameworks::config;
use crate::interface_adapters::input::parse_input_line;
use crate::interface_adapters::protocol::{OutputMessage, encode};

use std::future::Future;
use std::io::{Result, Write};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // Logs go to stderr; stdout carries the snapshot stream.
    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// Loop settings that are not gameplay tuning.
#[derive(Debug, Clone, Copy)]
pub struct RunSettings {
    pub tick_interval: Duration,
    pub snapshot_every_ticks: u64,
    /// Stop after this many ticks; `None` runs until shutdown.
    pub max_ticks: Option<u64>,
}

/// Forwards each line of `reader` into `input_tx` until EOF or the receiver is gone.
pub fn spawn_line_reader<R>(reader: R, input_tx: mpsc::Sender<String>) -> JoinHandle<()>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = reader.lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if input_tx.send(line).await.is_err() {
                        break;
                    }
                }
                Ok(None) => {
                    info!("input closed");
                    break;
                }
                Err(error) => {
                    warn!(%error, "input read failed");
                    break;
                }
            }
        }
    })
}

/// Drives the simulation at a fixed tick rate until `shutdown` resolves or the tick limit is hit.
pub async fn run<W, S>(
    arena: Arena,
    mut input_rx: mpsc::Receiver<String>,
    mut output: W,
    settings: RunSettings,
    shutdown: S,
) -> Result<()>
where
    W: Write,
    S: Future<Output = ()>,
{
    let mut simulation = arena.simulation;
    let every = settings.snapshot_every_ticks.max(1);

    writeln!(
        output,
        "{}",
        encode(&OutputMessage::Arena {
            width: config::ARENA_WIDTH,
            height: config::ARENA_HEIGHT,
        })?
    )?;

    // Drive the fixed-step loop at the configured tick rate.
    let mut interval = tokio::time::interval(settings.tick_interval);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!(tick = simulation.tick(), "shutdown requested");
                break;
            }
            _ = interval.tick() => {}
        }

        // Apply every input that arrived since the last tick, in arrival order.
        while let Ok(line) = input_rx.try_recv() {
            match parse_input_line(&line) {
                Ok(event) => simulation.handle_input(event),
                Err(error) => warn!(%error, line = %line, "ignoring input line"),
            }
        }

        simulation.step(settings.tick_interval);

        if simulation.tick() % every == 0 {
            let update = simulation.snapshot();
            debug!(tick = update.tick, bullets = update.bullets.len(), "snapshot");
            writeln!(output, "{}", encode(&OutputMessage::WorldUpdate(update.into()))?)?;
            output.flush()?;
        }

        if settings.max_ticks.is_some_and(|max| simulation.tick() >= max) {
            info!(tick = simulation.tick(), "tick limit reached");
            break;
        }
    }

    output.flush()
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let layout = ArenaLayout {
        width: config::ARENA_WIDTH,
        height: config::ARENA_HEIGHT,
        wall_thickness: config::WALL_THICKNESS,
    };
    let seed = config::arena_seed();
    let arena = build_arena(layout, seed);
    info!(?seed, "arena ready");

    // input_tx/rx: raw host input lines go to the single simulation loop.
    let (input_tx, input_rx) = mpsc::channel::<String>(config::INPUT_CHANNEL_CAPACITY);
    spawn_line_reader(BufReader::new(tokio::io::stdin()), input_tx);

    let settings = RunSettings {
        tick_interval: config::TICK_INTERVAL,
        snapshot_every_ticks: config::snapshot_every_ticks(),
        max_ticks: None,
    };
    let shutdown = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(%error, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    run(arena, input_rx, std::io::stdout().lock(), settings, shutdown).await
}
