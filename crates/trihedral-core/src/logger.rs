//! Stderr logging for the rig tools.
//!
//! Lines look like `[  0.012s  INFO rig] assembled 3 panels`, where the tag
//! is the emitting workspace crate without its `trihedral_` prefix. Records
//! from other crates are capped at `Warn` so dependency chatter stays out
//! of debug runs.
//!
//! `TRIHEDRAL_LOG` (a level name) overrides the level passed by the caller.

use log::{Level, LevelFilter, Log, Metadata, Record};
use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, fmt::format::FmtSpan, util::SubscriberInitExt, EnvFilter};

/// Environment variable that overrides the requested level.
pub const LOG_ENV: &str = "TRIHEDRAL_LOG";

const WORKSPACE_PREFIX: &str = "trihedral";

struct RigLogger {
    workspace: LevelFilter,
    started: Instant,
}

impl RigLogger {
    fn limit_for(&self, target: &str) -> LevelFilter {
        if target.starts_with(WORKSPACE_PREFIX) {
            self.workspace
        } else {
            self.workspace.min(LevelFilter::Warn)
        }
    }
}

/// `trihedral_rig::panel` -> `rig`, `trihedral` -> `trihedral`.
fn short_target(target: &str) -> &str {
    let krate = target.split("::").next().unwrap_or(target);
    krate
        .strip_prefix("trihedral_")
        .filter(|s| !s.is_empty())
        .unwrap_or(krate)
}

impl Log for RigLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.limit_for(metadata.target())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let t = self.started.elapsed().as_secs_f64();
        let mut err = std::io::stderr().lock();
        let _ = match record.level() {
            Level::Error | Level::Warn => writeln!(
                err,
                "[{t:8.3}s {:>5} {}] {} ({}:{})",
                record.level(),
                short_target(record.target()),
                record.args(),
                record.file().unwrap_or("?"),
                record.line().unwrap_or(0)
            ),
            _ => writeln!(
                err,
                "[{t:8.3}s {:>5} {}] {}",
                record.level(),
                short_target(record.target()),
                record.args()
            ),
        };
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<RigLogger> = OnceLock::new();

fn env_level() -> Option<LevelFilter> {
    std::env::var(LOG_ENV).ok()?.trim().parse().ok()
}

/// Install the stderr logger. Later calls keep the first logger.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let workspace = env_level().unwrap_or(level);
    let logger = LOGGER.get_or_init(|| RigLogger {
        workspace,
        started: Instant::now(),
    });
    log::set_logger(logger)?;
    log::set_max_level(workspace);
    Ok(())
}

/// Install a `tracing` subscriber; `RUST_LOG` filters, default `info`.
///
/// Pipeline stages are instrumented, so span close events carry timings.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_span_events(FmtSpan::CLOSE);
    let _ = if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init()
    };
}
