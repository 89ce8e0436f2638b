//! Configuration file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config as NotifyConfig, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::attrs;
use crate::config::loader::{apply_config, load_config};
use crate::config::schema::Config;
use crate::facade::context::LogContext;
use crate::facade::record::Value;

/// Monitors the configuration file and sends every valid new version.
pub struct ConfigWatcher {
    path: PathBuf,
    ctx: Arc<LogContext>,
    update_tx: mpsc::UnboundedSender<Config>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiver for configuration updates.
    pub fn new(path: &Path, ctx: Arc<LogContext>) -> (Self, mpsc::UnboundedReceiver<Config>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                ctx,
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching. Keep the returned watcher alive for as long as
    /// updates are wanted.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();
        let ctx = self.ctx.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        reload(&ctx, &path, &tx);
                    }
                }
                Err(e) => ctx.error("config watch failed", attrs!["err" => Value::error(&e)]),
            },
            NotifyConfig::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        self.ctx.info(
            "config watcher started",
            attrs!["path" => self.path.display().to_string()],
        );
        Ok(watcher)
    }
}

/// Load `path` and forward it; an invalid file keeps the current config.
pub fn reload(ctx: &LogContext, path: &Path, tx: &mpsc::UnboundedSender<Config>) {
    match load_config(path) {
        Ok(config) => {
            let _ = tx.send(config);
        }
        Err(e) => ctx.error(
            "config reload failed, keeping current configuration",
            attrs!["path" => path.display().to_string(), "err" => Value::error(&e)],
        ),
    }
}

/// Apply every received configuration to `ctx` until the sender is gone.
pub async fn apply_updates(ctx: Arc<LogContext>, mut updates: mpsc::UnboundedReceiver<Config>) {
    while let Some(config) = updates.recv().await {
        apply_config(&ctx, &config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facade::level::Level;
    use crate::facade::sink::MemorySink;
    use std::fs;

    #[tokio::test]
    async fn test_reload_forwards_valid_and_skips_invalid() {
        let sink = Arc::new(MemorySink::new());
        let ctx = Arc::new(LogContext::new(sink.clone()));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recoverlog.toml");
        let (tx, rx) = mpsc::unbounded_channel();

        fs::write(&path, "[logging]\nlevel = \"nope\"").unwrap();
        reload(&ctx, &path, &tx);
        assert_eq!(sink.messages(), ["config reload failed, keeping current configuration"]);

        fs::write(&path, "[logging]\nlevel = \"warn\"").unwrap();
        reload(&ctx, &path, &tx);
        drop(tx);

        apply_updates(ctx.clone(), rx).await;
        assert_eq!(ctx.level(), Level::Warn);
    }
}
