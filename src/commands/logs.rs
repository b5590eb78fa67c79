use chrono::Utc;
use log::{LevelFilter, Log, Metadata, Record};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

use crate::util::app_dir;

const MAX_SESSIONS: usize = 10;

pub fn logs_dir() -> Option<PathBuf> {
    app_dir().map(|d| d.join("logs"))
}

/// Session log writing timestamped lines to `~/.raidplan/logs/latest.log`.
///
/// `log` macros only push onto a channel; a background task owns the file, so
/// command handlers never wait on disk I/O.
pub struct SessionLogger {
    tx: mpsc::UnboundedSender<String>,
    #[cfg(test)]
    writer: tokio::task::JoinHandle<()>,
}

impl SessionLogger {
    /// Opens a new session in `logs_dir`.
    ///
    /// - Creates the directory if needed
    /// - Rotates the previous `latest.log` to `session-{unix}.log`
    /// - Keeps at most ten old sessions
    /// - Spawns the writer task (needs a running Tokio runtime)
    pub async fn new(logs_dir: &Path) -> Option<Self> {
        if tokio::fs::create_dir_all(logs_dir).await.is_err() {
            return None;
        }

        let latest = logs_dir.join("latest.log");
        if latest.exists() {
            let rotated = logs_dir.join(format!("session-{}.log", Utc::now().timestamp()));
            let _ = tokio::fs::rename(&latest, &rotated).await;
        }

        cleanup_old_sessions(logs_dir).await;

        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&latest)
            .await
            .ok()?;

        let (tx, rx) = mpsc::unbounded_channel::<String>();
        let _writer = tokio::spawn(writer_task(file, rx));

        let _ = tx.send(format!("=== Raidplan session, {} ===\n\n", timestamp()));

        Some(Self {
            tx,
            #[cfg(test)]
            writer: _writer,
        })
    }

    /// Queues one line. Never blocks.
    pub fn line(&self, prefix: &str, message: &str) {
        let _ = self
            .tx
            .send(format!("[{}] [{prefix}] {message}\n", timestamp()));
    }

    /// Closes the channel and waits for everything to reach disk.
    #[cfg(test)]
    async fn close(self) {
        drop(self.tx);
        let _ = self.writer.await;
    }
}

impl Log for SessionLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        // Dependencies only get to say something when it matters.
        let limit = if metadata.target().starts_with("raidplan") {
            log::max_level()
        } else {
            LevelFilter::Warn.min(log::max_level())
        };
        metadata.level() <= limit
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let prefix = format!("{} {}", record.level(), record.target());
        let message = record.args().to_string();
        #[cfg(debug_assertions)]
        eprintln!("[{prefix}] {message}");
        self.line(&prefix, &message);
    }

    fn flush(&self) {}
}

/// Installs the session logger as the global `log` backend.
pub fn init(logger: SessionLogger, level: LevelFilter) {
    match log::set_boxed_logger(Box::new(logger)) {
        Ok(()) => log::set_max_level(level),
        Err(e) => eprintln!("logger already installed: {e}"),
    }
}

async fn writer_task(file: tokio::fs::File, mut rx: mpsc::UnboundedReceiver<String>) {
    use tokio::io::AsyncWriteExt;
    let mut writer = tokio::io::BufWriter::new(file);

    while let Some(line) = rx.recv().await {
        let _ = writer.write_all(line.as_bytes()).await;
        // Flush every line so the file can be tailed live.
        let _ = writer.flush().await;
    }

    let footer = format!("\n=== Session ended, {} ===\n", timestamp());
    let _ = writer.write_all(footer.as_bytes()).await;
    let _ = writer.flush().await;
}

fn timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Keeps only the newest `session-*.log` files.
async fn cleanup_old_sessions(logs_dir: &Path) {
    let mut entries = match tokio::fs::read_dir(logs_dir).await {
        Ok(rd) => rd,
        Err(_) => return,
    };

    let mut sessions: Vec<PathBuf> = Vec::new();
    while let Ok(Some(entry)) = entries.next_entry().await {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with("session-") && name.ends_with(".log") {
            sessions.push(entry.path());
        }
    }

    // Unix timestamps of equal width sort chronologically.
    sessions.sort();
    let excess = sessions.len().saturating_sub(MAX_SESSIONS);
    for old in &sessions[..excess] {
        let _ = tokio::fs::remove_file(old).await;
    }
}
