use serde::Serialize;
use std::sync::Arc;
use tauri::{AppHandle, Wry};
use tauri_plugin_dialog::{DialogExt, MessageDialogButtons, MessageDialogKind};

use crate::error::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A message meant for the person at the keyboard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_level(NoticeLevel::Info, title, message)
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_level(NoticeLevel::Warning, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_level(NoticeLevel::Error, title, message)
    }

    fn with_level(level: NoticeLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Port for user-facing dialogs. Roster logic talks to this instead of
/// reaching for a window, so it can run headless in tests.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);

    /// Asks a yes/no question. Blocks until answered; call off the main thread.
    fn confirm(&self, title: &str, message: &str) -> bool;
}

/// Managed Tauri state holding the app-wide notifier.
#[derive(Clone)]
pub struct NotifierState(pub Arc<dyn Notifier>);

/// Native dialogs via the Tauri dialog plugin.
pub struct DialogNotifier {
    app: AppHandle<Wry>,
}

impl DialogNotifier {
    pub fn new(app: AppHandle<Wry>) -> Self {
        Self { app }
    }
}

impl Notifier for DialogNotifier {
    fn notify(&self, notice: Notice) {
        let kind = match notice.level {
            NoticeLevel::Info => MessageDialogKind::Info,
            NoticeLevel::Warning => MessageDialogKind::Warning,
            NoticeLevel::Error => MessageDialogKind::Error,
        };
        self.app
            .dialog()
            .message(notice.message)
            .title(notice.title)
            .kind(kind)
            .show(|_| {});
    }

    fn confirm(&self, title: &str, message: &str) -> bool {
        self.app
            .dialog()
            .message(message)
            .title(title)
            .kind(MessageDialogKind::Warning)
            .buttons(MessageDialogButtons::OkCancel)
            .blocking_show()
    }
}

/// Shows an error dialog when `result` failed, then hands the result back.
pub fn surface<T>(notifier: &dyn Notifier, title: &str, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        log::warn!("{title}: {e}");
        notifier.notify(Notice::error(title, e.to_string()));
    }
    result
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Collects notices and answers confirmations with a fixed reply.
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub notices: Mutex<Vec<Notice>>,
        pub answer: bool,
    }

    impl RecordingNotifier {
        pub fn taken(&self) -> Vec<Notice> {
            std::mem::take(&mut *self.notices.lock().unwrap())
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notice: Notice) {
            self.notices.lock().unwrap().push(notice);
        }

        fn confirm(&self, _title: &str, _message: &str) -> bool {
            self.answer
        }
    }
}
