use std::sync::Mutex;

/// Transient user notification emitted by board workflows.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Notice::Success(message.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice::Error(message.into())
    }

    pub fn message(&self) -> &str {
        match self {
            Notice::Success(m) | Notice::Error(m) => m,
        }
    }
}

/// Notification sink injected into the controller; hosts decide how to
/// surface notices (toast, terminal line, test buffer).
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Collects notices for later draining. Used by the CLI and by tests.
#[derive(Default)]
pub struct BufferedNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl BufferedNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock().expect("notice buffer poisoned"))
    }

    pub fn snapshot(&self) -> Vec<Notice> {
        self.notices.lock().expect("notice buffer poisoned").clone()
    }
}

impl Notifier for BufferedNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().expect("notice buffer poisoned").push(notice);
    }
}
