use hatbox_core::recognizer::{Status, StatusUi};
use std::sync::Mutex;

/// Reports status changes in the log. Stands in for the kit's button LED.
#[derive(Default)]
pub struct LogStatusUi {
    last: Mutex<Option<Status>>,
}

impl LogStatusUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<Status> {
        self.last.lock().ok().and_then(|last| *last)
    }
}

impl StatusUi for LogStatusUi {
    fn status(&self, status: Status) {
        match self.last.lock() {
            Ok(mut last) => {
                if *last == Some(status) {
                    return;
                }
                *last = Some(status);
            }
            Err(_) => tracing::error!("status lock poisoned"),
        }
        tracing::info!(%status, "status");
    }
}
