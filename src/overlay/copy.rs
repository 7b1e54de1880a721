//! Copy-link button state.
//!
//! The clipboard write runs on a worker thread; the UI polls the result once
//! per frame. The indicator only drives the button affordance, so failures
//! fall straight back to `Idle`.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct ClipboardError {
    pub message: String,
}

impl std::fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "clipboard write failed: {}", self.message)
    }
}

impl std::error::Error for ClipboardError {}

pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// OS clipboard.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard = arboard::Clipboard::new().map_err(|e| ClipboardError {
            message: e.to_string(),
        })?;
        clipboard.set_text(text).map_err(|e| ClipboardError {
            message: e.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyState {
    Idle,
    Loading,
    Success,
}

pub struct CopyIndicator {
    state: CopyState,
    pending: Option<Receiver<Result<(), ClipboardError>>>,
    success_at: Option<Instant>,
    feedback: Duration,
}

impl CopyIndicator {
    pub fn new(feedback: Duration) -> Self {
        Self {
            state: CopyState::Idle,
            pending: None,
            success_at: None,
            feedback,
        }
    }

    pub fn state(&self) -> CopyState {
        self.state
    }

    /// The button is disabled while a write is in flight.
    pub fn is_enabled(&self) -> bool {
        self.state != CopyState::Loading
    }

    /// Start copying `text`. Returns `false` if a copy is already running.
    pub fn start(&mut self, text: String, clipboard: Arc<dyn Clipboard>) -> bool {
        if self.state == CopyState::Loading {
            return false;
        }
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let _ = tx.send(clipboard.write_text(&text));
        });
        self.pending = Some(rx);
        self.success_at = None;
        self.state = CopyState::Loading;
        true
    }

    /// Advance the indicator. Call once per frame.
    pub fn poll(&mut self, now: Instant) {
        if let Some(rx) = &self.pending {
            match rx.try_recv() {
                Ok(Ok(())) => {
                    self.pending = None;
                    self.state = CopyState::Success;
                    self.success_at = Some(now);
                }
                Ok(Err(e)) => {
                    log::debug!("{}", e);
                    self.pending = None;
                    self.state = CopyState::Idle;
                }
                Err(TryRecvError::Disconnected) => {
                    self.pending = None;
                    self.state = CopyState::Idle;
                }
                Err(TryRecvError::Empty) => {}
            }
        }

        if let Some(at) = self.success_at {
            if now.saturating_duration_since(at) >= self.feedback {
                self.success_at = None;
                self.state = CopyState::Idle;
            }
        }
    }

    /// Remaining time before a success indicator reverts, for repaint scheduling.
    pub fn revert_in(&self, now: Instant) -> Option<Duration> {
        self.success_at
            .map(|at| self.feedback.saturating_sub(now.saturating_duration_since(at)))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Clipboard double that records writes or always fails.
    #[derive(Default)]
    pub(crate) struct FakeClipboard {
        pub fail: bool,
        pub written: Mutex<Vec<String>>,
    }

    impl Clipboard for FakeClipboard {
        fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
            if self.fail {
                return Err(ClipboardError {
                    message: "denied".into(),
                });
            }
            self.written.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    pub(crate) fn settle(indicator: &mut CopyIndicator) -> Instant {
        for _ in 0..400 {
            let now = Instant::now();
            indicator.poll(now);
            if indicator.state() != CopyState::Loading {
                return now;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        panic!("clipboard write never settled");
    }

    #[test]
    fn success_reverts_after_feedback_delay() {
        let clipboard = Arc::new(FakeClipboard::default());
        let mut copy = CopyIndicator::new(Duration::from_secs(1));
        assert!(copy.start("https://b.test/x".into(), clipboard.clone()));
        assert_eq!(copy.state(), CopyState::Loading);
        assert!(!copy.is_enabled());

        let settled_at = settle(&mut copy);
        assert_eq!(copy.state(), CopyState::Success);
        assert_eq!(*clipboard.written.lock().unwrap(), vec!["https://b.test/x"]);

        copy.poll(settled_at + Duration::from_millis(500));
        assert_eq!(copy.state(), CopyState::Success);
        copy.poll(settled_at + Duration::from_millis(1000));
        assert_eq!(copy.state(), CopyState::Idle);
    }

    #[test]
    fn failure_goes_straight_to_idle() {
        let clipboard = Arc::new(FakeClipboard {
            fail: true,
            ..Default::default()
        });
        let mut copy = CopyIndicator::new(Duration::from_secs(1));
        copy.start("x".into(), clipboard);
        settle(&mut copy);
        assert_eq!(copy.state(), CopyState::Idle);
        assert_eq!(copy.revert_in(Instant::now()), None);
    }

    #[test]
    fn overlapping_requests_rejected_while_loading() {
        let mut copy = CopyIndicator::new(Duration::from_secs(1));
        // Never polled, so the first request stays in flight
        assert!(copy.start("a".into(), Arc::new(FakeClipboard::default())));
        assert!(!copy.start("b".into(), Arc::new(FakeClipboard::default())));
    }
}
