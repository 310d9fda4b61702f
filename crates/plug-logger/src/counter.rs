//! Counting layer for warning and error diagnostics
//!
//! Discovery never returns failures to its caller; the only way to observe
//! how many manifests or records were rejected is to count what was logged.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

#[derive(Debug, Default)]
struct Counts {
    warnings: AtomicUsize,
    errors: AtomicUsize,
}

/// Snapshot of the number of diagnostics seen so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiagnosticCounts {
    pub warnings: usize,
    pub errors: usize,
}

impl DiagnosticCounts {
    pub fn is_clean(&self) -> bool {
        self.warnings == 0 && self.errors == 0
    }
}

/// `tracing` layer that counts WARN and ERROR events.
///
/// Clones share the same counters.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCounter {
    counts: Arc<Counts>,
}

impl DiagnosticCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> DiagnosticCounts {
        DiagnosticCounts {
            warnings: self.counts.warnings.load(Ordering::Relaxed),
            errors: self.counts.errors.load(Ordering::Relaxed),
        }
    }
}

impl<S: Subscriber> Layer<S> for DiagnosticCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        match *event.metadata().level() {
            Level::ERROR => {
                self.counts.errors.fetch_add(1, Ordering::Relaxed);
            }
            Level::WARN => {
                self.counts.warnings.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;

    #[test]
    fn test_counts_warnings_and_errors() {
        let counter = DiagnosticCounter::new();
        let subscriber = tracing_subscriber::registry().with(counter.clone());

        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!("not counted");
            tracing::warn!("first warning");
            tracing::warn!("second warning");
            tracing::error!("an error");
        });

        assert_eq!(
            counter.snapshot(),
            DiagnosticCounts {
                warnings: 2,
                errors: 1
            }
        );
        assert!(!counter.snapshot().is_clean());
    }
}
