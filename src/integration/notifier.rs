//! # Block-Aware Notification
//!
//! The state machine reconciling externally triggered navigation with
//! application-level blocking. Given an external-change event it computes the
//! jump's signed delta via the [`DepthTracker`](super::depth::DepthTracker),
//! asks a caller-supplied predicate whether to reject it, and if so reverses
//! the jump programmatically while swallowing the one echo event that
//! correction produces.
//!
//! Known fragility, preserved from the original design: the echo tracking
//! assumes at most one external event is in flight between a corrective
//! reversal and its echo. A second gesture landing inside that window would
//! be mis-paired with the pending correction. Hosts are required to deliver
//! events serially and synchronously relative to `go`, which holds for
//! browsers and for [`crate::host::SimulatedHost`].

use std::cell::Cell;
use std::rc::Rc;

use log::debug;

use crate::host::Host;
use crate::integration::depth::DepthTracker;

/// Whether the next external-change event is a real navigation or the echo
/// of a corrective reversal this notifier issued itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EchoState {
    Idle,
    AwaitingCorrection,
}

/// Decides, per external-change event, whether to deliver or reverse it.
pub struct BlockingNotifier {
    host: Rc<dyn Host>,
    tracker: Rc<DepthTracker>,
    echo: Cell<EchoState>,
}

impl BlockingNotifier {
    pub fn new(host: Rc<dyn Host>, tracker: Rc<DepthTracker>) -> Self {
        BlockingNotifier {
            host,
            tracker,
            echo: Cell::new(EchoState::Idle),
        }
    }

    /// Run once per external-change event.
    ///
    /// `block(delta)` returning `true` rejects the jump: the notifier issues
    /// a reverse jump of the same magnitude and consumes the resulting echo
    /// instead of delivering it. `block` is only consulted for a known,
    /// non-zero delta. On anything else — including an unknown delta — the
    /// event is delivered through `notify`.
    pub fn handle_external_change(&self, notify: impl Fn(), block: impl Fn(i64) -> bool) {
        let previous = self.tracker.depth();
        self.tracker.save_current_depth();
        let delta = match (previous, self.tracker.depth()) {
            (Some(prev), Some(current)) => Some(current - prev),
            _ => None,
        };

        if self.echo.get() == EchoState::AwaitingCorrection {
            self.echo.set(EchoState::Idle);
            debug!("notifier: swallowed correction echo (delta {delta:?})");
            return;
        }

        match delta {
            Some(d) if d != 0 && block(d) => {
                debug!("notifier: external jump of {d} blocked, reversing");
                self.echo.set(EchoState::AwaitingCorrection);
                // Fires exactly one further external-change event, consumed
                // above as the echo.
                self.host.go(-d);
            }
            _ => notify(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostEvent, SimulatedHost};
    use std::cell::RefCell;

    /// Wire a notifier to the host's state-change event, recording every
    /// delivered notification and every delta offered to the blocker.
    struct Harness {
        host: SimulatedHost,
        tracker: Rc<DepthTracker>,
        delivered: Rc<Cell<u32>>,
        offered: Rc<RefCell<Vec<i64>>>,
    }

    impl Harness {
        /// Mimic the integrations' write path, which saves depth after every
        /// programmatic write.
        fn push_stamped(&self, url: &str) {
            self.host.push_entry(url, None);
            self.tracker.save_current_depth();
        }
    }

    fn wired(reject: impl Fn(i64) -> bool + 'static) -> Harness {
        let host = SimulatedHost::new("/");
        let shared_host: Rc<dyn Host> = Rc::new(host.clone());
        let tracker = Rc::new(DepthTracker::new(shared_host.clone()));
        tracker.save_current_depth();
        let notifier = Rc::new(BlockingNotifier::new(shared_host, tracker.clone()));

        let delivered = Rc::new(Cell::new(0u32));
        let offered = Rc::new(RefCell::new(Vec::new()));

        let count = delivered.clone();
        let deltas = offered.clone();
        let _ = host.subscribe(
            HostEvent::StateChange,
            Rc::new(move || {
                notifier.handle_external_change(
                    || count.set(count.get() + 1),
                    |delta| {
                        deltas.borrow_mut().push(delta);
                        reject(delta)
                    },
                );
            }),
        );

        Harness {
            host,
            tracker,
            delivered,
            offered,
        }
    }

    #[test]
    fn test_allowed_jump_is_delivered() {
        let harness = wired(|_| false);
        harness.push_stamped("/a");

        harness.host.back();
        assert_eq!(harness.delivered.get(), 1);
        assert_eq!(*harness.offered.borrow(), vec![-1]);
        assert_eq!(harness.host.url(), "/");
    }

    #[test]
    fn test_blocked_jump_reversed_and_echo_swallowed() {
        let harness = wired(|_| true);
        harness.push_stamped("/a");

        harness.host.back();

        // The reversal put us back, nothing was delivered, and the blocker
        // ran exactly once (the echo never reached it).
        assert_eq!(harness.host.url(), "/a");
        assert_eq!(harness.delivered.get(), 0);
        assert_eq!(*harness.offered.borrow(), vec![-1]);
    }

    #[test]
    fn test_multi_entry_jump_reversed_by_full_magnitude() {
        let harness = wired(|_| true);
        harness.push_stamped("/a");
        harness.push_stamped("/b");
        harness.push_stamped("/c");

        harness.host.go(-3);
        assert_eq!(harness.host.url(), "/c");
        assert_eq!(*harness.offered.borrow(), vec![-3]);
    }

    #[test]
    fn test_blocking_works_again_after_a_correction() {
        let harness = wired(|_| true);
        harness.push_stamped("/a");

        harness.host.back();
        harness.host.back();
        assert_eq!(harness.host.url(), "/a");
        assert_eq!(*harness.offered.borrow(), vec![-1, -1]);
        assert_eq!(harness.delivered.get(), 0);
    }

    #[test]
    fn test_unknown_delta_is_delivered_not_blocked() {
        // An entry stamped by someone else, with our own depth never saved:
        // the first observed event has no previous depth to compare against.
        let host = SimulatedHost::new("/");
        let shared_host: Rc<dyn Host> = Rc::new(host.clone());
        let tracker = Rc::new(DepthTracker::new(shared_host.clone()));
        let notifier = BlockingNotifier::new(shared_host, tracker);

        let delivered = Cell::new(0u32);
        notifier.handle_external_change(
            || delivered.set(delivered.get() + 1),
            |_| panic!("blocker must not run without a known delta"),
        );
        assert_eq!(delivered.get(), 1);
    }
}
