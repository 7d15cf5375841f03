//! Path-based browser backend: the routed location is the host's
//! path + query + fragment, entries are written with `pushState` /
//! `replaceState` semantics, and external back/forward arrives as the host's
//! state-change event, routed through the block-aware notifier.

use std::rc::Rc;

use crate::guard::{GuardTarget, NavigationGuard};
use crate::host::{scroll_to_fragment, Host, HostEvent};
use crate::integration::depth::DepthTracker;
use crate::integration::notifier::BlockingNotifier;
use crate::integration::{create_integration, Integration, IntegrationUtils, Notifier, Teardown};
use crate::location::LocationChange;

/// Build the path-based integration over `host`, consulting `guard` for
/// externally-initiated jumps.
pub fn path_integration(host: Rc<dyn Host>, guard: Rc<dyn NavigationGuard>) -> Integration {
    let tracker = Rc::new(DepthTracker::new(host.clone()));
    // Stamp the entry we started on, so the very first external jump away
    // from it already has a depth to diff against.
    tracker.save_current_depth();
    let notifier = Rc::new(BlockingNotifier::new(host.clone(), tracker.clone()));

    let get = {
        let host = host.clone();
        move || LocationChange {
            value: host.path_query_fragment(),
            state: host.entry_state(),
            ..Default::default()
        }
    };

    let set = {
        let host = host.clone();
        let tracker = tracker.clone();
        move |change: &LocationChange| {
            if change.replace {
                host.replace_entry(&change.value, tracker.keep_depth(change.state.clone()));
            } else {
                host.push_entry(&change.value, change.state.clone());
            }
            // Always try the fragment; fall back to top only when scroll was
            // requested.
            scroll_to_fragment(&*host, &host.fragment(), change.scroll);
            tracker.save_current_depth();
        }
    };

    let init = {
        let host = host.clone();
        let guard = guard.clone();
        Box::new(move |external: Notifier| -> Teardown {
            let handler_host = host.clone();
            let handler = Rc::new(move || {
                notifier.handle_external_change(
                    || external.notify(None),
                    |delta| {
                        if delta < 0 {
                            !guard.confirm(GuardTarget::Steps(delta))
                        } else {
                            let value = handler_host.path_query_fragment();
                            let state = handler_host.entry_state();
                            !guard.confirm(GuardTarget::Destination {
                                value: &value,
                                state: state.as_ref(),
                            })
                        }
                    },
                );
            });
            let subscription = host.subscribe(HostEvent::StateChange, handler);
            Box::new(move || subscription.unsubscribe())
        }) as Box<dyn FnOnce(Notifier) -> Teardown>
    };

    let utils = IntegrationUtils {
        go: {
            let host = host.clone();
            Rc::new(move |delta| host.go(delta))
        },
        guard: Some(guard),
        ..Default::default()
    };

    create_integration(get, set, Some(init), utils)
}
