//! Hash-based browser backend: the routed location lives in the fragment
//! after `#`, so it works without any server-side routing. Supports nested
//! `path#anchor` composition inside the fragment, and disambiguates in-page
//! anchors from routed paths in [`parse_path`].
//!
//! [`parse_path`]: crate::integration::IntegrationUtils::parse_path

use std::rc::Rc;

use crate::guard::{GuardTarget, NavigationGuard};
use crate::host::{scroll_to_fragment, Host, HostEvent};
use crate::integration::depth::DepthTracker;
use crate::integration::notifier::BlockingNotifier;
use crate::integration::{create_integration, Integration, IntegrationUtils, Notifier, Teardown};
use crate::location::LocationChange;

/// Build the hash-based integration over `host`, consulting `guard` for
/// externally-initiated jumps.
pub fn hash_integration(host: Rc<dyn Host>, guard: Rc<dyn NavigationGuard>) -> Integration {
    let tracker = Rc::new(DepthTracker::new(host.clone()));
    tracker.save_current_depth();
    let notifier = Rc::new(BlockingNotifier::new(host.clone(), tracker.clone()));

    let get = {
        let host = host.clone();
        move || host.fragment()
    };

    let set = {
        let host = host.clone();
        let tracker = tracker.clone();
        move |change: &LocationChange| {
            if change.replace {
                host.replace_entry(
                    &format!("#{}", change.value),
                    tracker.keep_depth(change.state.clone()),
                );
            } else {
                host.set_fragment(&change.value);
            }
            // A second `#` inside the routed value is an in-page anchor:
            // `/article#figures` scrolls to `figures`.
            let anchor = change
                .value
                .split_once('#')
                .map(|(_, after)| after)
                .unwrap_or("");
            scroll_to_fragment(&*host, anchor, change.scroll);
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
                            let value = handler_host.fragment();
                            !guard.confirm(GuardTarget::Destination {
                                value: &value,
                                state: None,
                            })
                        }
                    },
                );
            });
            let subscription = host.subscribe(HostEvent::FragmentChange, handler);
            Box::new(move || subscription.unsubscribe())
        }) as Box<dyn FnOnce(Notifier) -> Teardown>
    };

    let utils = IntegrationUtils {
        go: {
            let host = host.clone();
            Rc::new(move |delta| host.go(delta))
        },
        render_path: Some(Rc::new(|path| format!("#{path}"))),
        parse_path: Some({
            let host = host.clone();
            Rc::new(move |raw| parse_hash_path(&*host, raw))
        }),
        guard: Some(guard),
    };

    create_integration(get, set, Some(init), utils)
}

/// Normalize an externally supplied target into a routed path.
///
/// Anything up to and including the first `#` is dropped, so both `#/foo`
/// and a full `https://…#/foo` reduce to `/foo`. A remainder that does not
/// start with `/` is an in-page anchor: it is appended to the current route
/// path (the fragment's leading section, `/` when absent), producing
/// `current_path#anchor`.
fn parse_hash_path(host: &dyn Host, raw: &str) -> String {
    let target = raw.split_once('#').map(|(_, after)| after).unwrap_or(raw);
    if target.starts_with('/') {
        return target.to_string();
    }

    let fragment = host.fragment();
    let current = fragment.split('#').next().unwrap_or("");
    let current = if current.is_empty() { "/" } else { current };
    format!("{current}#{target}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::SimulatedHost;

    fn host_at_fragment(fragment: &str) -> SimulatedHost {
        let url = if fragment.is_empty() {
            "/".to_string()
        } else {
            format!("/#{fragment}")
        };
        SimulatedHost::new(url)
    }

    #[test]
    fn test_parse_path_keeps_routed_paths() {
        let host = host_at_fragment("/baz");
        assert_eq!(parse_hash_path(&host, "/foo"), "/foo");
        assert_eq!(parse_hash_path(&host, "#/foo"), "/foo");
    }

    #[test]
    fn test_parse_path_prefixes_anchor_with_current_route() {
        let host = host_at_fragment("/baz");
        assert_eq!(parse_hash_path(&host, "foo"), "/baz#foo");
        assert_eq!(parse_hash_path(&host, "#foo"), "/baz#foo");
    }

    #[test]
    fn test_parse_path_anchor_defaults_to_root_route() {
        let host = host_at_fragment("");
        assert_eq!(parse_hash_path(&host, "intro"), "/#intro");
    }

    #[test]
    fn test_parse_path_drops_existing_anchor_from_current_route() {
        let host = host_at_fragment("/docs#old");
        assert_eq!(parse_hash_path(&host, "new"), "/docs#new");
    }

    #[test]
    fn test_render_path_prefixes_hash() {
        let host: Rc<dyn Host> = Rc::new(SimulatedHost::new("/"));
        let integration = hash_integration(host, Rc::new(crate::guard::AllowAll));
        let render = integration.utils.render_path.as_ref().unwrap();
        assert_eq!(render("/settings"), "#/settings");
    }
}
