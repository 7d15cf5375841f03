//! End-to-end scenarios over a simulated browser host: programmatic
//! navigation, externally-initiated back/forward, guard-based blocking with
//! corrective reversal, and fragment scrolling.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use backtrail::{
    hash_integration, path_integration, AllowAll, GuardTarget, Host, Integration, LocationChange,
    NavigationGuard, ScrollEvent, SimulatedHost,
};
use serde_json::json;
use simplelog::{Config, LevelFilter, SimpleLogger};

// ============================================================================
// Helpers
// ============================================================================

fn init_logging() {
    let _ = SimpleLogger::init(LevelFilter::Debug, Config::default());
}

/// Guard that records every confirmation request and answers with a fixed
/// verdict that tests can flip mid-scenario.
struct RecordingGuard {
    allow: Cell<bool>,
    seen: RefCell<Vec<String>>,
}

impl RecordingGuard {
    fn allowing(allow: bool) -> Rc<Self> {
        Rc::new(RecordingGuard {
            allow: Cell::new(allow),
            seen: RefCell::new(Vec::new()),
        })
    }
}

impl NavigationGuard for RecordingGuard {
    fn confirm(&self, target: GuardTarget<'_>) -> bool {
        let label = match target {
            GuardTarget::Steps(delta) => format!("steps:{delta}"),
            GuardTarget::Destination { value, .. } => format!("dest:{value}"),
        };
        self.seen.borrow_mut().push(label);
        self.allow.get()
    }
}

/// Collect every published location value into a vector.
fn record_published(integration: &Integration) -> Rc<RefCell<Vec<String>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let _ = integration.subscribe(move |change| sink.borrow_mut().push(change.value.clone()));
    seen
}

// ============================================================================
// Path Integration
// ============================================================================

#[test]
fn test_path_navigation_pushes_and_publishes() {
    init_logging();
    let host = SimulatedHost::new("/");
    let integration = path_integration(Rc::new(host.clone()), Rc::new(AllowAll));
    let published = record_published(&integration);

    integration.navigate("/inbox");
    integration.navigate("/inbox/7?tab=raw");

    assert_eq!(host.url(), "/inbox/7?tab=raw");
    assert_eq!(host.history_length(), 3);
    assert_eq!(*published.borrow(), vec!["/inbox", "/inbox/7?tab=raw"]);
}

#[test]
fn test_blocked_back_leaves_route_unchanged_with_zero_notifications() {
    init_logging();
    let host = SimulatedHost::new("/");
    let guard = RecordingGuard::allowing(false);
    let integration = path_integration(Rc::new(host.clone()), guard.clone());

    integration.navigate("/editor");
    let published = record_published(&integration);

    // User presses the back button.
    host.back();

    assert_eq!(host.url(), "/editor");
    assert_eq!(integration.location().value, "/editor");
    assert!(published.borrow().is_empty());
    assert_eq!(*guard.seen.borrow(), vec!["steps:-1"]);
}

#[test]
fn test_allowed_back_publishes_the_previous_route() {
    let host = SimulatedHost::new("/");
    let integration = path_integration(Rc::new(host.clone()), Rc::new(AllowAll));
    integration.navigate("/a");
    let published = record_published(&integration);

    host.back();

    assert_eq!(host.url(), "/");
    assert_eq!(*published.borrow(), vec!["/"]);
}

#[test]
fn test_forward_jump_is_confirmed_by_destination() {
    let host = SimulatedHost::new("/");
    let guard = RecordingGuard::allowing(true);
    let integration = path_integration(Rc::new(host.clone()), guard.clone());
    integration.navigate("/a");

    host.back();
    guard.allow.set(false);
    host.forward();

    // The forward attempt was confirmed by destination and reversed.
    assert_eq!(host.url(), "/");
    assert_eq!(integration.location().value, "/");
    assert_eq!(*guard.seen.borrow(), vec!["steps:-1", "dest:/a"]);
}

#[test]
fn test_multi_step_external_jump_reversed_in_one_correction() {
    let host = SimulatedHost::new("/");
    let guard = RecordingGuard::allowing(false);
    let integration = path_integration(Rc::new(host.clone()), guard.clone());

    for route in ["/a", "/b", "/c"] {
        integration.navigate(route);
    }
    let published = record_published(&integration);

    host.go(-3);

    assert_eq!(host.url(), "/c");
    assert!(published.borrow().is_empty());
    // One confirmation for the jump; its echo was swallowed, not re-asked.
    assert_eq!(*guard.seen.borrow(), vec!["steps:-3"]);
}

#[test]
fn test_replace_carries_depth_so_blocking_still_works() {
    let host = SimulatedHost::new("/");
    let guard = RecordingGuard::allowing(false);
    let integration = path_integration(Rc::new(host.clone()), guard.clone());

    integration.navigate("/draft");
    integration.navigate(LocationChange {
        value: "/draft/saved".into(),
        replace: true,
        ..Default::default()
    });
    assert_eq!(host.history_length(), 2);

    host.back();
    assert_eq!(host.url(), "/draft/saved");
    assert_eq!(*guard.seen.borrow(), vec!["steps:-1"]);
}

#[test]
fn test_application_state_survives_alongside_depth_marker() {
    let host = SimulatedHost::new("/");
    let integration = path_integration(Rc::new(host.clone()), Rc::new(AllowAll));

    integration.navigate(LocationChange {
        value: "/form".into(),
        state: Some(json!({ "draft": "unsent" })),
        replace: true,
        ..Default::default()
    });

    let state = host.entry_state().unwrap();
    assert_eq!(state["draft"], "unsent");
    assert!(state["_depth"].is_i64());
}

#[test]
fn test_fragment_scrolling_with_top_fallback() {
    let host = SimulatedHost::new("/");
    host.add_element("team");
    let integration = path_integration(Rc::new(host.clone()), Rc::new(AllowAll));

    integration.navigate(LocationChange {
        value: "/about#team".into(),
        scroll: true,
        ..Default::default()
    });
    integration.navigate(LocationChange {
        value: "/about#no-such-anchor".into(),
        scroll: true,
        ..Default::default()
    });
    integration.navigate("/plain"); // no scroll requested, no fragment

    assert_eq!(
        host.scroll_events(),
        vec![ScrollEvent::Element("team".into()), ScrollEvent::Top]
    );
}

#[test]
fn test_dispose_unhooks_the_external_change_source() {
    let host = SimulatedHost::new("/");
    let integration = path_integration(Rc::new(host.clone()), Rc::new(AllowAll));
    integration.navigate("/a");
    let published = record_published(&integration);

    integration.dispose();
    host.back();

    // The host moved, but nothing observed it.
    assert_eq!(host.url(), "/");
    assert_eq!(integration.location().value, "/a");
    assert!(published.borrow().is_empty());
}

// ============================================================================
// Hash Integration
// ============================================================================

#[test]
fn test_hash_navigation_routes_through_the_fragment() {
    let host = SimulatedHost::new("/");
    let integration = hash_integration(Rc::new(host.clone()), Rc::new(AllowAll));
    let published = record_published(&integration);

    integration.navigate("/inbox");

    assert_eq!(host.url(), "/#/inbox");
    assert_eq!(integration.location().value, "/inbox");
    assert_eq!(*published.borrow(), vec!["/inbox"]);
}

#[test]
fn test_hash_blocked_back_is_reversed() {
    let host = SimulatedHost::new("/");
    let guard = RecordingGuard::allowing(false);
    let integration = hash_integration(Rc::new(host.clone()), guard.clone());

    integration.navigate("/settings");
    let published = record_published(&integration);

    host.back();

    assert_eq!(host.url(), "/#/settings");
    assert_eq!(integration.location().value, "/settings");
    assert!(published.borrow().is_empty());
    assert_eq!(*guard.seen.borrow(), vec!["steps:-1"]);
}

#[test]
fn test_hash_utils_parse_and_render() {
    let host = SimulatedHost::new("/");
    let integration = hash_integration(Rc::new(host.clone()), Rc::new(AllowAll));
    integration.navigate("/baz");

    let parse = integration.utils.parse_path.as_ref().unwrap();
    assert_eq!(parse("foo"), "/baz#foo");
    assert_eq!(parse("/foo"), "/foo");

    let render = integration.utils.render_path.as_ref().unwrap();
    assert_eq!(render("/foo"), "#/foo");
}

#[test]
fn test_hash_nested_anchor_scrolls_within_route() {
    let host = SimulatedHost::new("/");
    host.add_element("figures");
    let integration = hash_integration(Rc::new(host.clone()), Rc::new(AllowAll));

    integration.navigate(LocationChange {
        value: "/article#figures".into(),
        scroll: true,
        ..Default::default()
    });

    assert_eq!(host.url(), "/#/article#figures");
    assert_eq!(
        host.scroll_events(),
        vec![ScrollEvent::Element("figures".into())]
    );
}

// ============================================================================
// Channel Semantics
// ============================================================================

#[test]
fn test_subscriber_may_redirect_on_publish() {
    let host = SimulatedHost::new("/");
    let integration = Rc::new(path_integration(Rc::new(host.clone()), Rc::new(AllowAll)));

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let redirecting = integration.clone();
    let _sub = integration.subscribe(move |change| {
        sink.borrow_mut().push(change.value.clone());
        // An auth wall bouncing a protected route to the login page.
        if change.value == "/private" {
            redirecting.navigate("/login");
        }
    });

    integration.navigate("/private");

    assert_eq!(*seen.borrow(), vec!["/private", "/login"]);
    assert_eq!(integration.location().value, "/login");
    assert_eq!(host.url(), "/login");
}

#[test]
fn test_state_only_rewrite_is_silent_downstream() {
    let host = SimulatedHost::new("/");
    let integration = path_integration(Rc::new(host.clone()), Rc::new(AllowAll));
    integration.navigate("/page");
    let published = record_published(&integration);

    integration.navigate(LocationChange {
        value: "/page".into(),
        state: Some(json!({ "scroll_y": 300 })),
        replace: true,
        ..Default::default()
    });

    // The backend write happened, the channel stayed quiet.
    assert_eq!(host.entry_state().unwrap()["scroll_y"], 300);
    assert!(published.borrow().is_empty());
}
