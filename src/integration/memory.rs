//! Memory backend: composes [`MemoryHistory`] directly through the
//! integration wrapper. The stack is fully under this process's control, so
//! there is nothing to depth-track and nothing external to block.

use std::rc::Rc;

use crate::history::memory::MemoryHistory;
use crate::integration::{create_integration, Integration, IntegrationUtils, Notifier, Teardown};
use crate::location::LocationChange;

/// Build an integration over `history`. The caller keeps its own handle
/// (`MemoryHistory` is a cheap clone) and can drive `back`/`forward` on it to
/// play the role of the user.
pub fn memory_integration(history: &MemoryHistory) -> Integration {
    let get = {
        let history = history.clone();
        move || history.get()
    };

    let set = {
        let history = history.clone();
        move |change: &LocationChange| history.set(change)
    };

    let init = {
        let history = history.clone();
        Box::new(move |external: Notifier| -> Teardown {
            let subscription = history.listen(move |value| external.notify(Some(value.into())));
            Box::new(move || subscription.unsubscribe())
        }) as Box<dyn FnOnce(Notifier) -> Teardown>
    };

    let utils = IntegrationUtils {
        go: {
            let history = history.clone();
            Rc::new(move |delta| history.go(delta))
        },
        ..Default::default()
    };

    create_integration(get, set, Some(init), utils)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_navigate_flows_into_the_stack() {
        let history = MemoryHistory::new();
        let integration = memory_integration(&history);

        integration.navigate("/a");
        integration.navigate("/b");
        assert_eq!(history.entries(), vec!["/", "/a", "/b"]);
        assert_eq!(integration.location().value, "/b");
    }

    #[test]
    fn test_external_go_publishes_through_the_channel() {
        let history = MemoryHistory::new();
        let integration = memory_integration(&history);
        integration.navigate("/a");

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let _sub = integration.subscribe(move |change| sink.borrow_mut().push(change.value.clone()));

        history.back();
        assert_eq!(*seen.borrow(), vec!["/"]);
        assert_eq!(integration.location().value, "/");
    }

    #[test]
    fn test_utils_go_traverses_the_stack() {
        let history = MemoryHistory::new();
        let integration = memory_integration(&history);
        integration.navigate("/a");

        (integration.utils.go)(-1);
        assert_eq!(integration.location().value, "/");
        (integration.utils.go)(1);
        assert_eq!(integration.location().value, "/a");
    }

    #[test]
    fn test_dispose_stops_external_updates() {
        let history = MemoryHistory::new();
        let integration = memory_integration(&history);
        integration.navigate("/a");

        integration.dispose();
        history.back();
        assert_eq!(integration.location().value, "/a");
    }
}
