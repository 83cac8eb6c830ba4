//! Reactions to an expired session.
//!
//! The interceptor signals expiry through a [`Navigator`]; which one is used
//! is the caller's choice. [`BrowserNavigator`] remembers where the user was
//! and performs a full navigation. [`InjectedRouterNavigator`] hands the
//! login path to an application router and touches no storage.

use std::sync::{Arc, RwLock};

use tracing::info;

use crate::store::RedirectMemory;

/// Reacts to a 401 from an authenticated call.
pub trait Navigator: Send + Sync {
    /// Called once per 401, with the login entry point to go to.
    fn on_auth_expired(&self, login_page: &str);
}

/// The client's current location.
pub trait Location: Send + Sync {
    /// Path, query and fragment of the current location.
    fn current(&self) -> String;

    /// Navigates to `href`.
    fn assign(&self, href: &str);
}

/// Application-level router used instead of full navigations.
pub trait Router: Send + Sync {
    fn push(&self, path: &str);
}

impl<N: Navigator + ?Sized> Navigator for Arc<N> {
    fn on_auth_expired(&self, login_page: &str) {
        (**self).on_auth_expired(login_page)
    }
}

/// Remembers the current location, then navigates to the login page.
#[derive(Clone)]
pub struct BrowserNavigator {
    location: Arc<dyn Location>,
    memory: RedirectMemory,
}

impl BrowserNavigator {
    pub fn new(location: Arc<dyn Location>, memory: RedirectMemory) -> Self {
        Self { location, memory }
    }
}

impl Navigator for BrowserNavigator {
    fn on_auth_expired(&self, login_page: &str) {
        // The write must land before navigation tears the page down.
        let current = self.location.current();
        self.memory.remember(&current);
        info!(login_page, "Session expired, navigating to login");
        self.location.assign(login_page);
    }
}

impl std::fmt::Debug for BrowserNavigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserNavigator")
            .field("memory", &self.memory)
            .finish_non_exhaustive()
    }
}

/// Delegates the login navigation to a [`Router`].
#[derive(Clone)]
pub struct InjectedRouterNavigator {
    router: Arc<dyn Router>,
}

impl InjectedRouterNavigator {
    pub fn new(router: Arc<dyn Router>) -> Self {
        Self { router }
    }
}

impl Navigator for InjectedRouterNavigator {
    fn on_auth_expired(&self, login_page: &str) {
        info!(login_page, "Session expired, routing to login");
        self.router.push(login_page);
    }
}

impl std::fmt::Debug for InjectedRouterNavigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InjectedRouterNavigator").finish_non_exhaustive()
    }
}

/// A [`Location`] held in memory, recording every navigation.
///
/// Used where there is no real browser: server-side rendering, native
/// shells and tests.
#[derive(Debug, Default)]
pub struct MemoryLocation {
    href: RwLock<String>,
    history: RwLock<Vec<String>>,
}

impl MemoryLocation {
    pub fn new(href: &str) -> Self {
        Self {
            href: RwLock::new(href.to_string()),
            history: RwLock::new(Vec::new()),
        }
    }

    /// Every `assign` so far, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Location for MemoryLocation {
    fn current(&self) -> String {
        self.href.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn assign(&self, href: &str) {
        *self.href.write().unwrap_or_else(|e| e.into_inner()) = href.to_string();
        self.history
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(href.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::{LOGIN_PAGE, REDIRECT_MEMORY_KEY};
    use crate::store::{KeyValueStore, MemoryStore};
    use std::sync::Mutex;

    /// Location that checks the store at navigation time.
    struct StoreCheckingLocation {
        href: String,
        store: Arc<MemoryStore>,
        seen_at_assign: Mutex<Option<Option<String>>>,
    }

    impl Location for StoreCheckingLocation {
        fn current(&self) -> String {
            self.href.clone()
        }

        fn assign(&self, _href: &str) {
            *self.seen_at_assign.lock().unwrap() = Some(self.store.get(REDIRECT_MEMORY_KEY));
        }
    }

    #[derive(Default)]
    struct RecordingRouter {
        pushed: Mutex<Vec<String>>,
    }

    impl Router for RecordingRouter {
        fn push(&self, path: &str) {
            self.pushed.lock().unwrap().push(path.to_string());
        }
    }

    #[test]
    fn test_browser_navigator_remembers_then_navigates() {
        let store = Arc::new(MemoryStore::new());
        let location = Arc::new(MemoryLocation::new("/trade/positions?x=1#open"));
        let navigator = BrowserNavigator::new(location.clone(), RedirectMemory::new(store.clone()));

        navigator.on_auth_expired(LOGIN_PAGE);

        assert_eq!(
            store.get(REDIRECT_MEMORY_KEY).as_deref(),
            Some("/trade/positions?x=1#open")
        );
        assert_eq!(location.current(), LOGIN_PAGE);
        assert_eq!(location.history(), vec![LOGIN_PAGE.to_string()]);
    }

    #[test]
    fn test_browser_navigator_writes_before_navigating() {
        let store = Arc::new(MemoryStore::new());
        let location = Arc::new(StoreCheckingLocation {
            href: "/orders?page=2".to_string(),
            store: store.clone(),
            seen_at_assign: Mutex::new(None),
        });
        let navigator = BrowserNavigator::new(location.clone(), RedirectMemory::new(store));

        navigator.on_auth_expired(LOGIN_PAGE);

        let seen = location.seen_at_assign.lock().unwrap().clone();
        assert_eq!(seen, Some(Some("/orders?page=2".to_string())));
    }

    #[test]
    fn test_router_navigator_touches_no_storage() {
        let router = Arc::new(RecordingRouter::default());
        let navigator = InjectedRouterNavigator::new(router.clone());

        navigator.on_auth_expired("/signin");
        navigator.on_auth_expired("/signin");

        assert_eq!(*router.pushed.lock().unwrap(), vec!["/signin", "/signin"]);
    }

    #[test]
    fn test_navigator_through_arc() {
        let router = Arc::new(RecordingRouter::default());
        let navigator: Arc<dyn Navigator> = Arc::new(InjectedRouterNavigator::new(router.clone()));
        navigator.on_auth_expired(LOGIN_PAGE);
        assert_eq!(router.pushed.lock().unwrap().len(), 1);
    }
}
