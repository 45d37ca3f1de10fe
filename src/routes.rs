//! Client-side routes and the authentication gate in front of them.

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::api::{RecordId, UnauthorizedHook};
use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
    Universities,
    UniversityNew,
    University(RecordId),
    Courses,
    CourseNew,
    Course(RecordId),
    Events,
    EventNew,
    Event(RecordId),
}

impl Route {
    /// Parses an application path. Anything unrecognised lands on the dashboard.
    pub fn parse(path: &str) -> Self {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            ["login"] => Route::Login,
            ["dashboard"] => Route::Dashboard,
            ["universities"] => Route::Universities,
            ["universities", "new"] => Route::UniversityNew,
            ["universities", id] => id.parse().map(Route::University).unwrap_or(Route::Dashboard),
            ["courses"] => Route::Courses,
            ["courses", "new"] => Route::CourseNew,
            ["courses", id] => id.parse().map(Route::Course).unwrap_or(Route::Dashboard),
            ["events"] => Route::Events,
            ["events", "new"] => Route::EventNew,
            ["events", id] => id.parse().map(Route::Event).unwrap_or(Route::Dashboard),
            _ => Route::Dashboard,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Universities => "/universities".to_string(),
            Route::UniversityNew => "/universities/new".to_string(),
            Route::University(id) => format!("/universities/{}", id),
            Route::Courses => "/courses".to_string(),
            Route::CourseNew => "/courses/new".to_string(),
            Route::Course(id) => format!("/courses/{}", id),
            Route::Events => "/events".to_string(),
            Route::EventNew => "/events/new".to_string(),
            Route::Event(id) => format!("/events/{}", id),
        }
    }

    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login)
    }

    /// Where a request for this route actually lands given the session.
    pub fn guard(self, session: &SessionStore) -> Route {
        if self.is_protected() && !session.is_authenticated() {
            Route::Login
        } else {
            self
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Tracks the current route. Shared with the API client so an expired
/// session can send the user back to login from anywhere.
#[derive(Debug)]
pub struct Navigator {
    current: Mutex<Route>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::Dashboard)
    }
}

impl Navigator {
    pub fn new(start: Route) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    pub fn current(&self) -> Route {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Navigates through the auth gate and returns where we ended up.
    pub fn navigate(&self, route: Route, session: &SessionStore) -> Route {
        let target = route.guard(session);
        if target != route {
            tracing::debug!("{} requires login, redirecting", route);
        }
        self.redirect(target);
        target
    }

    /// Replaces the current route without consulting the gate.
    pub fn redirect(&self, route: Route) {
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = route;
    }

    /// Hook for [`ApiClient::with_unauthorized_hook`](crate::api::ApiClient::with_unauthorized_hook).
    pub fn login_redirect_hook(self: &Arc<Self>) -> UnauthorizedHook {
        let navigator = Arc::clone(self);
        Arc::new(move || navigator.redirect(Route::Login))
    }
}
