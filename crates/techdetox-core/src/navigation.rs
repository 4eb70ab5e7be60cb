//! Screen stack.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::lockdown::NavParams;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Route {
    Selector,
    /// `deadline` is filled in once the countdown has started so a remount
    /// continues against the same end time.
    Lockdown {
        params: NavParams,
        /// Wall-clock end of the lockdown. Time spent on screens pushed above
        /// this route still counts down, so returning from the emergency
        /// screen shows the remaining time as of the return, not as of
        /// leaving.
        #[serde(default)]
        deadline: Option<DateTime<Utc>>,
    },
    Emergency,
}

impl Route {
    pub fn name(&self) -> RouteName {
        match self {
            Route::Selector => RouteName::Selector,
            Route::Lockdown { .. } => RouteName::Lockdown,
            Route::Emergency => RouteName::Emergency,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteName {
    Selector,
    Lockdown,
    Emergency,
}

/// A non-empty stack of routes. The root can be replaced but never popped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Router {
    stack: Vec<Route>,
}

impl Router {
    pub fn new(root: Route) -> Self {
        Self { stack: vec![root] }
    }

    pub fn current(&self) -> &Route {
        // The stack is never empty.
        &self.stack[self.stack.len() - 1]
    }

    pub fn current_mut(&mut self) -> &mut Route {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn push(&mut self, route: Route) {
        debug!(to = ?route.name(), "navigate push");
        self.stack.push(route);
    }

    /// Pop the current route. Returns `false` at the root.
    pub fn back(&mut self) -> bool {
        if self.stack.len() <= 1 {
            return false;
        }
        self.stack.pop();
        debug!(to = ?self.current().name(), "navigate back");
        true
    }

    /// Drop the whole history and start over at `route`.
    pub fn reset(&mut self, route: Route) {
        debug!(to = ?route.name(), "navigate reset");
        self.stack.clear();
        self.stack.push(route);
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(Route::Selector)
    }
}
