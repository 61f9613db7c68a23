//! Routing collaborator contract
//!
//! The core never owns navigation mechanics. It reads the route parameters
//! once when a session starts and asks the router to move between views.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four screens of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    /// Author list
    List,
    /// Posts of one author; takes an author id
    Posts,
    /// One post with comments; takes a post id
    Detail,
    /// Starred posts
    Starred,
}

impl View {
    pub fn as_str(&self) -> &'static str {
        match self {
            View::List => "list",
            View::Posts => "posts",
            View::Detail => "detail",
            View::Starred => "starred",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "list" => Ok(View::List),
            "posts" => Ok(View::Posts),
            "detail" => Ok(View::Detail),
            "starred" => Ok(View::Starred),
            other => Err(format!("unknown view: {}", other)),
        }
    }
}

/// Parameters carried by the current route
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteParams {
    pub author_id: Option<u64>,
    pub post_id: Option<u64>,
}

/// Navigation interface the session calls into
pub trait Router: Send {
    fn navigate(&mut self, view: View, id: Option<u64>);

    fn current_route_params(&self) -> RouteParams;
}

/// One history entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub view: View,
    pub id: Option<u64>,
}

impl Route {
    fn params(&self) -> RouteParams {
        match self.view {
            View::Posts => RouteParams {
                author_id: self.id,
                post_id: None,
            },
            View::Detail => RouteParams {
                author_id: None,
                post_id: self.id,
            },
            View::List | View::Starred => RouteParams::default(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "/{}/{}", self.view, id),
            None => write!(f, "/{}", self.view),
        }
    }
}

/// In-process router backed by a history stack
#[derive(Debug, Clone)]
pub struct MemoryRouter {
    history: Vec<Route>,
}

impl Default for MemoryRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRouter {
    /// Start at the author list
    pub fn new() -> Self {
        Self::starting_at(View::List, None)
    }

    /// Start at an arbitrary route, e.g. a deep link
    pub fn starting_at(view: View, id: Option<u64>) -> Self {
        Self {
            history: vec![Route { view, id }],
        }
    }

    pub fn current(&self) -> Route {
        self.history
            .last()
            .copied()
            .unwrap_or(Route {
                view: View::List,
                id: None,
            })
    }

    /// Pop one entry; the first entry is never popped
    pub fn back(&mut self) -> Option<Route> {
        if self.history.len() > 1 {
            self.history.pop();
            Some(self.current())
        } else {
            None
        }
    }

    pub fn history(&self) -> &[Route] {
        &self.history
    }
}

impl Router for MemoryRouter {
    fn navigate(&mut self, view: View, id: Option<u64>) {
        let route = Route { view, id };
        if self.history.last() != Some(&route) {
            tracing::debug!(route = %route, "navigate");
            self.history.push(route);
        }
    }

    fn current_route_params(&self) -> RouteParams {
        self.current().params()
    }
}
