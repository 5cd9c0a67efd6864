use std::{fmt, sync::Arc};

use async_trait::async_trait;
use regex::Regex;
use thiserror::Error;

use crate::{
    activity::Activity,
    turn::{TurnContext, TurnError},
};

#[async_trait]
pub trait ActivityHandler: Send + Sync {
    fn name(&self) -> &'static str;
    async fn handle(&self, turn: &mut TurnContext<'_>) -> Result<(), TurnError>;
}

pub type ActivityPredicate = Arc<dyn Fn(&Activity) -> bool + Send + Sync>;

#[derive(Debug, Error)]
pub enum RouteBuildError {
    #[error("invalid route pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Clone)]
pub enum Matcher {
    /// Whole message text equals the command, ignoring surrounding whitespace
    /// and ASCII case.
    Command(String),
    /// Message text matches the expression.
    Pattern(Regex),
    /// Arbitrary check over the whole activity, any activity type.
    Predicate(ActivityPredicate),
}

impl Matcher {
    pub fn command(name: impl Into<String>) -> Self {
        Self::Command(name.into())
    }

    pub fn pattern(pattern: &str) -> Result<Self, RouteBuildError> {
        Regex::new(pattern).map(Self::Pattern).map_err(|source| RouteBuildError::InvalidPattern {
            pattern: pattern.to_owned(),
            source,
        })
    }

    pub fn predicate<F>(check: F) -> Self
    where
        F: Fn(&Activity) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(check))
    }

    pub fn matches(&self, activity: &Activity) -> bool {
        match self {
            Self::Command(name) => {
                activity.is_message() && activity.text().trim().eq_ignore_ascii_case(name)
            }
            Self::Pattern(regex) => activity.is_message() && regex.is_match(activity.text().trim()),
            Self::Predicate(check) => check(activity),
        }
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command(name) => f.debug_tuple("Command").field(name).finish(),
            Self::Pattern(regex) => f.debug_tuple("Pattern").field(&regex.as_str()).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

struct Route {
    matcher: Matcher,
    handler: Arc<dyn ActivityHandler>,
}

/// Ordered routes, first match wins. Message activities nothing claims go to
/// the fallback handler; other activity types are ignored.
#[derive(Default)]
pub struct RouteTable {
    routes: Vec<Route>,
    fallback: Option<Arc<dyn ActivityHandler>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<H>(&mut self, matcher: Matcher, handler: H)
    where
        H: ActivityHandler + 'static,
    {
        self.routes.push(Route { matcher, handler: Arc::new(handler) });
    }

    pub fn fallback<H>(&mut self, handler: H)
    where
        H: ActivityHandler + 'static,
    {
        self.fallback = Some(Arc::new(handler));
    }

    pub fn select(&self, activity: &Activity) -> Option<Arc<dyn ActivityHandler>> {
        self.routes
            .iter()
            .find(|route| route.matcher.matches(activity))
            .map(|route| Arc::clone(&route.handler))
            .or_else(|| {
                activity.is_message().then(|| self.fallback.clone()).flatten()
            })
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }
}
