//! Actor classification and blueprint model filters.
//!
//! Model ids follow the simulator's dotted blueprint naming
//! (`vehicle.tesla.model3`, `walker.pedestrian.0001`, `controller.ai.walker`).
//! The first segment decides how behaviors treat the actor: vehicles get
//! autopilot and brake control, walkers are driven through a separate AI
//! controller actor.

use std::fmt;

use glob::Pattern;

use crate::{CoreError, CoreResult};

// ── ActorKind ─────────────────────────────────────────────────────────────────

/// The category of a simulated actor.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum ActorKind {
    /// Cars, trucks, bikes, the tram.
    Vehicle,
    /// Pedestrians.
    Walker,
    /// The AI controller attached to a walker.
    WalkerController,
    /// Static props.
    Prop,
}

impl ActorKind {
    /// Classify a blueprint id by its first dotted segment.
    ///
    /// Returns `None` for unknown categories; callers log and skip those.
    pub fn from_model(model: &str) -> Option<ActorKind> {
        match model.split('.').next()? {
            "vehicle"    => Some(ActorKind::Vehicle),
            "walker"     => Some(ActorKind::Walker),
            "controller" => Some(ActorKind::WalkerController),
            "static"     => Some(ActorKind::Prop),
            _            => None,
        }
    }

    #[inline]
    pub fn is_vehicle(self) -> bool {
        matches!(self, ActorKind::Vehicle)
    }

    #[inline]
    pub fn is_walker(self) -> bool {
        matches!(self, ActorKind::Walker)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActorKind::Vehicle          => "vehicle",
            ActorKind::Walker           => "walker",
            ActorKind::WalkerController => "controller",
            ActorKind::Prop             => "static",
        }
    }
}

impl fmt::Display for ActorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── ModelFilter ───────────────────────────────────────────────────────────────

/// A blueprint filter such as `vehicle.*` or `walker.pedestrian.*`.
///
/// Shell-style glob syntax; `*` matches any run of characters, dots
/// included.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct ModelFilter(Pattern);

impl ModelFilter {
    /// Validate and compile a filter pattern.
    ///
    /// Rejects empty patterns, whitespace, malformed globs, and patterns whose
    /// category segment is not a known [`ActorKind`] (unless it is a bare `*`).
    pub fn parse(pattern: &str) -> CoreResult<ModelFilter> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(CoreError::Parse("empty model filter".into()));
        }
        if pattern.chars().any(char::is_whitespace) {
            return Err(CoreError::Parse(format!("whitespace in model filter {pattern:?}")));
        }
        let category = pattern.split('.').next().unwrap_or_default();
        if category != "*" && ActorKind::from_model(pattern).is_none() {
            return Err(CoreError::Parse(format!("unknown actor category in {pattern:?}")));
        }
        Pattern::new(pattern)
            .map(ModelFilter)
            .map_err(|e| CoreError::Parse(format!("model filter {pattern:?}: {e}")))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The kind every match of this filter will have, if the category segment
    /// is concrete.
    pub fn kind(&self) -> Option<ActorKind> {
        ActorKind::from_model(self.as_str())
    }

    /// `true` if `model` matches the pattern.
    pub fn matches(&self, model: &str) -> bool {
        self.0.matches(model)
    }
}

impl TryFrom<String> for ModelFilter {
    type Error = CoreError;

    fn try_from(pattern: String) -> CoreResult<ModelFilter> {
        ModelFilter::parse(&pattern)
    }
}

impl From<ModelFilter> for String {
    fn from(filter: ModelFilter) -> String {
        filter.0.as_str().to_owned()
    }
}

impl fmt::Display for ModelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
