//! The declarative routing graph and its interpreter.
//!
//! One [`FlowState`] per page, each carrying the step it belongs to for
//! progress tracking, the fields collected on that page, and a table of
//! `event -> transitions`. The graph is static configuration: it is built
//! once, validated, and never mutated afterwards. Per-session data lives in
//! [`FlowContext`] and is read (never written) by guard predicates.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::context::FlowContext;
use crate::error::FlowError;
use crate::guard::{GuardRegistry, GuardSet};

/// Identifier of one page in the application, e.g. `"claims/leave-reason"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Route(String);

impl Route {
    pub fn new(route: impl Into<String>) -> Self {
        Route(route.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Route {
    fn from(route: &str) -> Self {
        Route::new(route)
    }
}

impl From<String> for Route {
    fn from(route: String) -> Self {
        Route(route)
    }
}

/// Logical grouping of states for the progress-tracking UI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Step(String);

impl Step {
    pub fn new(step: impl Into<String>) -> Self {
        Step(step.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Step {
    fn from(step: &str) -> Self {
        Step::new(step)
    }
}

impl From<String> for Step {
    fn from(step: String) -> Self {
        Step(step)
    }
}

/// One edge of the routing graph.
///
/// Guarded transitions are evaluated in declaration order and the first
/// satisfied guard wins; an unconditional transition acts as the fallback and
/// must be declared last for its event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Always taken when reached.
    To(Route),
    /// Taken only when the named guard evaluates true.
    When { guard: String, target: Route },
}

impl Transition {
    pub fn to(target: impl Into<Route>) -> Self {
        Transition::To(target.into())
    }

    pub fn when(guard: impl Into<String>, target: impl Into<Route>) -> Self {
        Transition::When {
            guard: guard.into(),
            target: target.into(),
        }
    }

    pub fn target(&self) -> &Route {
        match self {
            Transition::To(target) => target,
            Transition::When { target, .. } => target,
        }
    }

    pub fn guard(&self) -> Option<&str> {
        match self {
            Transition::To(_) => None,
            Transition::When { guard, .. } => Some(guard.as_str()),
        }
    }
}

/// One node (page) of the routing graph.
#[derive(Debug, Clone)]
pub struct FlowState {
    route: Route,
    step: Step,
    fields: Vec<String>,
    events: Vec<(String, Vec<Transition>)>,
}

impl FlowState {
    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn step(&self) -> &Step {
        &self.step
    }

    /// Names of the claim fields collected on this page.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn events(&self) -> impl Iterator<Item = &str> {
        self.events.iter().map(|(event, _)| event.as_str())
    }

    pub fn transitions(&self, event: &str) -> Option<&[Transition]> {
        self.events
            .iter()
            .find(|(name, _)| name == event)
            .map(|(_, transitions)| transitions.as_slice())
    }
}

/// The validated, immutable routing graph.
pub struct FlowGraph {
    states: HashMap<Route, FlowState>,
    order: Vec<Route>,
    steps: Vec<Step>,
    initial: Route,
    guards: Arc<dyn GuardRegistry>,
}

impl FlowGraph {
    pub fn builder(initial: impl Into<Route>) -> FlowGraphBuilder {
        FlowGraphBuilder::new(initial)
    }

    pub fn initial(&self) -> &Route {
        &self.initial
    }

    pub fn state(&self, route: &Route) -> Option<&FlowState> {
        self.states.get(route)
    }

    /// States in declaration order.
    pub fn states(&self) -> impl Iterator<Item = &FlowState> {
        self.order.iter().filter_map(|route| self.states.get(route))
    }

    /// Steps in first-declared order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Resolve the next route for `event` fired on `current`.
    ///
    /// Guarded transitions are evaluated in declaration order, short-circuiting
    /// on the first satisfied guard. An event the state never declares, or a
    /// guarded list with no match and no fallback, resolves to the *current*
    /// route: the event has no effect. That no-op mirrors the behavior of the
    /// production routing table and is pinned by tests; see
    /// `unmatched_event_is_a_no_op` before relying on it.
    pub fn next_route(
        &self,
        current: &Route,
        event: &str,
        ctx: &FlowContext,
    ) -> Result<Route, FlowError> {
        let state = self
            .states
            .get(current)
            .ok_or_else(|| FlowError::UndeclaredRoute(current.to_string()))?;

        let Some(transitions) = state.transitions(event) else {
            tracing::debug!(%current, event, "event not declared on state; staying");
            return Ok(current.clone());
        };

        for transition in transitions {
            match transition.guard() {
                None => {
                    tracing::trace!(%current, event, target = %transition.target(), "fallback transition");
                    return Ok(transition.target().clone());
                }
                Some(guard) => {
                    if self.guards.evaluate(guard, ctx)? {
                        tracing::trace!(%current, event, guard, target = %transition.target(), "guarded transition");
                        return Ok(transition.target().clone());
                    }
                }
            }
        }

        tracing::debug!(%current, event, "no guard matched and no fallback; staying");
        Ok(current.clone())
    }

    /// Routes reachable from `start` by any event, guards ignored.
    pub fn reachable_from(&self, start: &Route) -> Result<HashSet<Route>, FlowError> {
        if !self.states.contains_key(start) {
            return Err(FlowError::UndeclaredRoute(start.to_string()));
        }
        let mut seen = HashSet::new();
        let mut frontier = vec![start.clone()];
        while let Some(route) = frontier.pop() {
            if !seen.insert(route.clone()) {
                continue;
            }
            // Targets always resolve: build() rejected dangling routes.
            if let Some(state) = self.states.get(&route) {
                for (_, transitions) in &state.events {
                    for transition in transitions {
                        if !seen.contains(transition.target()) {
                            frontier.push(transition.target().clone());
                        }
                    }
                }
            }
        }
        Ok(seen)
    }
}

impl fmt::Debug for FlowGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowGraph")
            .field("initial", &self.initial)
            .field("states", &self.order)
            .field("steps", &self.steps)
            .finish()
    }
}

/// Declarative construction of a [`FlowGraph`].
///
/// `state` opens a new state; `on` attaches an event with its transition list
/// to the most recently opened state. `build` validates the whole table and
/// returns errors instead of panicking on a bad configuration.
pub struct FlowGraphBuilder {
    initial: Route,
    states: Vec<FlowState>,
    guards: GuardSet,
}

impl FlowGraphBuilder {
    pub fn new(initial: impl Into<Route>) -> Self {
        Self {
            initial: initial.into(),
            states: Vec::new(),
            guards: GuardSet::new(),
        }
    }

    /// Install the guard registry used by `When` transitions.
    pub fn guards(mut self, guards: GuardSet) -> Self {
        self.guards = guards;
        self
    }

    /// Register a single guard predicate.
    pub fn guard<F>(mut self, name: impl Into<String>, guard: F) -> Self
    where
        F: Fn(&FlowContext) -> bool + Send + Sync + 'static,
    {
        self.guards = std::mem::take(&mut self.guards).register(name, guard);
        self
    }

    /// Declare a state: its route, progress step, and collected fields.
    pub fn state<'a>(
        mut self,
        route: impl Into<Route>,
        step: impl Into<Step>,
        fields: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        self.states.push(FlowState {
            route: route.into(),
            step: step.into(),
            fields: fields.into_iter().map(str::to_string).collect(),
            events: Vec::new(),
        });
        self
    }

    /// Attach an event and its ordered transition list to the last state.
    pub fn on(
        mut self,
        event: impl Into<String>,
        transitions: impl IntoIterator<Item = Transition>,
    ) -> Self {
        if let Some(state) = self.states.last_mut() {
            state
                .events
                .push((event.into(), transitions.into_iter().collect()));
        } else {
            // Remembered and reported by build(); the builder API stays infallible.
            self.states.push(FlowState {
                route: Route::new(ORPHAN_EVENT_MARKER),
                step: Step::new(ORPHAN_EVENT_MARKER),
                fields: Vec::new(),
                events: vec![(event.into(), transitions.into_iter().collect())],
            });
        }
        self
    }

    /// Validate the table and freeze it into a [`FlowGraph`].
    pub fn build(self) -> Result<FlowGraph, FlowError> {
        let mut states = HashMap::new();
        let mut order = Vec::new();
        let mut steps: Vec<Step> = Vec::new();

        for state in self.states {
            if state.route.as_str() == ORPHAN_EVENT_MARKER {
                return Err(FlowError::EventWithoutState);
            }
            if !steps.contains(&state.step) {
                steps.push(state.step.clone());
            }
            order.push(state.route.clone());
            if states.insert(state.route.clone(), state).is_some() {
                let route = order.last().map(Route::to_string).unwrap_or_default();
                return Err(FlowError::DuplicateState(route));
            }
        }

        if !states.contains_key(&self.initial) {
            return Err(FlowError::UndeclaredRoute(self.initial.to_string()));
        }

        for state in states.values() {
            for (event, transitions) in &state.events {
                for (index, transition) in transitions.iter().enumerate() {
                    if !states.contains_key(transition.target()) {
                        return Err(FlowError::DanglingTarget {
                            from: state.route.to_string(),
                            event: event.clone(),
                            target: transition.target().to_string(),
                        });
                    }
                    match transition.guard() {
                        Some(guard) if !self.guards.contains(guard) => {
                            return Err(FlowError::UnknownGuard {
                                route: state.route.to_string(),
                                guard: guard.to_string(),
                            });
                        }
                        None if index + 1 != transitions.len() => {
                            return Err(FlowError::MisplacedFallback {
                                route: state.route.to_string(),
                                event: event.clone(),
                            });
                        }
                        _ => {}
                    }
                }
            }
        }

        Ok(FlowGraph {
            states,
            order,
            steps,
            initial: self.initial,
            guards: Arc::new(self.guards),
        })
    }
}

const ORPHAN_EVENT_MARKER: &str = "\0orphan-event";
