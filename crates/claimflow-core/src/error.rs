use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// The route is not declared as a state in the flow graph.
    #[error("route `{0}` is not declared in the flow graph")]
    UndeclaredRoute(String),
    /// A transition names a target that no declared state owns.
    #[error("transition for `{event}` on `{from}` targets undeclared route `{target}`")]
    DanglingTarget {
        from: String,
        event: String,
        target: String,
    },
    /// A guarded transition names a predicate the registry does not know.
    #[error("guard `{guard}` used by `{route}` is not registered")]
    UnknownGuard { route: String, guard: String },
    /// An unconditional transition must be the last entry for its event.
    #[error("unconditional transition for `{event}` on `{route}` must be declared last")]
    MisplacedFallback { route: String, event: String },
    #[error("state `{0}` declared more than once")]
    DuplicateState(String),
    #[error("`on` called before any state was declared")]
    EventWithoutState,
}
