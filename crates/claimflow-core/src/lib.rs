//! Core flow engine: a declarative routing graph over the pages of a claim
//! application, interpreted by a pure `next_route` function.

pub mod context;
pub mod error;
pub mod graph;
pub mod guard;
pub mod progress;

pub use context::FlowContext;
pub use error::FlowError;
pub use graph::{FlowGraph, FlowGraphBuilder, FlowState, Route, Step, Transition};
pub use guard::{GuardFn, GuardRegistry, GuardSet};
pub use progress::{StepProgress, StepStatus};
