//! Interactive session management
//!
//! Builders assemble sessions out of context variants, the registry stores
//! live sessions and their control index, and the dispatcher routes inbound
//! activation events back to the owning callbacks.

pub mod builder;
pub mod completion;
pub mod component;
pub mod context;
pub mod dispatcher;
pub mod registry;
mod sweeper;

pub use builder::{
    BuildError, BuiltSession, MenuBuilder, PageAction, PaginationBuilder, SelectionBuilder,
    SessionBuilder,
};
pub use completion::Completion;
pub use component::{ControlId, HandlerError, Reaction};
pub use context::{
    ContextKind, ContextVariant, MenuContext, PaginationContext, SelectionContext, Session,
    SessionSnapshot,
};
pub use dispatcher::{Dispatcher, SessionSettings};
pub use registry::{SessionRegistry, DEFAULT_SESSION_TIMEOUT};
