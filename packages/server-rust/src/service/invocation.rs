//! Invocation envelope carried through the tower pipeline.

use discord_dispatch_core::Operation;

/// Which top-level entry point produced an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPoint {
    Execute,
    Query,
}

impl EntryPoint {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EntryPoint::Execute => "execute",
            EntryPoint::Query => "query",
        }
    }
}

/// Context attached to every invocation for log correlation.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    /// Monotonic id assigned by the dispatcher.
    pub call_id: u64,
    pub entry: EntryPoint,
    /// Caller-facing name, e.g. `message.send` or `messages`.
    pub label: String,
}

/// A bound operation plus its context.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub ctx: InvocationContext,
    pub operation: Operation,
}

impl Invocation {
    #[must_use]
    pub fn new(ctx: InvocationContext, operation: Operation) -> Self {
        Self { ctx, operation }
    }

    /// Wire name of the underlying operation.
    #[must_use]
    pub fn operation_name(&self) -> &'static str {
        self.operation.name()
    }
}
