//! Dispatch core: parameter normalization, action registry, typed
//! operations, and argument positioning for a chat-platform API.

pub mod catalog;
pub mod describe;
pub mod error;
pub mod messages;
pub mod normalize;
pub mod operation;
pub mod params;
pub mod position;
pub mod registry;

pub use describe::describe;
pub use error::{BindError, DispatchError, RegistryError, ResolveError};
pub use messages::{BatchRequest, BatchResult, ExecuteRequest, ExecutionResult, QueryRequest};
pub use normalize::normalize;
pub use operation::{args, ChannelOptions, EmbedField, Operation, OperationKind};
pub use params::{params, Params};
pub use position::position_args;
pub use registry::{ActionRegistry, HelpIndex, Resolved};
