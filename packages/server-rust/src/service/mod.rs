//! Dispatch and invocation framework.
//!
//! 1. **Dispatcher** (`dispatcher`): validate, normalize, resolve, position, bind
//! 2. **Middleware** (`middleware`): tower layers around each invocation
//! 3. **Platform** (`platform`): the `ChatPlatform` collaborator seam
//! 4. **Batch** (`batch`): sequential runner with early stop

pub mod batch;
pub mod dispatcher;
pub mod invocation;
pub mod middleware;
pub mod platform;

pub use dispatcher::Dispatcher;
pub use invocation::{EntryPoint, Invocation, InvocationContext};
pub use platform::{ChatPlatform, DryRunPlatform, PlatformService};
