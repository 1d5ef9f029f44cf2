//! Host boundary: everything the window manager owns.
//!
//! Nothing in here decides anything. `Host` answers questions about the desktop and
//! exposes the focus primitives, `Scheduler` runs one-shot deferred callbacks and
//! `HookRegistry` holds the two extension points the host consults.

mod hooks;
mod scheduler;
mod simulated;
mod r#trait;

pub use self::hooks::{HookRegistry, WindowListSupplier, WorkspaceSwitchHook};
#[cfg(test)]
pub use self::scheduler::ManualScheduler;
pub use self::scheduler::TokioScheduler;
#[cfg(test)]
pub use self::simulated::HostCall;
pub use self::simulated::SimulatedHost;
pub use self::r#trait::{Host, Scheduler};
