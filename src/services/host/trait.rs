use crate::error::Result;
use crate::events::{
    ModifierMask, MonitorIndex, Point, Priority, TabListScope, TimerHandle, WindowId, WindowInfo,
    WorkspaceId,
};

/// Read-only view of the desktop plus the two focus primitives we are allowed to call.
///
/// Everything here is owned by the window manager. Implementations must be cheap to
/// query: the switcher calls into them synchronously while the popup is being built.
pub trait Host: Send + Sync {
    fn pointer_position(&self) -> Point;

    /// Монитор, которому принадлежит точка
    fn monitor_at_point(&self, point: Point) -> MonitorIndex;

    fn primary_monitor(&self) -> MonitorIndex;

    fn focused_window(&self) -> Option<WindowInfo>;

    /// Lookup by id, used to resolve transient parents of dialogs
    fn window(&self, id: WindowId) -> Option<WindowInfo>;

    /// Windows of `workspace` in the host's most-recently-used order
    fn tab_list(&self, scope: TabListScope, workspace: Option<WorkspaceId>) -> Vec<WindowInfo>;

    fn active_workspace(&self) -> Option<WorkspaceId>;

    fn modifier_mask(&self) -> ModifierMask;

    /// Give input focus to `window`
    fn activate(&self, window: WindowId) -> Result<()>;

    /// Remove input focus from every window
    fn clear_focus(&self) -> Result<()>;
}

/// One-shot deferred callbacks on the host's event loop.
///
/// Firing is reported back as `HostEvent::TimerFired(handle)`, never as a closure,
/// so the receiver can drop deliveries for handles it no longer waits for.
pub trait Scheduler: Send + Sync {
    fn schedule_once(&self, priority: Priority) -> TimerHandle;

    /// Returns false when the handle already fired or was never issued
    fn cancel(&self, handle: TimerHandle) -> bool;
}
