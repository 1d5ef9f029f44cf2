pub mod keyboard;
pub mod timer;
pub mod window;

pub use keyboard::{ModifierKey, ModifierMask};
pub use timer::{Priority, TimerHandle};
pub use window::{MonitorIndex, Point, SwitcherKind, TabListScope, WindowId, WindowInfo, WorkspaceId};

/// События, которые цикл хоста доставляет расширению
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// Сработал отложенный одноразовый таймер
    TimerFired(TimerHandle),
    /// Пользователь открыл переключатель
    SwitcherRequested(SwitcherKind),
    /// Пользователь запросил смену рабочего стола
    WorkspaceSwitchRequested(WorkspaceId),
}
