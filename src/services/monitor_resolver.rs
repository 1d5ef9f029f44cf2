use crate::debug_if_enabled;
use crate::events::MonitorIndex;
use crate::services::host::Host;

/// Как выбирается "текущий" монитор
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorMode {
    /// Монитор под указателем мыши
    Pointer,
    /// Монитор окна с фокусом, иначе основной
    FocusedWindow,
}

impl MonitorMode {
    pub fn from_use_mouse_monitor(use_mouse_monitor: bool) -> Self {
        if use_mouse_monitor {
            MonitorMode::Pointer
        } else {
            MonitorMode::FocusedWindow
        }
    }
}

/// Определить текущий монитор. Никогда не падает: без окна с фокусом берётся основной монитор.
pub fn resolve_current_monitor(mode: MonitorMode, host: &dyn Host) -> MonitorIndex {
    match mode {
        MonitorMode::Pointer => {
            let pointer = host.pointer_position();
            let monitor = host.monitor_at_point(pointer);
            debug_if_enabled!("Указатель ({}, {}) на мониторе {}", pointer.x, pointer.y, monitor);
            monitor
        }
        MonitorMode::FocusedWindow => match host.focused_window() {
            Some(window) => window.monitor,
            None => {
                let primary = host.primary_monitor();
                debug_if_enabled!("Нет окна с фокусом, используем основной монитор {}", primary);
                primary
            }
        },
    }
}
