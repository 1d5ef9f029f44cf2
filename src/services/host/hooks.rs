use crate::events::{SwitcherKind, WindowInfo, WorkspaceId};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

/// Supplies the list the switcher popup shows
pub trait WindowListSupplier: Send + Sync {
    fn window_list(&self, kind: SwitcherKind, windows: Vec<WindowInfo>) -> Vec<WindowInfo>;
}

/// Called synchronously when the user asks for another workspace, before the switch runs
pub trait WorkspaceSwitchHook: Send + Sync {
    fn workspace_switch_requested(&self, target: WorkspaceId);
}

/// Точки расширения хоста. Пустой слот означает поведение хоста по умолчанию.
#[derive(Default)]
pub struct HookRegistry {
    window_list: RwLock<Option<Arc<dyn WindowListSupplier>>>,
    workspace_switch: RwLock<Option<Arc<dyn WorkspaceSwitchHook>>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install_window_list(&self, supplier: Arc<dyn WindowListSupplier>) {
        *self.window_list.write() = Some(supplier);
    }

    pub fn install_workspace_switch(&self, hook: Arc<dyn WorkspaceSwitchHook>) {
        *self.workspace_switch.write() = Some(hook);
    }

    /// Вернуть хосту исходное поведение обеих точек
    pub fn restore_defaults(&self) {
        let had_list = self.window_list.write().take().is_some();
        let had_switch = self.workspace_switch.write().take().is_some();
        if had_list || had_switch {
            info!("Точки расширения восстановлены по умолчанию");
        }
    }

    pub fn is_installed(&self) -> bool {
        self.window_list.read().is_some() || self.workspace_switch.read().is_some()
    }

    /// Список окон для переключателя: без установленного фильтра хост видит свой список как есть
    pub fn window_list(&self, kind: SwitcherKind, windows: Vec<WindowInfo>) -> Vec<WindowInfo> {
        // Клонируем Arc, чтобы не держать блокировку во время вызова
        let supplier = self.window_list.read().clone();
        match supplier {
            Some(supplier) => supplier.window_list(kind, windows),
            None => windows,
        }
    }

    pub fn workspace_switch_requested(&self, target: WorkspaceId) {
        let hook = self.workspace_switch.read().clone();
        if let Some(hook) = hook {
            hook.workspace_switch_requested(target);
        }
    }
}
