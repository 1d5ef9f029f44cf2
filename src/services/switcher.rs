use crate::config::Settings;
use crate::debug_if_enabled;
use crate::events::{SwitcherKind, WindowInfo};
use crate::services::host::{Host, WindowListSupplier};
use crate::services::modifier_state::is_override_active;
use crate::services::monitor_resolver::{resolve_current_monitor, MonitorMode};
use crate::services::window_filter::{filter_windows, FilterContext};
use parking_lot::RwLock;
use std::sync::Arc;

/// Фильтр списка переключателя: собирает контекст из хоста и настроек и
/// прогоняет список хоста через `filter_windows`.
pub struct SwitcherFilter {
    host: Arc<dyn Host>,
    settings: Arc<RwLock<Settings>>,
}

impl SwitcherFilter {
    pub fn new(host: Arc<dyn Host>, settings: Arc<RwLock<Settings>>) -> Self {
        Self { host, settings }
    }

    pub fn context(&self, settings: &Settings) -> FilterContext {
        let mode = MonitorMode::from_use_mouse_monitor(settings.use_mouse_monitor);
        FilterContext {
            active_workspace: self.host.active_workspace(),
            current_monitor: resolve_current_monitor(mode, self.host.as_ref()),
            override_active: is_override_active(
                self.host.modifier_mask(),
                &settings.other_monitors_modifier_key,
            ),
            current_workspace_only: settings.current_workspace_only,
        }
    }
}

impl WindowListSupplier for SwitcherFilter {
    fn window_list(&self, kind: SwitcherKind, windows: Vec<WindowInfo>) -> Vec<WindowInfo> {
        // Один снимок настроек на всё решение
        let settings = self.settings.read().clone();
        let ctx = self.context(&settings);
        let total = windows.len();
        let filtered = filter_windows(windows, &ctx);

        debug_if_enabled!(
            "{:?}: {} из {} окон (монитор {}, другие мониторы: {})",
            kind,
            filtered.len(),
            total,
            ctx.current_monitor,
            ctx.override_active
        );
        filtered
    }
}
