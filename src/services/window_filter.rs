use crate::events::{MonitorIndex, WindowInfo, WorkspaceId};

/// Всё, что нужно фильтру, снято одним снимком до начала фильтрации
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterContext {
    pub active_workspace: Option<WorkspaceId>,
    pub current_monitor: MonitorIndex,
    /// Зажат модификатор: показываем окна остальных мониторов
    pub override_active: bool,
    pub current_workspace_only: bool,
}

/// Отфильтровать список переключателя.
///
/// Порядок шагов фиксирован: сначала рабочий стол, затем монитор. Относительный
/// порядок входа (MRU-порядок хоста) сохраняется. Других причин исключить окно нет.
pub fn filter_windows(windows: Vec<WindowInfo>, ctx: &FilterContext) -> Vec<WindowInfo> {
    windows
        .into_iter()
        .filter(|window| on_scoped_workspace(window, ctx))
        .filter(|window| (window.monitor == ctx.current_monitor) != ctx.override_active)
        .collect()
}

fn on_scoped_workspace(window: &WindowInfo, ctx: &FilterContext) -> bool {
    if !ctx.current_workspace_only {
        return true;
    }
    // Без известного активного стола ограничивать нечем
    ctx.active_workspace
        .map_or(true, |workspace| window.is_on_workspace(workspace))
}
