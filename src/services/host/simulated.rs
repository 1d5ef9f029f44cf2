use crate::config::SimulationConfig;
use crate::error::Result;
use crate::events::{
    ModifierMask, MonitorIndex, Point, SwitcherKind, TabListScope, WindowId, WindowInfo,
    WorkspaceId,
};
use crate::switcher_error;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use super::hooks::HookRegistry;
use super::r#trait::Host;

/// Вызов примитива хоста, записанный симулятором
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCall {
    Activate(WindowId),
    ClearFocus,
    TabList(TabListScope, Option<WorkspaceId>),
}

struct DesktopState {
    windows: Vec<WindowInfo>,
    focused: Option<WindowId>,
    active_workspace: WorkspaceId,
    pointer: Point,
    modifiers: ModifierMask,
    clock: u64,
    calls: Vec<HostCall>,
    fail_clear_focus: bool,
    workspace_unknown: bool,
}

/// Рабочий стол в памяти процесса: мониторы стоят в ряд слева направо.
pub struct SimulatedHost {
    monitors: MonitorIndex,
    monitor_width: i32,
    workspaces: u32,
    state: RwLock<DesktopState>,
}

impl SimulatedHost {
    pub fn new(config: &SimulationConfig) -> Self {
        info!(
            "Симулятор рабочего стола: {} монитор(а), {} рабочих стола",
            config.monitors, config.workspaces
        );

        Self {
            monitors: MonitorIndex::try_from(config.monitors.max(1)).unwrap_or(MonitorIndex::MAX),
            monitor_width: config.monitor_width.max(1),
            workspaces: config.workspaces.max(1),
            state: RwLock::new(DesktopState {
                windows: Vec::new(),
                focused: None,
                active_workspace: WorkspaceId(0),
                pointer: Point::default(),
                modifiers: ModifierMask::empty(),
                clock: 0,
                calls: Vec::new(),
                fail_clear_focus: false,
                workspace_unknown: false,
            }),
        }
    }

    /// Набор окон для демонстрационного прогона
    pub fn with_demo_windows(self) -> Self {
        let last_monitor = self.monitors - 1;
        let last_workspace = self.workspaces - 1;

        let demo = vec![
            WindowInfo::new(1, "Terminal").on_monitor(0).on_workspace(0),
            WindowInfo::new(2, "Browser").on_monitor(last_monitor).on_workspace(0),
            WindowInfo::new(3, "Editor").on_monitor(0).on_workspace(0),
            WindowInfo::new(4, "Save As").on_monitor(0).on_workspace(0).attached_to(3),
            WindowInfo::new(5, "Music").on_monitor(last_monitor).on_workspace(0).sticky(),
            WindowInfo::new(6, "Chat").on_monitor(last_monitor).on_workspace(last_workspace),
            WindowInfo::new(7, "Notes").on_monitor(0).on_workspace(last_workspace),
            WindowInfo::new(8, "Tray helper").on_monitor(0).on_workspace(last_workspace).skip_taskbar(),
        ];

        for window in demo {
            self.add_window(window);
        }
        self.focus(WindowId(3));
        self
    }

    pub fn workspaces(&self) -> u32 {
        self.workspaces
    }

    pub fn monitors(&self) -> MonitorIndex {
        self.monitors
    }

    /// Новое окно получает свежую метку взаимодействия
    pub fn add_window(&self, mut window: WindowInfo) {
        let mut state = self.state.write();
        state.clock += 1;
        if window.user_time == 0 {
            window.user_time = state.clock;
        } else {
            state.clock = state.clock.max(window.user_time);
        }
        debug!("Симулятор: добавлено окно {}", window);
        state.windows.push(window);
    }

    /// Клик пользователя по окну
    pub fn focus(&self, id: WindowId) -> bool {
        let mut state = self.state.write();
        state.clock += 1;
        let clock = state.clock;
        match state.windows.iter_mut().find(|w| w.id == id) {
            Some(window) => {
                window.user_time = clock;
                state.focused = Some(id);
                true
            }
            None => false,
        }
    }

    pub fn move_pointer(&self, point: Point) {
        self.state.write().pointer = point;
    }

    /// Указатель в центр монитора `monitor`
    pub fn move_pointer_to_monitor(&self, monitor: MonitorIndex) {
        let x = monitor * self.monitor_width + self.monitor_width / 2;
        self.move_pointer(Point::new(x, 10));
    }

    pub fn set_modifiers(&self, modifiers: ModifierMask) {
        self.state.write().modifiers = modifiers;
    }

    /// Открыть переключатель: список хоста проходит через установленный фильтр
    pub fn open_switcher(&self, kind: SwitcherKind, hooks: &HookRegistry) -> Vec<WindowInfo> {
        let active = self.active_workspace();
        let windows = self.tab_list_unrecorded(TabListScope::Normal, active);
        hooks.window_list(kind, windows)
    }

    /// Смена рабочего стола пользователем.
    ///
    /// Перехватчик вызывается до переключения. Затем хост, как и настоящий
    /// оконный менеджер, отдаёт фокус самому свежему окну нового стола на любом мониторе.
    pub fn switch_workspace(&self, target: WorkspaceId, hooks: &HookRegistry) -> Result<()> {
        if target.0 >= self.workspaces {
            return Err(switcher_error!(host, "Рабочего стола {} не существует", target));
        }

        hooks.workspace_switch_requested(target);

        let default_focus = {
            let mut state = self.state.write();
            state.active_workspace = target;
            let default_focus = state
                .windows
                .iter()
                .filter(|w| w.is_on_workspace(target) && !w.skip_taskbar)
                .max_by_key(|w| w.user_time)
                .map(|w| w.id);
            state.focused = default_focus;
            default_focus
        };

        info!("Симулятор: активен {}, фокус хоста: {:?}", target, default_focus);
        Ok(())
    }

    #[cfg(test)]
    pub fn calls(&self) -> Vec<HostCall> {
        self.state.read().calls.clone()
    }

    pub fn take_calls(&self) -> Vec<HostCall> {
        std::mem::take(&mut self.state.write().calls)
    }

    #[cfg(test)]
    pub fn set_clear_focus_failure(&self, fail: bool) {
        self.state.write().fail_clear_focus = fail;
    }

    /// Хост перестаёт сообщать активный рабочий стол
    #[cfg(test)]
    pub fn set_workspace_unknown(&self, unknown: bool) {
        self.state.write().workspace_unknown = unknown;
    }

    fn tab_list_unrecorded(
        &self,
        scope: TabListScope,
        workspace: Option<WorkspaceId>,
    ) -> Vec<WindowInfo> {
        let state = self.state.read();
        let mut windows: Vec<WindowInfo> = state
            .windows
            .iter()
            .filter(|w| workspace.map_or(true, |ws| w.is_on_workspace(ws)))
            .filter(|w| match scope {
                TabListScope::Normal => !w.skip_taskbar && !w.attached_dialog,
                TabListScope::NormalAll => true,
            })
            .cloned()
            .collect();
        windows.sort_by(|a, b| b.user_time.cmp(&a.user_time));
        windows
    }
}

impl Host for SimulatedHost {
    fn pointer_position(&self) -> Point {
        self.state.read().pointer
    }

    fn monitor_at_point(&self, point: Point) -> MonitorIndex {
        let index = point.x.div_euclid(self.monitor_width);
        index.clamp(0, self.monitors - 1)
    }

    fn primary_monitor(&self) -> MonitorIndex {
        0
    }

    fn focused_window(&self) -> Option<WindowInfo> {
        let state = self.state.read();
        let focused = state.focused?;
        state.windows.iter().find(|w| w.id == focused).cloned()
    }

    fn window(&self, id: WindowId) -> Option<WindowInfo> {
        self.state.read().windows.iter().find(|w| w.id == id).cloned()
    }

    fn tab_list(&self, scope: TabListScope, workspace: Option<WorkspaceId>) -> Vec<WindowInfo> {
        self.state.write().calls.push(HostCall::TabList(scope, workspace));
        self.tab_list_unrecorded(scope, workspace)
    }

    fn active_workspace(&self) -> Option<WorkspaceId> {
        let state = self.state.read();
        (!state.workspace_unknown).then_some(state.active_workspace)
    }

    fn modifier_mask(&self) -> ModifierMask {
        self.state.read().modifiers
    }

    fn activate(&self, window: WindowId) -> Result<()> {
        self.state.write().calls.push(HostCall::Activate(window));
        if !self.focus(window) {
            return Err(switcher_error!(window_not_found, "{}", window));
        }
        info!("[SIM] Фокус передан окну {}", window);
        Ok(())
    }

    fn clear_focus(&self) -> Result<()> {
        let mut state = self.state.write();
        state.calls.push(HostCall::ClearFocus);
        if state.fail_clear_focus {
            warn!("[SIM] Сброс фокуса завершился ошибкой");
            return Err(switcher_error!(host, "сброс фокуса не удался"));
        }
        state.focused = None;
        info!("[SIM] Фокус снят со всех окон");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn host() -> SimulatedHost {
        SimulatedHost::new(&SimulationConfig::default())
    }

    fn titles(windows: &[WindowInfo]) -> Vec<&str> {
        windows.iter().map(|w| w.title.as_str()).collect()
    }

    #[test]
    fn point_maps_to_monitor_column() {
        let host = host();
        assert_eq!(host.monitor_at_point(Point::new(10, 10)), 0);
        assert_eq!(host.monitor_at_point(Point::new(1920, 10)), 1);
        assert_eq!(host.monitor_at_point(Point::new(99_999, 10)), 1);
        assert_eq!(host.monitor_at_point(Point::new(-5, 10)), 0);
    }

    #[test]
    fn huge_monitor_count_does_not_wrap() {
        let host = SimulatedHost::new(&SimulationConfig {
            monitors: u32::MAX,
            ..SimulationConfig::default()
        });
        assert_eq!(host.monitors(), MonitorIndex::MAX);
        assert_eq!(host.monitor_at_point(Point::new(1920 * 3, 0)), 3);
        assert_eq!(host.monitor_at_point(Point::new(-1, 0)), 0);
    }

    #[test]
    fn tab_lists_are_most_recent_first() {
        let host = host().with_demo_windows();
        let normal = host.tab_list(TabListScope::Normal, Some(WorkspaceId(0)));
        assert_eq!(titles(&normal), vec!["Editor", "Music", "Browser", "Terminal"]);

        let all = host.tab_list(TabListScope::NormalAll, Some(WorkspaceId(0)));
        assert!(all.iter().any(|w| w.title == "Save As"));
    }

    #[test]
    fn workspace_switch_moves_host_focus() {
        let host = host().with_demo_windows();
        let hooks = HookRegistry::new();
        host.switch_workspace(WorkspaceId(1), &hooks).unwrap();

        assert_eq!(host.active_workspace(), Some(WorkspaceId(1)));
        // Хост не смотрит на монитор: фокус уходит к самому свежему окну стола
        assert_eq!(host.focused_window().map(|w| w.title), Some("Notes".to_string()));
        assert!(host.switch_workspace(WorkspaceId(9), &hooks).is_err());
    }

    #[test]
    fn activation_records_calls() {
        let host = host().with_demo_windows();
        host.activate(WindowId(1)).unwrap();
        assert!(host.activate(WindowId(42)).is_err());
        host.clear_focus().unwrap();

        assert_eq!(
            host.take_calls(),
            vec![
                HostCall::Activate(WindowId(1)),
                HostCall::Activate(WindowId(42)),
                HostCall::ClearFocus,
            ]
        );
        assert!(host.focused_window().is_none());
        assert!(host.calls().is_empty());
    }
}
