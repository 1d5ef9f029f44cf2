use crate::config::Settings;
use crate::debug_if_enabled;
use crate::events::{MonitorIndex, Priority, TabListScope, TimerHandle, WindowId, WindowInfo, WorkspaceId};
use crate::services::host::{Host, Scheduler, WorkspaceSwitchHook};
use crate::services::monitor_resolver::{resolve_current_monitor, MonitorMode};
use crate::services::mru_selector::{collapse_dialogs, select_most_recently_used};
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Состояние, снятое в момент запроса смены рабочего стола
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusSnapshot {
    pub monitor: MonitorIndex,
    pub focused: Option<WindowInfo>,
    pub focused_on_all_workspaces: bool,
    pub previous_workspace: Option<WorkspaceId>,
    pub requested_workspace: WorkspaceId,
}

#[derive(Debug)]
struct PendingRestoration {
    handle: TimerHandle,
    snapshot: FocusSnapshot,
}

/// Итог восстановления фокуса
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusOutcome {
    /// Окно со всех рабочих столов осталось в фокусе
    Preserve(WindowId),
    /// Фокус отдан самому свежему окну нового стола на том же мониторе
    Retarget(WindowId),
    /// Подходящего окна нет, фокус снят
    Clear,
}

impl fmt::Display for FocusOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FocusOutcome::Preserve(id) => write!(f, "preserve {}", id),
            FocusOutcome::Retarget(id) => write!(f, "retarget {}", id),
            FocusOutcome::Clear => write!(f, "clear"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestorerState {
    Idle,
    Deferred(TimerHandle),
}

/// Держит фокус на текущем мониторе после смены рабочего стола.
///
/// Idle -> Triggered (снимок) -> Deferred (один таймер низкого приоритета) ->
/// Resolved (одно из трёх действий) -> Idle. Новый запрос отменяет ожидающий таймер,
/// устаревшие срабатывания игнорируются по дескриптору.
pub struct FocusRestorer {
    host: Arc<dyn Host>,
    scheduler: Arc<dyn Scheduler>,
    settings: Arc<RwLock<Settings>>,
    pending: Mutex<Option<PendingRestoration>>,
}

impl FocusRestorer {
    pub fn new(
        host: Arc<dyn Host>,
        scheduler: Arc<dyn Scheduler>,
        settings: Arc<RwLock<Settings>>,
    ) -> Self {
        Self {
            host,
            scheduler,
            settings,
            pending: Mutex::new(None),
        }
    }

    pub fn state(&self) -> RestorerState {
        match self.pending.lock().as_ref() {
            Some(pending) => RestorerState::Deferred(pending.handle),
            None => RestorerState::Idle,
        }
    }

    /// Снять снимок и отложить решение на один тик цикла хоста
    pub fn trigger(&self, requested_workspace: WorkspaceId) -> Option<TimerHandle> {
        let settings = self.settings.read().clone();
        if !settings.prevent_focus_on_other_displays {
            debug_if_enabled!("Удержание фокуса выключено, смена стола {} без вмешательства", requested_workspace);
            // Снимок, снятый до выключения, уже не относится к этой смене стола
            self.cancel();
            return None;
        }

        let snapshot = self.capture(&settings, requested_workspace);
        debug_if_enabled!("Снимок перед сменой стола: {:?}", snapshot);

        let mut pending = self.pending.lock();
        if let Some(previous) = pending.take() {
            self.scheduler.cancel(previous.handle);
            debug_if_enabled!("Предыдущее восстановление ({}) отменено", previous.handle);
        }

        let handle = self.scheduler.schedule_once(Priority::Low);
        *pending = Some(PendingRestoration { handle, snapshot });
        Some(handle)
    }

    /// Обработать срабатывание таймера. Чужой или устаревший дескриптор ничего не делает.
    pub fn on_timer_fired(&self, handle: TimerHandle) -> Option<FocusOutcome> {
        let pending = {
            let mut guard = self.pending.lock();
            match guard.as_ref() {
                Some(pending) if pending.handle == handle => guard.take(),
                _ => None,
            }
        };

        let Some(pending) = pending else {
            debug_if_enabled!("{} устарел, игнорируем", handle);
            return None;
        };

        if !self.settings.read().prevent_focus_on_other_displays {
            debug_if_enabled!("Удержание фокуса выключено до срабатывания {}, снимок отброшен", handle);
            return None;
        }

        let outcome = self.resolve(&pending.snapshot);
        info!("Восстановление фокуса после смены стола: {}", outcome);
        Some(outcome)
    }

    /// Отменить ожидающее восстановление (при выключении)
    pub fn cancel(&self) -> bool {
        match self.pending.lock().take() {
            Some(pending) => {
                self.scheduler.cancel(pending.handle);
                debug_if_enabled!("Ожидающее восстановление {} отменено", pending.handle);
                true
            }
            None => false,
        }
    }

    fn capture(&self, settings: &Settings, requested_workspace: WorkspaceId) -> FocusSnapshot {
        let mode = MonitorMode::from_use_mouse_monitor(settings.use_mouse_monitor);
        let monitor = resolve_current_monitor(mode, self.host.as_ref());
        let focused = self.host.focused_window();
        let focused_on_all_workspaces = focused.as_ref().is_some_and(|w| w.on_all_workspaces);

        FocusSnapshot {
            monitor,
            focused,
            focused_on_all_workspaces,
            previous_workspace: self.host.active_workspace(),
            requested_workspace,
        }
    }

    fn resolve(&self, snapshot: &FocusSnapshot) -> FocusOutcome {
        let workspace = self.host.active_workspace();
        if workspace != Some(snapshot.requested_workspace) {
            warn!(
                "Запрошен {}, но активен {:?}; решаем по активному столу",
                snapshot.requested_workspace, workspace
            );
        }
        if let Some(focused) = self.host.focused_window() {
            debug_if_enabled!(
                "После смены стола ({:?} -> {:?}) хост дал фокус {}",
                snapshot.previous_workspace,
                workspace,
                focused
            );
        }

        if let Some(window) = snapshot.focused.as_ref() {
            if snapshot.focused_on_all_workspaces && window.monitor == snapshot.monitor {
                match self.host.activate(window.id) {
                    Ok(()) => return FocusOutcome::Preserve(window.id),
                    Err(e) => warn!("Не удалось вернуть фокус окну {}: {}", window, e),
                }
            }
        }

        if let Some(workspace) = workspace {
            if let Some(target) = self.most_recent_on_monitor(workspace, snapshot.monitor) {
                match self.host.activate(target) {
                    Ok(()) => return FocusOutcome::Retarget(target),
                    Err(e) => warn!("Не удалось передать фокус окну {}: {}", target, e),
                }
            }
        }

        self.clear_focus(snapshot.monitor);
        FocusOutcome::Clear
    }

    fn most_recent_on_monitor(&self, workspace: WorkspaceId, monitor: MonitorIndex) -> Option<WindowId> {
        let windows = self.host.tab_list(TabListScope::NormalAll, Some(workspace));
        let candidates: Vec<WindowInfo> = collapse_dialogs(&windows, |id| self.host.window(id))
            .into_iter()
            .filter(|w| w.monitor == monitor)
            .collect();

        debug_if_enabled!(
            "Кандидатов на мониторе {} стола {}: {}",
            monitor,
            workspace,
            candidates.len()
        );
        select_most_recently_used(&candidates).map(|w| w.id)
    }

    fn clear_focus(&self, monitor: MonitorIndex) {
        debug_if_enabled!("На мониторе {} нет окон, снимаем фокус", monitor);
        if let Err(e) = self.host.clear_focus() {
            warn!("Сброс фокуса не удался: {}", e);
        }
    }
}

impl WorkspaceSwitchHook for FocusRestorer {
    fn workspace_switch_requested(&self, target: WorkspaceId) {
        self.trigger(target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::services::host::{HookRegistry, HostCall, ManualScheduler, SimulatedHost};
    use pretty_assertions::assert_eq;

    struct Fixture {
        host: Arc<SimulatedHost>,
        scheduler: Arc<ManualScheduler>,
        settings: Arc<RwLock<Settings>>,
        restorer: FocusRestorer,
        hooks: HookRegistry,
    }

    fn fixture(monitors: u32) -> Fixture {
        let config = SimulationConfig {
            monitors,
            ..SimulationConfig::default()
        };
        let host = Arc::new(SimulatedHost::new(&config));
        let scheduler = Arc::new(ManualScheduler::new());
        let settings = Arc::new(RwLock::new(Settings::default()));
        let restorer = FocusRestorer::new(host.clone(), scheduler.clone(), settings.clone());
        Fixture {
            host,
            scheduler,
            settings,
            restorer,
            hooks: HookRegistry::new(),
        }
    }

    impl Fixture {
        /// Запрос смены стола так, как его видит хост: снимок, затем сама смена
        fn switch_to(&self, workspace: u32) -> Option<TimerHandle> {
            let handle = self.restorer.trigger(WorkspaceId(workspace));
            self.host.switch_workspace(WorkspaceId(workspace), &self.hooks).unwrap();
            handle
        }

        fn fire(&self, handle: TimerHandle) -> Option<FocusOutcome> {
            self.scheduler.fire(handle);
            self.restorer.on_timer_fired(handle)
        }
    }

    #[test]
    fn retargets_most_recent_window_on_same_monitor() {
        let f = fixture(2);
        f.host.add_window(WindowInfo::new(9, "Start").on_monitor(0).on_workspace(0));
        f.host.add_window(WindowInfo::new(1, "A").on_monitor(0).on_workspace(1).with_user_time(10));
        f.host.add_window(WindowInfo::new(2, "B").on_monitor(1).on_workspace(1).with_user_time(20));
        f.host.add_window(WindowInfo::new(3, "C").on_monitor(0).on_workspace(1).with_user_time(30));
        f.host.add_window(WindowInfo::new(4, "D").on_monitor(1).on_workspace(1).with_user_time(40));
        f.host.focus(WindowId(9));

        let handle = f.switch_to(1).unwrap();
        assert_eq!(f.restorer.state(), RestorerState::Deferred(handle));
        assert_eq!(f.scheduler.priority_of(handle), Some(Priority::Low));
        // Хост сам увёл фокус на другой монитор
        assert_eq!(f.host.focused_window().map(|w| w.id), Some(WindowId(4)));

        assert_eq!(f.fire(handle), Some(FocusOutcome::Retarget(WindowId(3))));
        assert_eq!(f.host.focused_window().map(|w| w.id), Some(WindowId(3)));
        assert_eq!(f.restorer.state(), RestorerState::Idle);
    }

    #[test]
    fn sticky_focused_window_is_preserved_without_window_lists() {
        let f = fixture(3);
        f.host.add_window(WindowInfo::new(1, "F").on_monitor(2).on_workspace(0).sticky());
        f.host.add_window(WindowInfo::new(2, "Other").on_monitor(2).on_workspace(1).with_user_time(500));
        f.host.focus(WindowId(1));

        let handle = f.switch_to(1).unwrap();
        f.host.take_calls();

        assert_eq!(f.fire(handle), Some(FocusOutcome::Preserve(WindowId(1))));
        assert_eq!(f.host.take_calls(), vec![HostCall::Activate(WindowId(1))]);
    }

    #[test]
    fn empty_target_monitor_clears_focus_once() {
        let f = fixture(2);
        f.host.add_window(WindowInfo::new(1, "Here").on_monitor(1).on_workspace(0));
        f.host.add_window(WindowInfo::new(2, "Elsewhere").on_monitor(0).on_workspace(1));
        f.host.focus(WindowId(1));

        let handle = f.switch_to(1).unwrap();
        f.host.take_calls();

        assert_eq!(f.fire(handle), Some(FocusOutcome::Clear));
        let calls = f.host.take_calls();
        assert_eq!(calls.iter().filter(|c| **c == HostCall::ClearFocus).count(), 1);
        assert!(!calls.iter().any(|c| matches!(c, HostCall::Activate(_))));
        assert!(f.host.focused_window().is_none());
    }

    #[test]
    fn second_trigger_cancels_first() {
        let f = fixture(2);
        f.host.add_window(WindowInfo::new(1, "Left0").on_monitor(0).on_workspace(0));
        f.host.add_window(WindowInfo::new(2, "Right0").on_monitor(1).on_workspace(0));
        f.host.add_window(WindowInfo::new(3, "Left1").on_monitor(0).on_workspace(1));
        f.host.add_window(WindowInfo::new(4, "Right1").on_monitor(1).on_workspace(1));
        f.host.focus(WindowId(1));

        let first = f.switch_to(1).unwrap();
        // Пользователь перешёл на правый монитор до срабатывания таймера
        f.host.focus(WindowId(4));
        let second = f.switch_to(0).unwrap();

        assert_ne!(first, second);
        assert_eq!(f.scheduler.cancelled(), vec![first]);
        assert_eq!(f.scheduler.pending(), vec![second]);

        f.host.take_calls();
        assert_eq!(f.restorer.on_timer_fired(first), None);
        assert!(f.host.take_calls().is_empty());

        assert_eq!(f.fire(second), Some(FocusOutcome::Retarget(WindowId(2))));
    }

    #[test]
    fn disabled_setting_makes_hook_a_noop() {
        let f = fixture(2);
        f.settings.write().prevent_focus_on_other_displays = false;

        assert_eq!(f.restorer.trigger(WorkspaceId(1)), None);
        assert!(f.scheduler.pending().is_empty());
        assert_eq!(f.restorer.state(), RestorerState::Idle);
    }

    #[test]
    fn failing_clear_is_swallowed() {
        let f = fixture(2);
        f.host.set_clear_focus_failure(true);

        let handle = f.switch_to(1).unwrap();
        assert_eq!(f.fire(handle), Some(FocusOutcome::Clear));
        assert_eq!(f.restorer.state(), RestorerState::Idle);
    }

    #[test]
    fn cancel_discards_pending_restoration() {
        let f = fixture(2);
        let handle = f.switch_to(1).unwrap();

        assert!(f.restorer.cancel());
        assert!(!f.restorer.cancel());
        assert_eq!(f.scheduler.cancelled(), vec![handle]);
        assert_eq!(f.restorer.on_timer_fired(handle), None);
    }

    #[test]
    fn dialog_candidate_focuses_its_parent() {
        let f = fixture(2);
        f.host.add_window(WindowInfo::new(1, "Doc").on_monitor(0).on_workspace(1).with_user_time(5));
        f.host.add_window(
            WindowInfo::new(2, "Print").on_monitor(0).on_workspace(1).attached_to(1).with_user_time(50),
        );
        f.host.add_window(WindowInfo::new(3, "Older").on_monitor(0).on_workspace(1).with_user_time(2));

        let handle = f.switch_to(1).unwrap();
        assert_eq!(f.fire(handle), Some(FocusOutcome::Retarget(WindowId(1))));
    }

    #[test]
    fn pointer_mode_captures_pointer_monitor() {
        let f = fixture(2);
        f.settings.write().use_mouse_monitor = true;
        f.host.add_window(WindowInfo::new(1, "Left").on_monitor(0).on_workspace(1));
        f.host.add_window(WindowInfo::new(2, "Right").on_monitor(1).on_workspace(1));
        f.host.move_pointer_to_monitor(1);

        let handle = f.switch_to(1).unwrap();
        assert_eq!(f.fire(handle), Some(FocusOutcome::Retarget(WindowId(2))));
    }

    #[test]
    fn turning_setting_off_between_switches_drops_old_snapshot() {
        let f = fixture(2);
        f.host.add_window(WindowInfo::new(1, "Left0").on_monitor(0).on_workspace(0));
        f.host.add_window(WindowInfo::new(2, "Right0").on_monitor(1).on_workspace(0));
        f.host.add_window(WindowInfo::new(3, "Left1").on_monitor(0).on_workspace(1));
        f.host.add_window(WindowInfo::new(4, "Right1").on_monitor(1).on_workspace(1));
        f.host.focus(WindowId(1));

        let first = f.switch_to(1).unwrap();
        f.settings.write().prevent_focus_on_other_displays = false;
        f.host.focus(WindowId(4));
        assert_eq!(f.switch_to(0), None);

        assert!(f.scheduler.pending().is_empty());
        assert_eq!(f.scheduler.cancelled(), vec![first]);
        assert_eq!(f.restorer.state(), RestorerState::Idle);

        f.host.take_calls();
        assert_eq!(f.restorer.on_timer_fired(first), None);
        assert!(f.host.take_calls().is_empty());
    }

    #[test]
    fn setting_turned_off_before_tick_skips_resolution() {
        let f = fixture(2);
        f.host.add_window(WindowInfo::new(1, "Left0").on_monitor(0).on_workspace(0));
        f.host.add_window(WindowInfo::new(2, "Left1").on_monitor(0).on_workspace(1));
        f.host.focus(WindowId(1));

        let handle = f.switch_to(1).unwrap();
        f.settings.write().prevent_focus_on_other_displays = false;
        f.host.take_calls();

        assert_eq!(f.fire(handle), None);
        assert!(f.host.take_calls().is_empty());
        assert_eq!(f.restorer.state(), RestorerState::Idle);
    }

    #[test]
    fn sticky_window_on_other_monitor_is_not_preserved() {
        let f = fixture(2);
        f.settings.write().use_mouse_monitor = true;
        f.host.add_window(WindowInfo::new(1, "F").on_monitor(0).on_workspace(0).sticky());
        f.host.add_window(WindowInfo::new(2, "Right").on_monitor(1).on_workspace(1));
        f.host.focus(WindowId(1));
        f.host.move_pointer_to_monitor(1);

        let handle = f.switch_to(1).unwrap();
        f.host.take_calls();

        assert_eq!(f.fire(handle), Some(FocusOutcome::Retarget(WindowId(2))));
        assert!(!f.host.take_calls().contains(&HostCall::Activate(WindowId(1))));
    }

    #[test]
    fn unknown_workspace_after_switch_clears_focus() {
        let f = fixture(2);
        f.host.add_window(WindowInfo::new(1, "Left0").on_monitor(0).on_workspace(0));
        f.host.add_window(WindowInfo::new(2, "Left1").on_monitor(0).on_workspace(1));
        f.host.focus(WindowId(1));

        let handle = f.switch_to(1).unwrap();
        f.host.set_workspace_unknown(true);
        f.host.take_calls();

        assert_eq!(f.fire(handle), Some(FocusOutcome::Clear));
        assert_eq!(f.host.take_calls(), vec![HostCall::ClearFocus]);
        assert!(f.host.focused_window().is_none());
    }
}
