use crate::events::{HostEvent, ModifierKey, ModifierMask, MonitorIndex, SwitcherKind, WorkspaceId};
use crate::services::host::{Host, SimulatedHost};
use crate::services::modifier_state::parse_override_modifier;
use crate::services::settings_store::{SettingKey, SettingValue, SettingsStore};
use std::sync::Arc;
use tracing::{info, warn};

const STEPS_PER_ROUND: usize = 6;

/// Сценарий демонстрационного прогона: действия пользователя на симулированном столе.
///
/// Часть шагов меняет состояние хоста напрямую (указатель, модификаторы, настройки),
/// остальные порождают события для цикла хоста.
pub struct DemoScript {
    host: Arc<SimulatedHost>,
    store: Arc<SettingsStore>,
    step: usize,
}

impl DemoScript {
    pub fn new(host: Arc<SimulatedHost>, store: Arc<SettingsStore>) -> Self {
        Self { host, store, step: 0 }
    }

    pub fn steps_taken(&self) -> usize {
        self.step
    }

    pub fn next_step(&mut self) -> Vec<HostEvent> {
        let round = self.step / STEPS_PER_ROUND;
        let phase = self.step % STEPS_PER_ROUND;
        self.step += 1;

        match phase {
            0 => {
                info!("Сценарий: Alt+Tab");
                vec![HostEvent::SwitcherRequested(SwitcherKind::Windows)]
            }
            1 => {
                let key = self.override_key();
                info!("Сценарий: удерживаем {} и открываем циклический переключатель", key);
                self.host.set_modifiers(key.mask() | ModifierMask::MOD1);
                vec![HostEvent::SwitcherRequested(SwitcherKind::Cycler)]
            }
            2 => {
                self.host.set_modifiers(ModifierMask::empty());
                let next = self.next_workspace(1);
                info!("Сценарий: переход на {}", next);
                vec![HostEvent::WorkspaceSwitchRequested(next)]
            }
            3 => {
                let monitor = ((round + 1) % self.host.monitors() as usize) as MonitorIndex;
                self.host.move_pointer_to_monitor(monitor);
                let use_mouse = !self.store.get_bool(SettingKey::UseMouseMonitor).unwrap_or(false);
                info!("Сценарий: указатель на мониторе {}, use-mouse-monitor = {}", monitor, use_mouse);
                self.set(SettingKey::UseMouseMonitor, SettingValue::Bool(use_mouse));
                vec![HostEvent::SwitcherRequested(SwitcherKind::Windows)]
            }
            4 => {
                // Два перехода подряд: применяется только последний снимок
                let first = self.next_workspace(1);
                let second = self.next_workspace(2);
                info!("Сценарий: быстрые переходы {} -> {}", first, second);
                vec![
                    HostEvent::WorkspaceSwitchRequested(first),
                    HostEvent::WorkspaceSwitchRequested(second),
                ]
            }
            _ => {
                let debugging = round % 2 == 0;
                info!("Сценарий: enable-debugging = {}", debugging);
                self.set(SettingKey::EnableDebugging, SettingValue::Bool(debugging));
                Vec::new()
            }
        }
    }

    /// Модификатор из настроек; если функция выключена, включаем её на Shift
    fn override_key(&self) -> ModifierKey {
        let configured = self
            .store
            .get_string(SettingKey::OtherMonitorsModifierKey)
            .unwrap_or_default();
        parse_override_modifier(&configured).unwrap_or_else(|| {
            self.set(
                SettingKey::OtherMonitorsModifierKey,
                SettingValue::Str(ModifierKey::Shift.to_string()),
            );
            ModifierKey::Shift
        })
    }

    fn next_workspace(&self, offset: u32) -> WorkspaceId {
        let current = self.host.active_workspace().map_or(0, |ws| ws.0);
        WorkspaceId((current + offset) % self.host.workspaces())
    }

    /// Изменения идут по строковому имени ключа, как из окна настроек
    fn set(&self, key: SettingKey, value: SettingValue) {
        if let Err(e) = self.store.set_by_name(&key.to_string(), value) {
            warn!("Сценарий не смог изменить {}: {}", key, e);
        }
    }
}
