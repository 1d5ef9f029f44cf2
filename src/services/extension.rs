use crate::config::Settings;
use crate::events::TimerHandle;
use crate::services::focus_restorer::{FocusOutcome, FocusRestorer, RestorerState};
use crate::services::host::{HookRegistry, Host, Scheduler};
use crate::services::settings_store::{apply_setting, SettingKey, SettingValue, SettingsStore, SubscriptionId};
use crate::services::switcher::SwitcherFilter;
use crate::utils;
use parking_lot::RwLock;
use smallvec::SmallVec;
use std::sync::Arc;
use strum::IntoEnumIterator;
use tracing::{debug, info, warn};

/// Всё, что существует только между enable() и disable()
struct ActiveState {
    settings: Arc<RwLock<Settings>>,
    subscriptions: SmallVec<[SubscriptionId; 8]>,
    restorer: Arc<FocusRestorer>,
}

/// Жизненный цикл расширения: подписки на настройки и точки расширения хоста
/// создаются при включении и полностью снимаются при выключении.
pub struct Extension {
    host: Arc<dyn Host>,
    scheduler: Arc<dyn Scheduler>,
    store: Arc<SettingsStore>,
    hooks: Arc<HookRegistry>,
    active: Option<ActiveState>,
}

impl Extension {
    pub fn new(
        host: Arc<dyn Host>,
        scheduler: Arc<dyn Scheduler>,
        store: Arc<SettingsStore>,
        hooks: Arc<HookRegistry>,
    ) -> Self {
        Self {
            host,
            scheduler,
            store,
            hooks,
            active: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.active.is_some()
    }

    pub fn enable(&mut self) {
        if self.active.is_some() {
            debug!("Расширение уже включено");
            return;
        }

        let settings = Arc::new(RwLock::new(self.store.snapshot()));
        utils::set_debugging(settings.read().enable_debugging);

        let restorer = Arc::new(FocusRestorer::new(
            Arc::clone(&self.host),
            Arc::clone(&self.scheduler),
            Arc::clone(&settings),
        ));

        let mut subscriptions = SmallVec::new();
        for key in SettingKey::iter() {
            let cache = Arc::clone(&settings);
            let restorer = Arc::clone(&restorer);
            let id = self.store.connect(key, move |key, value| {
                mirror_change(&cache, key, value);
                if let (SettingKey::PreventFocusOnOtherDisplays, SettingValue::Bool(false)) = (key, value) {
                    if restorer.cancel() {
                        info!("Удержание фокуса выключено, ожидающее восстановление отменено");
                    }
                }
            });
            subscriptions.push(id);
        }

        self.hooks.install_window_list(Arc::new(SwitcherFilter::new(
            Arc::clone(&self.host),
            Arc::clone(&settings),
        )));
        self.hooks.install_workspace_switch(restorer.clone());

        info!(
            "Расширение включено ({} подписок, диагностика: {})",
            subscriptions.len(),
            utils::debugging_enabled()
        );

        self.active = Some(ActiveState {
            settings,
            subscriptions,
            restorer,
        });
    }

    pub fn disable(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };

        self.hooks.restore_defaults();

        for id in &active.subscriptions {
            self.store.disconnect(*id);
        }

        if active.restorer.cancel() {
            info!("Ожидающее восстановление фокуса отменено при выключении");
        }

        // Фильтр логов возвращается к настроенному уровню
        utils::set_debugging(false);

        info!("Расширение выключено");
    }

    /// Доставка сработавшего таймера. После выключения всё игнорируется.
    pub fn on_timer_fired(&self, handle: TimerHandle) -> Option<FocusOutcome> {
        self.active.as_ref()?.restorer.on_timer_fired(handle)
    }

    /// Кэшированный снимок настроек, которым пользуются решения
    pub fn settings(&self) -> Option<Settings> {
        self.active.as_ref().map(|active| active.settings.read().clone())
    }

    pub fn restorer_state(&self) -> RestorerState {
        self.active
            .as_ref()
            .map_or(RestorerState::Idle, |active| active.restorer.state())
    }
}

impl Drop for Extension {
    fn drop(&mut self) {
        self.disable();
    }
}

fn mirror_change(cache: &RwLock<Settings>, key: SettingKey, value: &SettingValue) {
    if let Err(e) = apply_setting(&mut cache.write(), key, value) {
        warn!("Не удалось применить изменение {}: {}", key, e);
        return;
    }

    if let (SettingKey::EnableDebugging, SettingValue::Bool(enabled)) = (key, value) {
        utils::set_debugging(*enabled);
    }
}
