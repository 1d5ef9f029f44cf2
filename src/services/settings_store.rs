use crate::config::Settings;
use crate::debug_if_enabled;
use crate::error::{Result, SwitcherError};
use crate::switcher_error;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use strum::{Display, EnumIter, EnumString};

/// Ключ постоянного хранилища настроек
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum SettingKey {
    UseMouseMonitor,
    CurrentWorkspaceOnly,
    PreventFocusOnOtherDisplays,
    OtherMonitorsModifierKey,
    EnableDebugging,
}

impl SettingKey {
    pub fn is_bool(self) -> bool {
        !matches!(self, SettingKey::OtherMonitorsModifierKey)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    Bool(bool),
    Str(String),
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(value) => write!(f, "{}", value),
            SettingValue::Str(value) => write!(f, "\"{}\"", value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type ChangeCallback = Arc<dyn Fn(SettingKey, &SettingValue) + Send + Sync>;

struct Subscription {
    key: SettingKey,
    callback: ChangeCallback,
}

/// Хранилище настроек с уведомлениями об изменениях.
///
/// Значения пишутся целиком под блокировкой, поэтому читатель видит либо старое,
/// либо новое значение. Колбэки вызываются после снятия блокировки.
pub struct SettingsStore {
    values: RwLock<Settings>,
    subscriptions: DashMap<SubscriptionId, Subscription>,
    next_id: AtomicU64,
}

impl SettingsStore {
    pub fn new(initial: Settings) -> Self {
        Self {
            values: RwLock::new(initial),
            subscriptions: DashMap::new(),
            next_id: AtomicU64::new(0),
        }
    }

    /// Согласованный снимок всех настроек
    pub fn snapshot(&self) -> Settings {
        self.values.read().clone()
    }

    pub fn get(&self, key: SettingKey) -> SettingValue {
        let values = self.values.read();
        match key {
            SettingKey::UseMouseMonitor => SettingValue::Bool(values.use_mouse_monitor),
            SettingKey::CurrentWorkspaceOnly => SettingValue::Bool(values.current_workspace_only),
            SettingKey::PreventFocusOnOtherDisplays => {
                SettingValue::Bool(values.prevent_focus_on_other_displays)
            }
            SettingKey::OtherMonitorsModifierKey => {
                SettingValue::Str(values.other_monitors_modifier_key.clone())
            }
            SettingKey::EnableDebugging => SettingValue::Bool(values.enable_debugging),
        }
    }

    pub fn get_bool(&self, key: SettingKey) -> Result<bool> {
        match self.get(key) {
            SettingValue::Bool(value) => Ok(value),
            SettingValue::Str(_) => Err(type_error(key, "bool")),
        }
    }

    pub fn get_string(&self, key: SettingKey) -> Result<String> {
        match self.get(key) {
            SettingValue::Str(value) => Ok(value),
            SettingValue::Bool(_) => Err(type_error(key, "string")),
        }
    }

    /// Записать значение; подписчики ключа уведомляются только при реальном изменении
    pub fn set(&self, key: SettingKey, value: SettingValue) -> Result<()> {
        let changed = apply_setting(&mut self.values.write(), key, &value)?;

        if changed {
            debug_if_enabled!("Настройка {} изменена на {}", key, value);
            self.notify(key, &value);
        }
        Ok(())
    }

    /// Запись по строковому имени ключа, как её делает окно настроек
    pub fn set_by_name(&self, name: &str, value: SettingValue) -> Result<()> {
        let key = SettingKey::from_str(name).map_err(|_| switcher_error!(unknown_setting, "{}", name))?;
        self.set(key, value)
    }

    pub fn connect<F>(&self, key: SettingKey, callback: F) -> SubscriptionId
    where
        F: Fn(SettingKey, &SettingValue) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.subscriptions.insert(
            id,
            Subscription {
                key,
                callback: Arc::new(callback),
            },
        );
        id
    }

    pub fn disconnect(&self, id: SubscriptionId) -> bool {
        self.subscriptions.remove(&id).is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.len()
    }

    fn notify(&self, key: SettingKey, value: &SettingValue) {
        // Собираем колбэки заранее: подписчик может отписаться прямо из уведомления
        let callbacks: Vec<ChangeCallback> = self
            .subscriptions
            .iter()
            .filter(|entry| entry.value().key == key)
            .map(|entry| Arc::clone(&entry.value().callback))
            .collect();

        for callback in callbacks {
            callback(key, value);
        }
    }
}

/// Записать одно значение в запись настроек. Возвращает true, если значение изменилось.
pub fn apply_setting(settings: &mut Settings, key: SettingKey, value: &SettingValue) -> Result<bool> {
    let changed = match (key, value) {
        (SettingKey::UseMouseMonitor, SettingValue::Bool(v)) => {
            replace(&mut settings.use_mouse_monitor, *v)
        }
        (SettingKey::CurrentWorkspaceOnly, SettingValue::Bool(v)) => {
            replace(&mut settings.current_workspace_only, *v)
        }
        (SettingKey::PreventFocusOnOtherDisplays, SettingValue::Bool(v)) => {
            replace(&mut settings.prevent_focus_on_other_displays, *v)
        }
        (SettingKey::OtherMonitorsModifierKey, SettingValue::Str(v)) => {
            replace(&mut settings.other_monitors_modifier_key, v.clone())
        }
        (SettingKey::EnableDebugging, SettingValue::Bool(v)) => {
            replace(&mut settings.enable_debugging, *v)
        }
        (key, _) => {
            let expected = if key.is_bool() { "bool" } else { "string" };
            return Err(type_error(key, expected));
        }
    };
    Ok(changed)
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

fn type_error(key: SettingKey, expected: &'static str) -> SwitcherError {
    SwitcherError::SettingType {
        key: key.to_string(),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use strum::IntoEnumIterator;

    #[test]
    fn keys_use_kebab_case_names() {
        let names: Vec<String> = SettingKey::iter().map(|k| k.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "use-mouse-monitor",
                "current-workspace-only",
                "prevent-focus-on-other-displays",
                "other-monitors-modifier-key",
                "enable-debugging",
            ]
        );
        assert_eq!(
            SettingKey::from_str("use-mouse-monitor").ok(),
            Some(SettingKey::UseMouseMonitor)
        );
    }

    #[test]
    fn typed_reads() {
        let store = SettingsStore::new(Settings::default());
        assert_eq!(store.get_bool(SettingKey::CurrentWorkspaceOnly).ok(), Some(true));
        assert_eq!(store.get_string(SettingKey::OtherMonitorsModifierKey).ok(), Some(String::new()));
        assert!(store.get_bool(SettingKey::OtherMonitorsModifierKey).is_err());
        assert!(store.get_string(SettingKey::EnableDebugging).is_err());
    }

    #[test]
    fn subscribers_see_only_their_key_and_real_changes() {
        let store = SettingsStore::new(Settings::default());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        store.connect(SettingKey::UseMouseMonitor, move |key, value| {
            sink.lock().push((key, value.clone()));
        });

        store.set(SettingKey::UseMouseMonitor, SettingValue::Bool(true)).unwrap();
        store.set(SettingKey::UseMouseMonitor, SettingValue::Bool(true)).unwrap();
        store.set(SettingKey::EnableDebugging, SettingValue::Bool(true)).unwrap();

        assert_eq!(
            *seen.lock(),
            vec![(SettingKey::UseMouseMonitor, SettingValue::Bool(true))]
        );
        assert!(store.snapshot().use_mouse_monitor);
    }

    #[test]
    fn disconnected_callbacks_are_not_called() {
        let store = SettingsStore::new(Settings::default());
        let calls = Arc::new(AtomicU64::new(0));

        let counter = Arc::clone(&calls);
        let id = store.connect(SettingKey::EnableDebugging, move |_, _| {
            counter.fetch_add(1, Ordering::Relaxed);
        });
        assert_eq!(store.subscriber_count(), 1);
        assert!(store.disconnect(id));
        assert!(!store.disconnect(id));

        store.set(SettingKey::EnableDebugging, SettingValue::Bool(true)).unwrap();
        assert_eq!(calls.load(Ordering::Relaxed), 0);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn wrong_type_and_unknown_key_are_rejected() {
        let store = SettingsStore::new(Settings::default());
        assert!(store
            .set(SettingKey::UseMouseMonitor, SettingValue::Str("yes".into()))
            .is_err());
        assert!(matches!(
            store.set_by_name("show-everything", SettingValue::Bool(true)),
            Err(SwitcherError::UnknownSetting(_))
        ));
        store
            .set_by_name("other-monitors-modifier-key", SettingValue::Str("Shift".into()))
            .unwrap();
        assert_eq!(store.snapshot().other_monitors_modifier_key, "Shift");
    }
}
