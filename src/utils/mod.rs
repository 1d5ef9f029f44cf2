use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

static DEBUGGING: AtomicBool = AtomicBool::new(false);
static FILTER_TOGGLE: OnceCell<Box<dyn Fn(bool) + Send + Sync>> = OnceCell::new();

/// Зарегистрировать переключатель фильтра логов (ставится один раз при старте)
pub fn install_debug_toggle<F>(toggle: F)
where
    F: Fn(bool) + Send + Sync + 'static,
{
    let _ = FILTER_TOGGLE.set(Box::new(toggle));
}

/// Включить или выключить подробную диагностику (настройка enable-debugging)
pub fn set_debugging(enabled: bool) {
    let previous = DEBUGGING.swap(enabled, Ordering::Relaxed);
    if previous == enabled {
        return;
    }
    if let Some(toggle) = FILTER_TOGGLE.get() {
        toggle(enabled);
    }
    info!("Подробная диагностика {}", if enabled { "включена" } else { "выключена" });
}

pub fn debugging_enabled() -> bool {
    DEBUGGING.load(Ordering::Relaxed)
}

// ✅ Макросы условного логирования для оптимизации производительности
#[macro_export]
macro_rules! debug_if_enabled {
    ($($arg:tt)*) => {
        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!($($arg)*);
        }
    };
}
