use crate::events::{ModifierKey, ModifierMask};
use std::str::FromStr;
use tracing::warn;

/// Разобрать настройку модификатора. `None` означает, что функция выключена
/// или имя не распознано (в этом случае пишем предупреждение).
pub fn parse_override_modifier(configured: &str) -> Option<ModifierKey> {
    let name = configured.trim();
    if name.is_empty() || name.eq_ignore_ascii_case("disabled") {
        return None;
    }

    match ModifierKey::from_str(name) {
        Ok(key) => Some(key),
        Err(_) => {
            warn!("Неизвестный модификатор '{}', показ других мониторов отключён", name);
            None
        }
    }
}

/// Зажат ли модификатор, переворачивающий фильтр мониторов
pub fn is_override_active(live: ModifierMask, configured: &str) -> bool {
    parse_override_modifier(configured).is_some_and(|key| live.contains(key.mask()))
}
