use thiserror::Error;

#[derive(Error, Debug)]
pub enum SwitcherError {
    #[error("Неизвестный ключ настроек: {0}")]
    UnknownSetting(String),

    #[error("Неверный тип значения для '{key}': ожидался {expected}")]
    SettingType { key: String, expected: &'static str },

    #[error("Ошибка хоста: {0}")]
    Host(String),

    #[error("Окно не найдено: {0}")]
    WindowNotFound(String),
}

pub type Result<T> = std::result::Result<T, SwitcherError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! switcher_error {
    (host, $($arg:tt)*) => {
        $crate::error::SwitcherError::Host(format!($($arg)*))
    };
    (window_not_found, $($arg:tt)*) => {
        $crate::error::SwitcherError::WindowNotFound(format!($($arg)*))
    };
    (unknown_setting, $($arg:tt)*) => {
        $crate::error::SwitcherError::UnknownSetting(format!($($arg)*))
    };
}
