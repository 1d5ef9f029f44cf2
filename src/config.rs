use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use crate::events::ModifierKey;

const MAX_MONITORS: u32 = 16;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Начальные значения постоянного хранилища настроек
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

/// Пользовательские настройки расширения. Имена ключей совпадают с ключами хранилища.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Settings {
    /// Текущий монитор определяется по указателю мыши, а не по окну с фокусом
    pub use_mouse_monitor: bool,
    pub current_workspace_only: bool,
    pub prevent_focus_on_other_displays: bool,
    /// Пустая строка отключает показ окон других мониторов
    pub other_monitors_modifier_key: String,
    pub enable_debugging: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            use_mouse_monitor: false,
            current_workspace_only: true,
            prevent_focus_on_other_displays: true,
            other_monitors_modifier_key: String::new(),
            enable_debugging: false,
        }
    }
}

/// Параметры встроенного симулятора рабочего стола
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationConfig {
    pub monitors: u32,
    pub monitor_width: i32,
    pub monitor_height: i32,
    pub workspaces: u32,
    pub step_interval_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            monitors: 2,
            monitor_width: 1920,
            monitor_height: 1080,
            workspaces: 2,
            step_interval_ms: 2000,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("ALTTAB_").split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "compact" | "full" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        // Неизвестный модификатор не фатален при работе, но в файле это явная опечатка
        let modifier = self.settings.other_monitors_modifier_key.trim();
        if !modifier.is_empty()
            && !modifier.eq_ignore_ascii_case("disabled")
            && ModifierKey::from_str(modifier).is_err()
        {
            anyhow::bail!("Неверный модификатор для других мониторов: '{}'", modifier);
        }

        // Валидация симулятора
        if self.simulation.monitors == 0 || self.simulation.monitors > MAX_MONITORS {
            anyhow::bail!("simulation.monitors должно быть от 1 до {}", MAX_MONITORS);
        }

        if self.simulation.workspaces == 0 {
            anyhow::bail!("simulation.workspaces должно быть больше 0");
        }

        if self.simulation.monitor_width <= 0 || self.simulation.monitor_height <= 0 {
            anyhow::bail!("Размеры монитора должны быть положительными");
        }

        if self.simulation.step_interval_ms < 100 {
            anyhow::bail!("simulation.step_interval_ms должно быть минимум 100");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_default_config_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(config.settings.current_workspace_only);
        assert!(config.settings.other_monitors_modifier_key.is_empty());
    }

    #[test]
    fn test_unknown_modifier_rejected() {
        let mut config = Config::default();
        config.settings.other_monitors_modifier_key = "Compose".to_string();
        assert!(config.validate().is_err());

        config.settings.other_monitors_modifier_key = "Caps Lock".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_monitor_count_bounds() {
        let mut config = Config::default();
        config.simulation.monitors = 0;
        assert!(config.validate().is_err());

        config.simulation.monitors = u32::MAX;
        assert!(config.validate().is_err());

        config.simulation.monitors = MAX_MONITORS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_merges_file_and_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "alttab.toml",
                r#"
                [logging]
                level = "debug"

                [settings]
                use-mouse-monitor = true
                other-monitors-modifier-key = "Shift"
                "#,
            )?;
            jail.set_env("ALTTAB_SIMULATION__WORKSPACES", "4");

            let config = Config::load("alttab.toml").map_err(|e| e.to_string())?;
            assert_eq!(config.logging.level, "debug");
            assert_eq!(config.logging.format, "compact");
            assert!(config.settings.use_mouse_monitor);
            assert!(config.settings.current_workspace_only);
            assert_eq!(config.settings.other_monitors_modifier_key, "Shift");
            assert_eq!(config.simulation.workspaces, 4);
            Ok(())
        });
    }
}
