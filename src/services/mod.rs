pub mod demo_script;
pub mod extension;
pub mod focus_restorer;
pub mod host;
pub mod modifier_state;
pub mod monitor_resolver;
pub mod mru_selector;
pub mod settings_store;
pub mod switcher;
pub mod window_filter;

pub use demo_script::DemoScript;
pub use extension::Extension;
pub use host::{HookRegistry, SimulatedHost, TokioScheduler};
pub use settings_store::SettingsStore;
