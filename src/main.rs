use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
mod config;
mod error;
mod events;
mod services;
mod utils;

use config::{Config, LoggingConfig};
use events::{HostEvent, SwitcherKind};
use services::{DemoScript, Extension, HookRegistry, SettingsStore, SimulatedHost, TokioScheduler};

#[derive(Parser, Debug)]
#[command(name = "alttab-monitor")]
#[command(about = "Alt+Tab только по окнам текущего монитора, без кражи фокуса при смене рабочего стола")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "alttab.toml")]
    config: String,

    /// Уровень логирования (перекрывает logging.level из конфигурации)
    #[arg(long)]
    log_level: Option<String>,

    /// Остановиться после указанного числа шагов сценария
    #[arg(long)]
    steps: Option<u32>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Конфигурация нужна раньше логирования: из неё берётся формат вывода
    let config = Config::load(&args.config)?;
    init_tracing(&config.logging, args.log_level.as_deref())?;

    info!("Запуск alttab-monitor v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {}", args.config);

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();

    let host = Arc::new(SimulatedHost::new(&config.simulation).with_demo_windows());
    let scheduler = Arc::new(TokioScheduler::new(events_tx.clone()));
    let store = Arc::new(SettingsStore::new(config.settings.clone()));
    let hooks = Arc::new(HookRegistry::new());

    let mut extension = Extension::new(host.clone(), scheduler.clone(), store.clone(), hooks.clone());
    extension.enable();
    if let Some(settings) = extension.settings() {
        info!("Активные настройки: {:?}", settings);
    }

    let mut script = DemoScript::new(host.clone(), store.clone());
    let mut ticker = tokio::time::interval(Duration::from_millis(config.simulation.step_interval_ms));

    info!("Все компоненты инициализированы");

    let shutdown = signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            result = &mut shutdown => {
                match result {
                    Ok(()) => info!("Получен сигнал завершения (Ctrl+C)"),
                    Err(err) => error!("Ошибка при ожидании сигнала завершения: {}", err),
                }
                break;
            }
            Some(event) = events_rx.recv() => {
                dispatch(event, &host, &hooks, &extension);
            }
            _ = ticker.tick() => {
                if args.steps.is_some_and(|limit| script.steps_taken() >= limit as usize) {
                    info!("Сценарий выполнен ({} шагов)", script.steps_taken());
                    break;
                }
                for event in script.next_step() {
                    if events_tx.send(event).is_err() {
                        warn!("Очередь событий закрыта");
                    }
                }
            }
        }
    }

    info!("Завершение работы...");

    if extension.is_enabled() {
        extension.disable();
    }
    if hooks.is_installed() || store.subscriber_count() > 0 {
        warn!("После выключения остались перехватчики или подписки");
    }
    let outstanding = scheduler.outstanding();
    if outstanding > 0 {
        info!("Отменяем таймеров: {}", outstanding);
    }
    scheduler.cancel_all();

    info!("alttab-monitor завершил работу");
    Ok(())
}

/// Одно событие хоста за раз: решения никогда не выполняются параллельно
fn dispatch(event: HostEvent, host: &SimulatedHost, hooks: &HookRegistry, extension: &Extension) {
    match event {
        HostEvent::SwitcherRequested(kind) => {
            let windows = host.open_switcher(kind, hooks);
            let titles: Vec<&str> = windows.iter().map(|w| w.title.as_str()).collect();
            let label = match kind {
                SwitcherKind::Windows => "Переключатель окон",
                SwitcherKind::Cycler => "Циклический переключатель",
            };
            info!("{}: {:?}", label, titles);
        }
        HostEvent::WorkspaceSwitchRequested(workspace) => {
            if let Err(e) = host.switch_workspace(workspace, hooks) {
                warn!("Смена рабочего стола не удалась: {}", e);
            }
            debug_if_enabled!("Восстановление фокуса: {:?}", extension.restorer_state());
        }
        HostEvent::TimerFired(handle) => {
            if let Some(outcome) = extension.on_timer_fired(handle) {
                info!("Восстановление фокуса: {}", outcome);
            }
        }
    }

    for call in host.take_calls() {
        debug_if_enabled!("Вызов хоста: {:?}", call);
    }
}

fn init_tracing(logging: &LoggingConfig, override_level: Option<&str>) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

    let level = override_level.unwrap_or(&logging.level).to_string();
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&level))?;
    let (filter, handle) = reload::Layer::new(filter);

    let compact = (logging.format == "compact").then(|| tracing_subscriber::fmt::layer().compact());
    let full = (logging.format != "compact").then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(filter)
        .with(compact)
        .with(full)
        .init();

    // enable-debugging поднимает фильтр до debug и возвращает исходный уровень
    utils::install_debug_toggle(move |enabled| {
        let directive = if enabled { "debug" } else { level.as_str() };
        match EnvFilter::try_new(directive) {
            Ok(filter) => {
                if let Err(e) = handle.reload(filter) {
                    warn!("Не удалось перезагрузить фильтр логов: {}", e);
                }
            }
            Err(e) => warn!("Некорректный фильтр логов {}: {}", directive, e),
        }
    });

    Ok(())
}
