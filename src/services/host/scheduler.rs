use crate::debug_if_enabled;
use crate::events::{HostEvent, Priority, TimerHandle};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use super::r#trait::Scheduler;

/// Одноразовые таймеры поверх задач tokio.
///
/// Каждая запись в `tasks` живёт до срабатывания или отмены. Срабатывание
/// доставляется в цикл хоста через канал событий.
pub struct TokioScheduler {
    events: mpsc::UnboundedSender<HostEvent>,
    tasks: Arc<DashMap<TimerHandle, JoinHandle<()>>>,
    next_handle: AtomicU64,
}

impl TokioScheduler {
    pub fn new(events: mpsc::UnboundedSender<HostEvent>) -> Self {
        Self {
            events,
            tasks: Arc::new(DashMap::new()),
            next_handle: AtomicU64::new(0),
        }
    }

    pub fn outstanding(&self) -> usize {
        self.tasks.len()
    }

    /// Отменить все таймеры (при остановке)
    pub fn cancel_all(&self) {
        let count = self.tasks.len();
        if count > 0 {
            info!("Отмена {} отложенных таймеров", count);

            let handles: Vec<TimerHandle> = self.tasks.iter().map(|entry| *entry.key()).collect();
            for handle in handles {
                if let Some((_, task)) = self.tasks.remove(&handle) {
                    task.abort();
                }
            }
        }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_once(&self, priority: Priority) -> TimerHandle {
        let handle = TimerHandle(self.next_handle.fetch_add(1, Ordering::Relaxed) + 1);
        let events = self.events.clone();
        let tasks = Arc::clone(&self.tasks);

        // Рантайм однопоточный: задача не стартует раньше, чем мы сохраним её JoinHandle
        let task = tokio::spawn(async move {
            if priority == Priority::Low {
                // Уступаем ход всем уже готовым задачам хоста
                tokio::task::yield_now().await;
            }
            tasks.remove(&handle);
            if events.send(HostEvent::TimerFired(handle)).is_err() {
                debug_if_enabled!("Цикл событий закрыт, {} потерян", handle);
            }
        });

        self.tasks.insert(handle, task);
        debug_if_enabled!("Запланирован {} ({:?})", handle, priority);
        handle
    }

    fn cancel(&self, handle: TimerHandle) -> bool {
        match self.tasks.remove(&handle) {
            Some((_, task)) => {
                let was_pending = !task.is_finished();
                task.abort();
                debug_if_enabled!("{} отменён", handle);
                was_pending
            }
            None => false,
        }
    }
}

/// Детерминированный планировщик для тестов: таймеры срабатывают только по команде.
#[cfg(test)]
#[derive(Default)]
pub struct ManualScheduler {
    next_handle: AtomicU64,
    pending: parking_lot::Mutex<Vec<(TimerHandle, Priority)>>,
    cancelled: parking_lot::Mutex<Vec<TimerHandle>>,
}

#[cfg(test)]
impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Vec<TimerHandle> {
        self.pending.lock().iter().map(|(handle, _)| *handle).collect()
    }

    pub fn priority_of(&self, handle: TimerHandle) -> Option<Priority> {
        self.pending
            .lock()
            .iter()
            .find(|(h, _)| *h == handle)
            .map(|(_, priority)| *priority)
    }

    pub fn cancelled(&self) -> Vec<TimerHandle> {
        self.cancelled.lock().clone()
    }

    /// Снять таймер с очереди как сработавший; возвращает false для неизвестного дескриптора
    pub fn fire(&self, handle: TimerHandle) -> bool {
        let mut pending = self.pending.lock();
        let before = pending.len();
        pending.retain(|(h, _)| *h != handle);
        pending.len() != before
    }
}

#[cfg(test)]
impl Scheduler for ManualScheduler {
    fn schedule_once(&self, priority: Priority) -> TimerHandle {
        let handle = TimerHandle(self.next_handle.fetch_add(1, Ordering::Relaxed) + 1);
        self.pending.lock().push((handle, priority));
        handle
    }

    fn cancel(&self, handle: TimerHandle) -> bool {
        let removed = self.fire(handle);
        if removed {
            self.cancelled.lock().push(handle);
        }
        removed
    }
}
