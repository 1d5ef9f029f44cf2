use serde::{Deserialize, Serialize};
use std::fmt;

/// Индекс монитора в терминах хоста
pub type MonitorIndex = i32;

/// Идентификатор окна, выданный хостом
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "win:{}", self.0)
    }
}

/// Индекс рабочего стола
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkspaceId(pub u32);

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ws:{}", self.0)
    }
}

/// Точка в координатах экрана
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Снимок окна глазами хоста. Только для чтения: мы никогда не меняем окна напрямую.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowInfo {
    pub id: WindowId,
    pub title: String,
    pub monitor: MonitorIndex,
    pub workspace: Option<WorkspaceId>,
    pub on_all_workspaces: bool,
    pub skip_taskbar: bool,
    pub attached_dialog: bool,
    pub transient_for: Option<WindowId>,
    /// Время последнего взаимодействия пользователя с окном
    pub user_time: u64,
}

impl WindowInfo {
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id: WindowId(id),
            title: title.into(),
            monitor: 0,
            workspace: None,
            on_all_workspaces: false,
            skip_taskbar: false,
            attached_dialog: false,
            transient_for: None,
            user_time: 0,
        }
    }

    pub fn on_monitor(mut self, monitor: MonitorIndex) -> Self {
        self.monitor = monitor;
        self
    }

    pub fn on_workspace(mut self, workspace: u32) -> Self {
        self.workspace = Some(WorkspaceId(workspace));
        self
    }

    pub fn sticky(mut self) -> Self {
        self.on_all_workspaces = true;
        self
    }

    pub fn skip_taskbar(mut self) -> Self {
        self.skip_taskbar = true;
        self
    }

    /// Пометить окно как прикреплённый диалог родителя `parent`
    pub fn attached_to(mut self, parent: u64) -> Self {
        self.attached_dialog = true;
        self.transient_for = Some(WindowId(parent));
        self
    }

    #[cfg(test)]
    pub fn with_user_time(mut self, user_time: u64) -> Self {
        self.user_time = user_time;
        self
    }

    /// Окно, видимое на всех рабочих столах, хост считает принадлежащим активному.
    pub fn is_on_workspace(&self, workspace: WorkspaceId) -> bool {
        self.on_all_workspaces || self.workspace == Some(workspace)
    }
}

impl fmt::Display for WindowInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" ({}, monitor {})", self.title, self.id, self.monitor)
    }
}

/// Набор окон, который хост отдаёт для рабочего стола
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TabListScope {
    /// Обычные окна, которые показывает переключатель
    Normal,
    /// Все окна, включая скрытые из панели задач (нужно для схлопывания диалогов)
    NormalAll,
}

/// Вид всплывающего переключателя, который запрашивает список окон
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwitcherKind {
    /// Alt+Tab: переключатель окон
    Windows,
    /// Alt+Esc: циклический переключатель
    Cycler,
}
