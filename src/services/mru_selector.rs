use crate::events::{WindowId, WindowInfo};
use std::collections::HashSet;

/// Заменить прикреплённые диалоги их родителями и убрать повторы.
///
/// Родитель ищется через `resolve_parent`; если его нет, диалог остаётся сам собой.
/// Порядок первого появления сохраняется.
pub fn collapse_dialogs<F>(windows: &[WindowInfo], resolve_parent: F) -> Vec<WindowInfo>
where
    F: Fn(WindowId) -> Option<WindowInfo>,
{
    let mut seen = HashSet::with_capacity(windows.len());
    let mut collapsed = Vec::with_capacity(windows.len());

    for window in windows {
        let candidate = if window.attached_dialog {
            window
                .transient_for
                .and_then(|parent| {
                    windows
                        .iter()
                        .find(|w| w.id == parent)
                        .cloned()
                        .or_else(|| resolve_parent(parent))
                })
                .unwrap_or_else(|| window.clone())
        } else {
            window.clone()
        };

        if seen.insert(candidate.id) {
            collapsed.push(candidate);
        }
    }

    collapsed
}

/// Самое свежее окно по времени последнего взаимодействия.
///
/// Окна, скрытые из панели задач, не участвуют. При равных метках побеждает
/// окно, стоявшее раньше во входном списке.
pub fn select_most_recently_used(windows: &[WindowInfo]) -> Option<&WindowInfo> {
    let mut candidates: Vec<&WindowInfo> = windows.iter().filter(|w| !w.skip_taskbar).collect();
    // sort_by стабилен
    candidates.sort_by(|a, b| b.user_time.cmp(&a.user_time));
    candidates.into_iter().next()
}
