//! Status keyword decoration.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Normalized status keyword to display label.
///
/// Keys cover the Portuguese labels used by the forms and the English
/// identifiers stored by the services.
static STATUS_LABELS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let entries: &[(&[&str], &str)] = &[
        (&["pendente", "pending"], "⏳ Pendente"),
        (&["planejamento", "planning"], "📝 Planejamento"),
        (&["confirmado", "confirmed"], "📌 Confirmado"),
        (&["agendado", "scheduled"], "📅 Agendado"),
        (
            &["em_andamento", "em_progresso", "in_progress", "andamento"],
            "🔄 Em Andamento",
        ),
        (
            &["em_revisão", "em_revisao", "revisão", "revisao", "in_review", "review"],
            "👀 Em Revisão",
        ),
        (&["aprovado", "approved"], "👍 Aprovado"),
        (
            &["concluído", "concluido", "completed", "complete", "done"],
            "✅ Concluído",
        ),
        (&["atrasado", "late", "overdue"], "⚠️ Atrasado"),
        (&["cancelado", "cancelled", "canceled"], "❌ Cancelado"),
        (&["ativo", "active"], "🟢 Ativo"),
        (&["inativo", "inactive"], "⚪ Inativo"),
    ];
    entries
        .iter()
        .flat_map(|(keys, label)| keys.iter().map(move |key| (*key, *label)))
        .collect()
});

/// Lowercases, trims and folds spaces, hyphens and underscores to single `_`.
pub(crate) fn normalize(status: &str) -> String {
    status
        .trim()
        .to_lowercase()
        .split([' ', '-', '_'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Decorates a status keyword with its icon-prefixed label.
///
/// Lookup is case-insensitive and folds spaces and hyphens to underscores.
/// Unknown statuses are returned unchanged, which also makes the function a
/// no-op on its own output.
///
/// ```rust
/// use gonetwork::format::format_status;
///
/// assert_eq!(format_status("concluído"), "✅ Concluído");
/// assert_eq!(format_status("Em Andamento"), "🔄 Em Andamento");
/// assert_eq!(format_status("archived"), "archived");
/// ```
#[must_use]
pub fn format_status(status: &str) -> String {
    STATUS_LABELS
        .get(normalize(status).as_str())
        .map_or_else(|| status.to_string(), |label| (*label).to_string())
}
