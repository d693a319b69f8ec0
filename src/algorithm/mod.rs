// Módulo de alto nivel para el chequeo de conflictos por término
pub mod conflict;

pub use conflict::{
    courses_conflict, group_sections, is_online_section, scan_conflicts, ConflictKind,
    ConflictRecord, ConflictReport, CourseStatus, CourseStatusEntry, SectionSummary, YearReport,
};

use crate::catalog::CurriculumCatalog;
use crate::error::StoreError;
use crate::models::normalize_term;
use crate::store::ScheduleStore;

/// Término a usar, normalizado ("Spring 2027" -> "spring-2027"). Si viene
/// vacío o no se puede normalizar se usa el término por defecto.
pub fn resolve_term(requested: Option<&str>, default_term: &str) -> String {
    let Some(raw) = requested else {
        return default_term.to_string();
    };
    match normalize_term(raw) {
        Some(term) => term,
        None => {
            tracing::warn!(
                requested = raw,
                fallback = default_term,
                "invalid term, using default"
            );
            default_term.to_string()
        }
    }
}

/// Lee la foto actual del store y ejecuta el scanner. El único error posible
/// viene del store; el scanner en sí no falla.
pub fn conflict_report(
    store: &ScheduleStore,
    catalog: &CurriculumCatalog,
    requested_term: Option<&str>,
    default_term: &str,
) -> Result<ConflictReport, StoreError> {
    let term = resolve_term(requested_term, default_term);
    let sections = store.sections_for_term(&term)?;
    let report = scan_conflicts(&term, &sections, catalog);
    let total: usize = report.years.values().map(|y| y.conflicts.len()).sum();
    tracing::info!(
        term = %term,
        sections = sections.len(),
        conflicts = total,
        "conflict scan done"
    );
    Ok(report)
}
