// Detección de conflictos entre cursos requeridos del mismo año/semestre.
//
// Para cada término se agrupan las secciones con franja asignada por código
// ("DEPT NUMBER"), se juntan los códigos que exige cualquier programa en cada
// año y se revisa cada par de códigos buscando si existe alguna combinación de
// secciones presenciales que no choque.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::{CurriculumCatalog, YEAR_LEVELS};
use crate::models::{CourseSection, Season};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CourseStatus {
    NotScheduled,
    Scheduled,
    Conflict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictKind {
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSummary {
    pub section: String,
    pub slot: String,
    pub instructor: String,
    pub room: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseStatusEntry {
    pub scheduled: bool,
    pub status: CourseStatus,
    pub sections: Vec<SectionSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictRecord {
    pub courses: [String; 2],
    pub message: String,
    #[serde(rename = "type")]
    pub kind: ConflictKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearReport {
    pub label: String,
    /// Conjunto de códigos; el orden no tiene significado
    pub courses: Vec<String>,
    pub course_status: BTreeMap<String, CourseStatusEntry>,
    pub conflicts: Vec<ConflictRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictReport {
    pub term: String,
    pub semester: String,
    /// "Y1".."Y4"; los años sin cursos requeridos no aparecen
    pub years: BTreeMap<String, YearReport>,
}

/// True si la sección no cuenta para choques físicos: sala con "ONLINE" o
/// franja con "ASYNCH" (sin distinguir mayúsculas).
pub fn is_online_section(section: &CourseSection) -> bool {
    let room = section.room.to_uppercase();
    let slot = section.slot_id.as_deref().unwrap_or("").to_uppercase();
    room.contains("ONLINE") || slot.contains("ASYNCH")
}

/// Código -> secciones con franja asignada. Las secciones sin franja no entran.
pub fn group_sections(sections: &[CourseSection]) -> BTreeMap<String, Vec<&CourseSection>> {
    let mut grouped: BTreeMap<String, Vec<&CourseSection>> = BTreeMap::new();
    for s in sections.iter() {
        if s.assigned_slot().is_some() {
            grouped.entry(s.course_code()).or_default().push(s);
        }
    }
    grouped
}

/// True si los dos cursos no tienen ninguna combinación de secciones que
/// evite el choque.
///
/// `all_conflict` se apaga con cualquier par online o con cualquier par en
/// franjas distintas; `has_any_clash` se enciende con cualquier par presencial
/// en la misma franja. Ambos son folds AND/OR, así que el orden de recorrido
/// no cambia el resultado.
pub fn courses_conflict(a: &[&CourseSection], b: &[&CourseSection]) -> bool {
    let mut has_any_clash = false;
    let mut all_conflict = true;
    for s1 in a.iter() {
        for s2 in b.iter() {
            if is_online_section(s1) || is_online_section(s2) {
                all_conflict = false;
                continue;
            }
            if s1.assigned_slot() == s2.assigned_slot() {
                has_any_clash = true;
            } else {
                all_conflict = false;
            }
        }
    }
    has_any_clash && all_conflict
}

fn summarize(s: &CourseSection) -> SectionSummary {
    SectionSummary {
        section: s.section.clone(),
        slot: s.slot_id.clone().unwrap_or_default(),
        instructor: s.instructor.clone(),
        room: s.room.clone(),
    }
}

fn scan_year(
    label: String,
    pooled: &BTreeSet<String>,
    grouped: &BTreeMap<String, Vec<&CourseSection>>,
) -> YearReport {
    let mut course_status: BTreeMap<String, CourseStatusEntry> = BTreeMap::new();
    for code in pooled.iter() {
        let secs = grouped.get(code).map(Vec::as_slice).unwrap_or(&[]);
        let status = if secs.is_empty() {
            CourseStatus::NotScheduled
        } else {
            CourseStatus::Scheduled
        };
        course_status.insert(code.clone(), CourseStatusEntry {
            scheduled: !secs.is_empty(),
            status,
            sections: secs.iter().map(|s| summarize(s)).collect(),
        });
    }

    // Sólo los códigos con al menos una sección participan en pares
    let with_sections: Vec<(&String, &Vec<&CourseSection>)> = pooled
        .iter()
        .filter_map(|c| grouped.get(c).map(|v| (c, v)))
        .collect();

    let mut conflicts: Vec<ConflictRecord> = Vec::new();
    for (i, (code_a, secs_a)) in with_sections.iter().enumerate() {
        for (code_b, secs_b) in with_sections.iter().skip(i + 1) {
            if !courses_conflict(secs_a, secs_b) {
                continue;
            }
            for code in [code_a, code_b] {
                if let Some(entry) = course_status.get_mut(*code) {
                    entry.status = CourseStatus::Conflict;
                }
            }
            conflicts.push(ConflictRecord {
                courses: [(*code_a).clone(), (*code_b).clone()],
                message: format!(
                    "{} and {} cannot both be taken: every in-person section \
                     combination meets in the same slot",
                    code_a, code_b
                ),
                kind: ConflictKind::Critical,
            });
        }
    }

    YearReport {
        label,
        courses: pooled.iter().cloned().collect(),
        course_status,
        conflicts,
    }
}

/// Calcula el reporte de conflictos del término. Función pura: no hace IO ni
/// falla; entradas vacías producen reportes vacíos o `not-scheduled`.
pub fn scan_conflicts(
    term: &str,
    sections: &[CourseSection],
    catalog: &CurriculumCatalog,
) -> ConflictReport {
    let season = Season::from_term(term);
    let grouped = group_sections(sections);

    let mut years: BTreeMap<String, YearReport> = BTreeMap::new();
    for year in YEAR_LEVELS {
        let pooled = catalog.pooled_courses(year, season);
        if pooled.is_empty() {
            continue;
        }
        let label = format!("Year {} - {}", year.trim_start_matches('Y'), season.as_str());
        years.insert(year.to_string(), scan_year(label, &pooled, &grouped));
    }

    ConflictReport {
        term: term.to_string(),
        semester: season.as_str().to_string(),
        years,
    }
}
