// Estructuras de datos principales

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Catálogo cerrado de franjas semanales.
pub const SLOT_CATALOG: &[&str] = &[
    "MW-A", "MW-B", "MW-C", "MW-D", "MW-E",
    "TR-G", "TR-H", "TR-I", "TR-J", "TR-K",
    "M-EVE", "T-EVE", "W-EVE", "TR-EVE",
    "SAT", "ASYNCH",
];

pub fn is_known_slot(slot_id: &str) -> bool {
    SLOT_CATALOG.contains(&slot_id)
}

/// Una sección de curso tal como vive en el documento del horario.
///
/// `slot_id == None` significa "sin asignar". En el JSON tanto `null` como
/// la ausencia de la clave `slotId` terminan aquí como `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSection {
    pub id: String,
    pub code: String,
    pub number: String,
    pub section: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub days: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default)]
    pub instructor: String,
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub slot_id: Option<String>,
}

impl CourseSection {
    /// Código sin sección, p.ej. "ECON 205"
    pub fn course_code(&self) -> String {
        format!("{} {}", self.code.trim(), self.number.trim())
    }

    /// Franja asignada, ignorando strings vacíos
    pub fn assigned_slot(&self) -> Option<&str> {
        self.slot_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Documento plano persistido por término.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDocument {
    #[serde(default)]
    pub courses: Vec<CourseSection>,
    #[serde(default)]
    pub instructors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub faculty: Vec<String>,
    // El contenido de timeSlots lo define el front; sólo usamos las claves.
    #[serde(default)]
    pub time_slots: BTreeMap<String, serde_json::Value>,
}

impl ScheduleDocument {
    pub fn find_course_mut(&mut self, course_id: &str) -> Option<&mut CourseSection> {
        self.courses.iter_mut().find(|c| c.id == course_id)
    }

    /// True si la franja está en el catálogo fijo o declarada en `timeSlots`
    pub fn accepts_slot(&self, slot_id: &str) -> bool {
        is_known_slot(slot_id) || self.time_slots.contains_key(slot_id)
    }
}

/// Forma canónica del término: minúsculas y espacios como '-'
/// ("Spring 2027" -> "spring-2027"). `None` si queda vacío o trae algo que no
/// puede ir en el nombre de archivo del store ('/', '\\', '.', ...).
pub fn normalize_term(term: &str) -> Option<String> {
    let norm = term
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase();
    let usable = !norm.is_empty()
        && norm
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if usable { Some(norm) } else { None }
}

/// Semestre derivado del identificador del término.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Season {
    Fall,
    Spring,
}

impl Season {
    /// "fall" en cualquier parte del término (sin distinguir mayúsculas) => Fall
    pub fn from_term(term: &str) -> Season {
        if term.to_lowercase().contains("fall") {
            Season::Fall
        } else {
            Season::Spring
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Fall => "Fall",
            Season::Spring => "Spring",
        }
    }
}
