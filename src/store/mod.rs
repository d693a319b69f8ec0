//! Persistencia plana del horario: un documento JSON por término.
//!
//! Cada operación lee el documento, lo modifica, lo vuelve a escribir y
//! publica el cambio. No hay bloqueo ni transacciones: el último que escribe
//! gana.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::broadcast::{Broadcaster, ChangeEvent};
use crate::error::StoreError;
use crate::models::{normalize_term, CourseSection, ScheduleDocument};

/// Campos editables de un curso; sólo se aplican los presentes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

impl CourseUpdate {
    pub fn is_empty(&self) -> bool {
        *self == CourseUpdate::default()
    }

    fn apply_to(&self, course: &mut CourseSection) {
        let fields = [
            (&self.name, &mut course.name),
            (&self.instructor, &mut course.instructor),
            (&self.room, &mut course.room),
            (&self.days, &mut course.days),
            (&self.start_time, &mut course.start_time),
            (&self.end_time, &mut course.end_time),
        ];
        for (value, target) in fields {
            if let Some(v) = value {
                *target = v.clone();
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourse {
    pub code: String,
    pub number: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub instructor: String,
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub slot_id: Option<String>,
}

/// Acciones que el cliente envía para deshacer un cambio anterior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum UndoAction {
    #[serde(rename_all = "camelCase")]
    Move {
        course_id: String,
        slot_id: Option<String>,
        #[serde(default)]
        room: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Update {
        course_id: String,
        #[serde(default)]
        updates: CourseUpdate,
    },
    #[serde(rename_all = "camelCase")]
    Delete { course_id: String },
}

#[derive(Debug, Clone)]
pub struct JsonExport {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct ScheduleStore {
    data_dir: PathBuf,
    broadcaster: Broadcaster,
}

impl ScheduleStore {
    pub fn new<P: AsRef<Path>>(data_dir: P, broadcaster: Broadcaster) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            broadcaster,
        }
    }

    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    /// Archivo del término. El término se normaliza igual que en
    /// `resolve_term`; uno vacío o con separadores de ruta es `Invalid`.
    pub fn term_path(&self, term: &str) -> Result<PathBuf, StoreError> {
        let norm = normalize_term(term)
            .ok_or_else(|| StoreError::Invalid(format!("invalid term: {:?}", term)))?;
        Ok(self.data_dir.join(format!("schedule_{}.json", norm)))
    }

    /// Documento del término; si el archivo no existe se devuelve uno vacío.
    pub fn load(&self, term: &str) -> Result<ScheduleDocument, StoreError> {
        let path = self.term_path(term)?;
        let text = match std::fs::read_to_string(&path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(term, "no schedule file yet, using empty document");
                return Ok(ScheduleDocument::default());
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        if text.trim().is_empty() {
            return Ok(ScheduleDocument::default());
        }
        serde_json::from_str(&text).map_err(|source| StoreError::Corrupt { path, source })
    }

    pub fn save(&self, term: &str, doc: &ScheduleDocument) -> Result<(), StoreError> {
        let path = self.term_path(term)?;
        std::fs::create_dir_all(&self.data_dir).map_err(|source| StoreError::Io {
            path: self.data_dir.clone(),
            source,
        })?;
        let text = serde_json::to_string_pretty(doc)?;
        std::fs::write(&path, text).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(
            term,
            courses = doc.courses.len(),
            path = %path.display(),
            "schedule saved"
        );
        Ok(())
    }

    /// Todas las secciones del término (entrada del scanner de conflictos)
    pub fn sections_for_term(&self, term: &str) -> Result<Vec<CourseSection>, StoreError> {
        Ok(self.load(term)?.courses)
    }

    pub fn move_course(
        &self,
        term: &str,
        course_id: &str,
        slot_id: Option<String>,
    ) -> Result<(), StoreError> {
        let mut doc = self.load(term)?;
        let slot_id = slot_id.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        if let Some(slot) = slot_id.as_deref() {
            if !doc.accepts_slot(slot) {
                return Err(StoreError::UnknownSlot(slot.to_string()));
            }
        }
        let course = doc
            .find_course_mut(course_id)
            .ok_or_else(|| StoreError::CourseNotFound(course_id.to_string()))?;
        course.slot_id = slot_id.clone();
        self.save(term, &doc)?;
        tracing::info!(term, course_id, slot = ?slot_id, "course moved");

        self.broadcaster.publish(ChangeEvent::ScheduleUpdate {
            term: term.to_string(),
            course_id: course_id.to_string(),
            slot_id,
            timestamp: Local::now(),
        });
        Ok(())
    }

    pub fn update_course(
        &self,
        term: &str,
        course_id: &str,
        updates: CourseUpdate,
    ) -> Result<(), StoreError> {
        let mut doc = self.load(term)?;
        let course = doc
            .find_course_mut(course_id)
            .ok_or_else(|| StoreError::CourseNotFound(course_id.to_string()))?;
        updates.apply_to(course);
        self.save(term, &doc)?;
        tracing::info!(term, course_id, "course updated");

        self.broadcaster.publish(ChangeEvent::CourseUpdate {
            term: term.to_string(),
            course_id: course_id.to_string(),
            updates,
            timestamp: Local::now(),
        });
        Ok(())
    }

    /// Agrega una sección nueva; el número de sección es el siguiente al mayor
    /// numérico existente para el mismo (code, number).
    pub fn add_course(&self, term: &str, new: NewCourse) -> Result<CourseSection, StoreError> {
        let code = new.code.trim().to_uppercase();
        let number = new.number.trim().to_string();
        if code.is_empty() || number.is_empty() {
            return Err(StoreError::Invalid("code and number are required".to_string()));
        }
        let slot_id = new.slot_id.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

        let mut doc = self.load(term)?;
        if let Some(slot) = slot_id.as_deref() {
            if !doc.accepts_slot(slot) {
                return Err(StoreError::UnknownSlot(slot.to_string()));
            }
        }

        let next_section = next_section_number(&doc.courses, &code, &number).to_string();
        let course = CourseSection {
            id: format!("{}-{}-{}", code, number, next_section),
            code,
            number,
            section: next_section,
            name: new.name,
            days: String::new(),
            start_time: String::new(),
            end_time: String::new(),
            instructor: new.instructor,
            room: new.room,
            slot_id,
        };
        doc.courses.push(course.clone());
        self.save(term, &doc)?;
        tracing::info!(term, course_id = %course.id, "course added");

        self.broadcaster.publish(ChangeEvent::CourseAdded {
            term: term.to_string(),
            course: course.clone(),
            timestamp: Local::now(),
        });
        Ok(course)
    }

    pub fn delete_course(&self, term: &str, course_id: &str) -> Result<(), StoreError> {
        let mut doc = self.load(term)?;
        let before = doc.courses.len();
        doc.courses.retain(|c| c.id != course_id);
        if doc.courses.len() == before {
            return Err(StoreError::CourseNotFound(course_id.to_string()));
        }
        self.save(term, &doc)?;
        tracing::info!(term, course_id, "course deleted");

        self.broadcaster.publish(ChangeEvent::CourseDeleted {
            term: term.to_string(),
            course_id: course_id.to_string(),
            timestamp: Local::now(),
        });
        Ok(())
    }

    pub fn faculty(&self, term: &str) -> Result<Vec<String>, StoreError> {
        Ok(self.load(term)?.faculty)
    }

    /// Devuelve `true` si el nombre no estaba y se agregó.
    pub fn add_faculty(&self, term: &str, name: &str) -> Result<bool, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::Invalid("name is required".to_string()));
        }
        let mut doc = self.load(term)?;
        if doc.faculty.iter().any(|f| f == name) {
            return Ok(false);
        }
        doc.faculty.push(name.to_string());
        doc.faculty.sort();
        self.save(term, &doc)?;

        self.broadcaster.publish(ChangeEvent::FacultyAdded {
            term: term.to_string(),
            name: name.to_string(),
            timestamp: Local::now(),
        });
        Ok(true)
    }

    /// Devuelve `true` si el nombre existía y se eliminó.
    pub fn delete_faculty(&self, term: &str, name: &str) -> Result<bool, StoreError> {
        let mut doc = self.load(term)?;
        let before = doc.faculty.len();
        doc.faculty.retain(|f| f != name);
        if doc.faculty.len() == before {
            return Ok(false);
        }
        self.save(term, &doc)?;

        self.broadcaster.publish(ChangeEvent::FacultyDeleted {
            term: term.to_string(),
            name: name.to_string(),
            timestamp: Local::now(),
        });
        Ok(true)
    }

    /// Deshacer restaura el estado previo tal cual lo manda el cliente; la
    /// franja no se valida contra el catálogo.
    pub fn undo(&self, term: &str, action: UndoAction) -> Result<(), StoreError> {
        match action {
            UndoAction::Move { course_id, slot_id, room } => {
                let mut doc = self.load(term)?;
                let course = doc
                    .find_course_mut(&course_id)
                    .ok_or_else(|| StoreError::CourseNotFound(course_id.clone()))?;
                course.slot_id = slot_id.clone();
                if let Some(r) = room {
                    course.room = r;
                }
                self.save(term, &doc)?;
                tracing::info!(term, course_id = %course_id, "move undone");

                self.broadcaster.publish(ChangeEvent::ScheduleUpdate {
                    term: term.to_string(),
                    course_id,
                    slot_id,
                    timestamp: Local::now(),
                });
                Ok(())
            }
            UndoAction::Update { course_id, updates } => {
                self.update_course(term, &course_id, updates)
            }
            UndoAction::Delete { course_id } => self.delete_course(term, &course_id),
        }
    }

    /// JSON del término listo para descargar, con nombre fechado.
    pub fn export_json(&self, term: &str) -> Result<JsonExport, StoreError> {
        let doc = self.load(term)?;
        let bytes = serde_json::to_vec_pretty(&doc)?;
        let file_name = format!("schedule_{}.json", Local::now().format("%Y%m%d_%H%M%S"));
        Ok(JsonExport { file_name, bytes })
    }
}

/// Mayor sección numérica + 1 para (code, number); las no numéricas se ignoran.
pub fn next_section_number(courses: &[CourseSection], code: &str, number: &str) -> u32 {
    courses
        .iter()
        .filter(|c| c.code == code && c.number == number)
        .filter_map(|c| c.section.trim().parse::<u32>().ok())
        .max()
        .unwrap_or(0)
        .saturating_add(1)
}
