//! Difusión en memoria de los cambios del horario.
//!
//! Cada mutación del store publica un `ChangeEvent`; cualquier número de
//! observadores puede suscribirse. No hay garantías de orden ni de entrega más
//! allá de las del canal: el último que escribe gana.

use chrono::{DateTime, Local};
use futures_util::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::models::CourseSection;
use crate::store::CourseUpdate;

pub const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ChangeEvent {
    #[serde(rename_all = "camelCase")]
    ScheduleUpdate {
        term: String,
        course_id: String,
        slot_id: Option<String>,
        timestamp: DateTime<Local>,
    },
    #[serde(rename_all = "camelCase")]
    CourseUpdate {
        term: String,
        course_id: String,
        updates: CourseUpdate,
        timestamp: DateTime<Local>,
    },
    CourseAdded {
        term: String,
        course: CourseSection,
        timestamp: DateTime<Local>,
    },
    #[serde(rename_all = "camelCase")]
    CourseDeleted {
        term: String,
        course_id: String,
        timestamp: DateTime<Local>,
    },
    FacultyAdded {
        term: String,
        name: String,
        timestamp: DateTime<Local>,
    },
    FacultyDeleted {
        term: String,
        name: String,
        timestamp: DateTime<Local>,
    },
}

impl ChangeEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ChangeEvent::ScheduleUpdate { .. } => "schedule_update",
            ChangeEvent::CourseUpdate { .. } => "course_update",
            ChangeEvent::CourseAdded { .. } => "course_added",
            ChangeEvent::CourseDeleted { .. } => "course_deleted",
            ChangeEvent::FacultyAdded { .. } => "faculty_added",
            ChangeEvent::FacultyDeleted { .. } => "faculty_deleted",
        }
    }

    pub fn term(&self) -> &str {
        match self {
            ChangeEvent::ScheduleUpdate { term, .. }
            | ChangeEvent::CourseUpdate { term, .. }
            | ChangeEvent::CourseAdded { term, .. }
            | ChangeEvent::CourseDeleted { term, .. }
            | ChangeEvent::FacultyAdded { term, .. }
            | ChangeEvent::FacultyDeleted { term, .. } => term,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Broadcaster {
    tx: broadcast::Sender<ChangeEvent>,
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl Broadcaster {
    /// Capacidad 0 no es válida para el canal; se usa la de por defecto.
    pub fn new(capacity: usize) -> Self {
        let cap = if capacity == 0 { DEFAULT_CAPACITY } else { capacity };
        let (tx, _rx) = broadcast::channel(cap);
        Self { tx }
    }

    /// Envía el evento a todos los observadores. Devuelve cuántos lo recibieron;
    /// sin observadores no es un error.
    pub fn publish(&self, event: ChangeEvent) -> usize {
        let name = event.name();
        match self.tx.send(event) {
            Ok(n) => {
                tracing::debug!(event = name, receivers = n, "change broadcast");
                n
            }
            Err(_) => {
                tracing::debug!(event = name, "no observers for change");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }

    pub fn observer_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Stream de eventos para un observador nuevo. Si el observador se atrasa
    /// se saltan los eventos perdidos y se continúa.
    pub fn stream(&self) -> impl Stream<Item = ChangeEvent> + Send + 'static {
        stream::unfold(self.subscribe(), |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => return Some((ev, rx)),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "observer lagged, events dropped");
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
        })
    }
}
