// Biblioteca raíz del crate `quickslot`.
// Horario colaborativo de secciones: store en JSON plano, difusión de cambios
// y chequeo de conflictos de cursos requeridos por programa.
pub mod algorithm;
pub mod broadcast;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod store;

pub use algorithm::{conflict_report, resolve_term, scan_conflicts};
pub use broadcast::{Broadcaster, ChangeEvent};
pub use catalog::CurriculumCatalog;
pub use config::Config;
pub use error::{CatalogError, StoreError};
pub use store::ScheduleStore;
