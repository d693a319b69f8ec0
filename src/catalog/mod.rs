//! Catálogo curricular: programa -> "Y1-Fall" -> códigos requeridos.
//!
//! Se carga una sola vez al iniciar el proceso y se pasa por referencia al
//! scanner de conflictos; nunca se modifica en tiempo de ejecución.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::error::CatalogError;
use crate::models::Season;

/// Niveles de año que recorre el scanner, en orden.
pub const YEAR_LEVELS: [&str; 4] = ["Y1", "Y2", "Y3", "Y4"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub name: String,
    #[serde(default)]
    pub semesters: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurriculumCatalog {
    pub programs: BTreeMap<String, Program>,
}

/// "Y2" + Spring -> "Y2-Spring"
pub fn semester_key(year: &str, season: Season) -> String {
    format!("{}-{}", year, season.as_str())
}

impl CurriculumCatalog {
    pub fn from_json_str(s: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json_str(&text)?;
        tracing::info!(programs = catalog.programs.len(), path = %path.display(), "catalog loaded");
        Ok(catalog)
    }

    /// Unión sin duplicados de los códigos que cualquier programa exige para
    /// ese año/semestre. Códigos vacíos se descartan.
    pub fn pooled_courses(&self, year: &str, season: Season) -> BTreeSet<String> {
        let key = semester_key(year, season);
        self.programs
            .values()
            .filter_map(|p| p.semesters.get(&key))
            .flatten()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect()
    }
}
