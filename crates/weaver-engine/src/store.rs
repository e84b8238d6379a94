//! Project store with key/value persistence.
//!
//! Projects are named snapshots of a code bundle and the prompt that produced
//! it. The store keeps them in memory and rewrites the whole list under a
//! single storage key after every mutation.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::bundle::CodeBundle;
use crate::constants::storage::PROJECTS_KEY;
use crate::storage::{KeyValueStorage, StorageError};

/// Error types for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The in-memory change was applied but could not be written out
    #[error("Failed to persist projects: {0}")]
    Persist(#[from] StorageError),

    #[error("Failed to load projects: {0}")]
    Load(String),

    #[error("Failed to serialize projects: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A persisted snapshot.
///
/// Serialized flat: `{"id","name","html","css","js","prompt"}` for multi-file
/// code, `{"id","name","component","css","prompt"}` for a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub code: CodeBundle,
    pub prompt: String,
}

/// Display order: id descending, numeric when both ids are numeric.
fn newest_first(a: &Project, b: &Project) -> Ordering {
    match (a.id.parse::<u128>(), b.id.parse::<u128>()) {
        (Ok(x), Ok(y)) => y.cmp(&x),
        _ => b.id.cmp(&a.id),
    }
}

/// In-memory project list backed by a key/value store.
pub struct ProjectStore {
    projects: Vec<Project>,
    storage: Box<dyn KeyValueStorage>,
}

impl ProjectStore {
    /// Create an empty store over `storage`. Call [`load`](Self::load) to
    /// read what is already persisted.
    pub fn new(storage: Box<dyn KeyValueStorage>) -> Self {
        Self {
            projects: Vec::new(),
            storage,
        }
    }

    /// Replace the in-memory list with the persisted one.
    ///
    /// Returns the number of projects loaded. An unreadable or corrupt value
    /// leaves the store empty and is returned as [`StoreError::Load`].
    pub fn load(&mut self) -> Result<usize, StoreError> {
        self.projects.clear();

        let raw = match self.storage.get(PROJECTS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(0),
            Err(e) => {
                log::warn!("Could not read stored projects: {}", e);
                return Err(StoreError::Load(e.to_string()));
            }
        };

        match serde_json::from_str::<Vec<Project>>(&raw) {
            Ok(projects) => {
                self.projects = projects;
                log::info!("Loaded {} projects", self.projects.len());
                Ok(self.projects.len())
            }
            Err(e) => {
                log::warn!("Stored projects are corrupt, starting empty: {}", e);
                Err(StoreError::Load(e.to_string()))
            }
        }
    }

    fn persist(&self) -> Result<(), StoreError> {
        let content = serde_json::to_string(&self.projects)?;
        self.storage.set(PROJECTS_KEY, &content)?;
        log::debug!("Persisted {} projects", self.projects.len());
        Ok(())
    }

    /// A fresh time-derived id, bumped past any id already in use
    pub fn next_id(&self) -> String {
        let mut candidate = chrono::Utc::now().timestamp_millis();
        while self.contains(&candidate.to_string()) {
            candidate += 1;
        }
        candidate.to_string()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn get(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// All projects, newest first
    pub fn list(&self) -> Vec<&Project> {
        let mut list: Vec<&Project> = self.projects.iter().collect();
        list.sort_by(|a, b| newest_first(a, b));
        list
    }

    // =========================================================================
    // Mutations
    //
    // Each applies in memory first, then writes the full list. A failed write
    // is returned without undoing the in-memory change.
    // =========================================================================

    /// Build a snapshot with a fresh id; it is not stored until
    /// [`insert`](Self::insert)
    pub fn new_project(&self, name: &str, code: CodeBundle, prompt: &str) -> Project {
        Project {
            id: self.next_id(),
            name: name.to_string(),
            code,
            prompt: prompt.to_string(),
        }
    }

    /// Add a snapshot
    pub fn insert(&mut self, project: Project) -> Result<(), StoreError> {
        log::info!("Created project '{}' ({})", project.name, project.id);
        self.projects.push(project);
        self.persist()
    }

    /// Overwrite the code and prompt of an existing snapshot, keeping its
    /// id and name. Returns `None` if no project has `id`.
    pub fn update(
        &mut self,
        id: &str,
        code: CodeBundle,
        prompt: &str,
    ) -> Result<Option<Project>, StoreError> {
        let Some(project) = self.projects.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        project.code = code;
        project.prompt = prompt.to_string();
        let updated = project.clone();
        log::info!("Updated project '{}' ({})", updated.name, updated.id);
        self.persist()?;
        Ok(Some(updated))
    }

    /// Change a snapshot's name. Returns `None` if no project has `id`.
    pub fn rename(&mut self, id: &str, name: &str) -> Result<Option<Project>, StoreError> {
        let Some(project) = self.projects.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        project.name = name.to_string();
        let renamed = project.clone();
        self.persist()?;
        Ok(Some(renamed))
    }

    /// Delete a snapshot. Returns the removed project, `None` if absent.
    pub fn remove(&mut self, id: &str) -> Result<Option<Project>, StoreError> {
        let Some(index) = self.projects.iter().position(|p| p.id == id) else {
            return Ok(None);
        };
        let removed = self.projects.remove(index);
        log::info!("Deleted project '{}' ({})", removed.name, removed.id);
        self.persist()?;
        Ok(Some(removed))
    }
}

impl std::fmt::Debug for ProjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectStore")
            .field("projects", &self.projects.len())
            .finish_non_exhaustive()
    }
}
