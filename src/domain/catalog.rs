//! Saved hierarchies.

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::domain::entities::{Hierarchy, WordItem};
use crate::domain::error::DomainError;

/// Whether a save created a new hierarchy or refreshed an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    Created,
    Updated,
}

/// Collection of saved hierarchies, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HierarchyCatalog {
    hierarchies: Vec<Hierarchy>,
}

impl HierarchyCatalog {
    pub fn new(hierarchies: Vec<Hierarchy>) -> Self {
        Self { hierarchies }
    }

    pub fn into_inner(self) -> Vec<Hierarchy> {
        self.hierarchies
    }

    /// Store `items` under `id`.
    ///
    /// An unknown id creates `Hierarchy <n>` at the front of the catalog;
    /// a known id replaces the items and refreshes `updated_at`.
    pub fn save(&mut self, id: Uuid, items: &[WordItem], now: DateTime<Utc>) -> SaveKind {
        if let Some(existing) = self.hierarchies.iter_mut().find(|h| h.id == id) {
            existing.updated_at = now;
            existing.items = items.to_vec();
            debug!("updated hierarchy {id}");
            return SaveKind::Updated;
        }

        let hierarchy = Hierarchy {
            id,
            name: format!("Hierarchy {}", self.hierarchies.len() + 1),
            created_at: now,
            updated_at: now,
            items: items.to_vec(),
        };
        debug!("created {} ({id})", hierarchy.name);
        self.hierarchies.insert(0, hierarchy);
        SaveKind::Created
    }

    /// Delete a hierarchy; returns whether it existed.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.hierarchies.len();
        self.hierarchies.retain(|h| h.id != id);
        before != self.hierarchies.len()
    }

    pub fn get(&self, id: Uuid) -> Option<&Hierarchy> {
        self.hierarchies.iter().find(|h| h.id == id)
    }

    /// Find the hierarchy whose id starts with `prefix`.
    pub fn resolve(&self, prefix: &str) -> Result<Uuid, DomainError> {
        let needle = prefix.trim().to_ascii_lowercase().replace('-', "");
        if needle.is_empty() {
            return Err(DomainError::HierarchyNotFound(prefix.to_string()));
        }
        let matches: Vec<Uuid> = self
            .hierarchies
            .iter()
            .map(|h| h.id)
            .filter(|id| id.simple().to_string().starts_with(&needle))
            .collect();
        match matches.as_slice() {
            [only] => Ok(*only),
            [] => Err(DomainError::HierarchyNotFound(prefix.to_string())),
            _ => Err(DomainError::AmbiguousHierarchy {
                reference: prefix.to_string(),
                matches: matches.len(),
            }),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hierarchy> {
        self.hierarchies.iter()
    }

    pub fn len(&self) -> usize {
        self.hierarchies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hierarchies.is_empty()
    }
}
