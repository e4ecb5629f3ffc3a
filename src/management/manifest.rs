use super::{BlobLayout, Stage};
use crate::{
    storage::{self, ObjectStore, StoreError},
    types::{FailedEntity, FailureTableRow},
};

/// Entities a stage gave up on, kept so the run can finish and report them.
#[derive(Debug, Clone)]
pub struct FailureManifest {
    stage: Stage,
    entries: Vec<FailedEntity>,
}

impl FailureManifest {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            entries: Vec::new(),
        }
    }

    pub fn add(&mut self, entity_id: &str, entity_name: &str, error: impl ToString) {
        self.entries.push(FailedEntity {
            stage: self.stage.to_string(),
            entity_id: entity_id.to_string(),
            entity_name: entity_name.to_string(),
            error: error.to_string(),
        });
    }

    pub fn has(&self, entity_id: &str) -> bool {
        self.entries.iter().any(|e| e.entity_id == entity_id)
    }

    pub fn entries(&self) -> &[FailedEntity] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn table_rows(&self) -> Vec<FailureTableRow> {
        self.entries
            .iter()
            .map(|e| FailureTableRow {
                id: e.entity_id.clone(),
                name: e.entity_name.clone(),
                error: e.error.clone(),
            })
            .collect()
    }

    /// Writes the manifest next to the stage output. Empty manifests are skipped.
    pub async fn persist<S: ObjectStore>(
        &self,
        store: &S,
        layout: &BlobLayout,
    ) -> Result<Option<String>, StoreError> {
        if self.is_empty() {
            return Ok(None);
        }
        let key = layout.failures(self.stage);
        storage::write_json(store, &key, &self.entries).await?;
        Ok(Some(key))
    }
}
