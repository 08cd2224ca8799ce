use super::ChangeSet;
use crate::error::QuoteError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A user correction of one field of one machine's form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modification {
    pub template_id: i64,
    pub field_key: String,
    pub original_value: String,
    pub new_value: String,
    pub reason: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
}

pub fn build_modifications(
    template_id: i64,
    changes: &ChangeSet,
    reason: &str,
    author: &str,
    timestamp: DateTime<Utc>,
) -> Vec<Modification> {
    changes
        .iter()
        .map(|(key, change)| Modification {
            template_id,
            field_key: key.clone(),
            original_value: change.original_value.clone(),
            new_value: change.new_value.clone(),
            reason: reason.to_string(),
            author: author.to_string(),
            timestamp,
        })
        .collect()
}

/// Persistence for modifications.
///
/// Implementations keep at most one row per (template_id, field_key); a
/// repeated edit replaces the previous row.
pub trait ModificationSink {
    fn upsert(&mut self, modification: Modification) -> Result<(), QuoteError>;

    fn upsert_all(&mut self, modifications: Vec<Modification>) -> Result<usize, QuoteError> {
        let count = modifications.len();
        for m in modifications {
            self.upsert(m)?;
        }
        Ok(count)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryModificationStore {
    rows: BTreeMap<(i64, String), Modification>,
}

impl InMemoryModificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, template_id: i64, field_key: &str) -> Option<&Modification> {
        self.rows.get(&(template_id, field_key.to_string()))
    }

    pub fn for_template(&self, template_id: i64) -> impl Iterator<Item = &Modification> {
        self.rows
            .range((template_id, String::new())..)
            .take_while(move |((id, _), _)| *id == template_id)
            .map(|(_, m)| m)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl ModificationSink for InMemoryModificationStore {
    fn upsert(&mut self, modification: Modification) -> Result<(), QuoteError> {
        let key = (modification.template_id, modification.field_key.clone());
        self.rows.insert(key, modification);
        Ok(())
    }
}
