//! Prompt library: saved prompts with usage counts.
//!
//! Entries live in memory behind one `RwLock`. A library can be loaded from
//! and written back to a JSON file so the CLI keeps entries across runs.

use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

const MOST_USED_LIMIT: usize = 5;

/// Input for [`PromptLibrary::save`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavePrompt {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub optimized_prompt: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl SavePrompt {
    pub fn new(name: impl Into<String>, optimized_prompt: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            optimized_prompt: optimized_prompt.into(),
            tags: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryEntry {
    pub id: String,
    pub name: String,
    pub description: String,
    pub optimized_prompt: String,
    pub tags: Vec<String>,
    /// Unix seconds.
    pub created_at: f64,
    pub usage_count: u64,
    /// Insertion order; newer entries have larger values.
    #[serde(default)]
    serial: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageSummary {
    pub name: String,
    pub usage_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageStats {
    pub total_prompts: usize,
    pub total_usage: u64,
    pub average_usage: f64,
    pub most_used_prompts: Vec<UsageSummary>,
}

#[derive(Default)]
pub struct PromptLibrary {
    entries: RwLock<HashMap<String, LibraryEntry>>,
    next_serial: AtomicU64,
}

fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

fn not_found(id: &str) -> Error {
    Error::not_found_with_context(
        format!("prompt '{}' not found", id),
        ErrorContext::new()
            .with_field_path("id")
            .with_source("prompt_library"),
    )
}

impl PromptLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a library file. A missing file yields an empty library.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "library file not found, starting empty");
            return Ok(Self::new());
        }
        let raw = std::fs::read_to_string(path)?;
        let entries: Vec<LibraryEntry> = serde_json::from_str(&raw)?;
        let next = entries.iter().map(|e| e.serial + 1).max().unwrap_or(0);
        Ok(Self {
            entries: RwLock::new(entries.into_iter().map(|e| (e.id.clone(), e)).collect()),
            next_serial: AtomicU64::new(next),
        })
    }

    /// Write every entry, newest first, to `path`.
    pub fn persist(&self, path: impl AsRef<Path>) -> Result<()> {
        let raw = serde_json::to_string_pretty(&self.list())?;
        std::fs::write(path.as_ref(), raw)?;
        Ok(())
    }

    pub fn save(&self, prompt: SavePrompt) -> Result<LibraryEntry> {
        if prompt.name.trim().is_empty() {
            return Err(Error::validation_with_context(
                "prompt name is required",
                ErrorContext::new()
                    .with_field_path("name")
                    .with_source("prompt_library"),
            ));
        }
        if prompt.optimized_prompt.trim().is_empty() {
            return Err(Error::validation_with_context(
                "optimized prompt is required",
                ErrorContext::new()
                    .with_field_path("optimized_prompt")
                    .with_source("prompt_library"),
            ));
        }

        let serial = self.next_serial.fetch_add(1, Ordering::SeqCst);
        let created_at = unix_now();
        let entry = LibraryEntry {
            id: format!("prompt_{}_{}", created_at as u64, serial),
            name: prompt.name,
            description: prompt.description,
            optimized_prompt: prompt.optimized_prompt,
            tags: prompt.tags,
            created_at,
            usage_count: 0,
            serial,
        };
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(entry.id.clone(), entry.clone());
        info!(id = %entry.id, name = %entry.name, "prompt saved");
        Ok(entry)
    }

    /// All entries, newest first.
    pub fn list(&self) -> Vec<LibraryEntry> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        let mut items: Vec<LibraryEntry> = entries.values().cloned().collect();
        items.sort_by(|a, b| b.serial.cmp(&a.serial));
        items
    }

    /// Fetch an entry and count the use.
    pub fn get(&self, id: &str) -> Result<LibraryEntry> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let entry = entries.get_mut(id).ok_or_else(|| not_found(id))?;
        entry.usage_count += 1;
        debug!(id, usage_count = entry.usage_count, "prompt used");
        Ok(entry.clone())
    }

    pub fn delete(&self, id: &str) -> Result<LibraryEntry> {
        let removed = self
            .entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id)
            .ok_or_else(|| not_found(id))?;
        info!(id, "prompt deleted");
        Ok(removed)
    }

    pub fn usage_stats(&self) -> UsageStats {
        let mut items = self.list();
        let total_prompts = items.len();
        let total_usage: u64 = items.iter().map(|e| e.usage_count).sum();
        // Stable sort keeps newest-first among equal counts.
        items.sort_by(|a, b| b.usage_count.cmp(&a.usage_count));
        UsageStats {
            total_prompts,
            total_usage,
            average_usage: if total_prompts == 0 {
                0.0
            } else {
                total_usage as f64 / total_prompts as f64
            },
            most_used_prompts: items
                .into_iter()
                .take(MOST_USED_LIMIT)
                .map(|e| UsageSummary {
                    name: e.name,
                    usage_count: e.usage_count,
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
