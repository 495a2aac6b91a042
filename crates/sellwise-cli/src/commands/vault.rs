//! Saved task results, keyed by a caller-chosen name.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use sellwise_application::TaskResult;
use sellwise_core::store::KeyValueRepository;
use sellwise_infrastructure::FileKeyValueRepository;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaultEntry {
    pub task: String,
    pub saved_at: DateTime<Utc>,
    pub result: TaskResult,
}

impl VaultEntry {
    pub fn new(result: TaskResult) -> Self {
        Self {
            task: result.task.clone(),
            saved_at: Utc::now(),
            result,
        }
    }
}

pub fn save(repo: &dyn KeyValueRepository, key: &str, entry: &VaultEntry) -> Result<()> {
    if key.trim().is_empty() {
        bail!("vault key must not be blank");
    }
    repo.put(key, serde_json::to_value(entry)?)?;
    Ok(())
}

pub fn load(repo: &dyn KeyValueRepository, key: &str) -> Result<Option<VaultEntry>> {
    repo.get(key)?
        .map(|value| {
            serde_json::from_value(value)
                .with_context(|| format!("Vault entry '{}' is not a saved result", key))
        })
        .transpose()
}

pub fn list() -> Result<()> {
    let repo = FileKeyValueRepository::vault()?;
    let keys = repo.keys()?;
    if keys.is_empty() {
        println!("Vault is empty ({})", repo.path().display());
        return Ok(());
    }

    for key in keys {
        match load(&repo, &key) {
            Ok(Some(entry)) => println!(
                "{:<24} {:<22} {}",
                key,
                entry.task,
                entry.saved_at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            Ok(None) => {}
            Err(e) => tracing::warn!("[Vault] Skipping '{}': {:#}", key, e),
        }
    }
    Ok(())
}

pub fn get(key: &str) -> Result<()> {
    let repo = FileKeyValueRepository::vault()?;
    let Some(entry) = load(&repo, key)? else {
        bail!("no saved result named '{}'", key);
    };
    println!("{}", serde_json::to_string_pretty(&entry)?);
    Ok(())
}

pub fn remove(key: &str) -> Result<()> {
    let repo = FileKeyValueRepository::vault()?;
    if !repo.remove(key)? {
        bail!("no saved result named '{}'", key);
    }
    println!("Removed '{}'", key);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sellwise_infrastructure::InMemoryKeyValueRepository;
    use serde_json::json;

    fn result() -> TaskResult {
        TaskResult {
            task: "review-reply".to_string(),
            data: json!({ "reply": "Thank you!", "sentiment": "positive" }),
            media: None,
        }
    }

    #[test]
    fn test_save_and_load() {
        let repo = InMemoryKeyValueRepository::new();
        let entry = VaultEntry::new(result());
        save(&repo, "kurta-review", &entry).unwrap();

        let loaded = load(&repo, "kurta-review").unwrap().unwrap();
        assert_eq!(loaded, entry);
        assert_eq!(loaded.task, "review-reply");
        assert!(load(&repo, "missing").unwrap().is_none());
    }

    #[test]
    fn test_blank_key_is_rejected() {
        let repo = InMemoryKeyValueRepository::new();
        assert!(save(&repo, "  ", &VaultEntry::new(result())).is_err());
        assert!(repo.keys().unwrap().is_empty());
    }

    #[test]
    fn test_foreign_value_is_an_error() {
        let repo = InMemoryKeyValueRepository::new();
        repo.put("odd", json!("not an entry")).unwrap();
        assert!(load(&repo, "odd").is_err());
    }
}
