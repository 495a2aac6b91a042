use anyhow::{Context, Result};
use clap::Args;
use sellwise_application::{MarketplaceAgentService, TaskKind, TaskResult};
use sellwise_core::config::ProviderKind;
use sellwise_core::model::Credential;
use sellwise_core::task::TaskInput;
use sellwise_infrastructure::media_file::{read_image, write_media};
use sellwise_infrastructure::{ConfigStorage, FileKeyValueRepository, SecretServiceImpl};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::vault::{self, VaultEntry};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Task name, e.g. keyword-finder
    pub task: TaskKind,

    /// Input as a JSON object, or @path to a JSON file
    #[arg(short, long)]
    pub input: String,

    /// Reference image for image and video tasks
    #[arg(short, long)]
    pub reference: Option<PathBuf>,

    /// Provider to use instead of the configured one
    #[arg(short, long)]
    pub provider: Option<ProviderKind>,

    /// API key for this run only
    #[arg(long)]
    pub api_key: Option<String>,

    /// Save the result in the vault under this key
    #[arg(long)]
    pub save: Option<String>,

    /// Write generated media bytes to this file
    #[arg(long)]
    pub media_out: Option<PathBuf>,
}

pub async fn execute(args: RunArgs) -> Result<()> {
    let config = ConfigStorage::new()?.load()?;
    let provider = args.provider.unwrap_or(config.provider);
    let input = parse_input(&args.input)?;
    let reference = args
        .reference
        .as_deref()
        .map(read_image)
        .transpose()?;
    let credential = args.api_key.and_then(Credential::non_blank);

    let secrets = Arc::new(SecretServiceImpl::new()?);
    let service = MarketplaceAgentService::from_config(&config, provider, secrets).await?;

    tracing::debug!("[Cli] Running {} with provider {}", args.task, provider);
    let result = service
        .run_with(args.task, &input, reference.as_ref(), credential)
        .await?;

    if let Some(path) = &args.media_out {
        write_result_media(&result, path)?;
    } else if result.media.is_some() {
        eprintln!("note: result carries media; pass --media-out <path> to write it");
    }

    if let Some(key) = &args.save {
        let repo = FileKeyValueRepository::vault()?;
        vault::save(&repo, key, &VaultEntry::new(result.clone()))?;
        eprintln!("Saved to vault as '{}'", key);
    }

    println!("{}", serde_json::to_string_pretty(&result.data)?);
    Ok(())
}

/// Accepts inline JSON or `@file`.
pub fn parse_input(raw: &str) -> Result<TaskInput> {
    let text = match raw.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file {}", path))?,
        None => raw.to_string(),
    };
    let value: serde_json::Value =
        serde_json::from_str(&text).context("Input is not valid JSON")?;
    Ok(TaskInput::from_value(value)?)
}

fn write_result_media(result: &TaskResult, path: &Path) -> Result<()> {
    let Some(media) = &result.media else {
        eprintln!("note: {} produced no media; nothing written", result.task);
        return Ok(());
    };
    let written = write_media(path, media)?;
    eprintln!(
        "Wrote {} bytes ({}) to {}",
        written,
        media.mime_type(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sellwise_core::error::TaskError;
    use sellwise_core::media::DataUri;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_parse_inline_input() {
        let input = parse_input(r#"{"productName": "Premium Silk Kurta"}"#).unwrap();
        assert_eq!(input.get("productName"), Some(&json!("Premium Silk Kurta")));
    }

    #[test]
    fn test_parse_input_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("input.json");
        std::fs::write(&path, r#"{"marketplace": "Myntra"}"#).unwrap();

        let input = parse_input(&format!("@{}", path.display())).unwrap();
        assert_eq!(input.get("marketplace"), Some(&json!("Myntra")));
    }

    #[test]
    fn test_non_object_input_is_a_precondition_failure() {
        let err = parse_input("[1, 2]").unwrap_err();
        let task_error = err.downcast_ref::<TaskError>().unwrap();
        assert!(task_error.is_precondition());

        assert!(parse_input("{not json").is_err());
    }

    #[test]
    fn test_write_result_media() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("kurta.png");
        let result = TaskResult {
            task: "product-image".to_string(),
            data: json!({ "refinedPrompt": "Kurta on a mannequin" }),
            media: Some(DataUri::from_bytes("image/png", b"png-bytes")),
        };

        write_result_media(&result, &path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"png-bytes");
    }
}
