use sellwise_core::config::{AppConfig, ProviderKind};
use sellwise_core::media::DataUri;
use sellwise_core::secret::SecretService;
use sellwise_core::store::KeyValueRepository;
use sellwise_infrastructure::media_file::{read_image, write_media};
use sellwise_infrastructure::{
    ConfigStorage, FileKeyValueRepository, SecretServiceImpl, SellwisePaths,
};
use serde_json::json;
use std::fs;
use tempfile::TempDir;

#[tokio::test]
async fn test_fresh_setup_falls_back_to_environment_keys() {
    let temp_dir = TempDir::new().unwrap();
    let secret_path = temp_dir.path().join("secret.json");
    let config = ConfigStorage::with_path(temp_dir.path().join("config.toml"));

    SellwisePaths::ensure_secret_file_at(secret_path.clone()).unwrap();
    assert!(config.ensure_exists().unwrap());
    assert!(!config.ensure_exists().unwrap());
    assert_eq!(config.load().unwrap(), AppConfig::default());

    // The template holds blank keys, so only the environment can supply one.
    let secrets = SecretServiceImpl::with_path(secret_path).with_env_lookup(|name| {
        (name == "GEMINI_API_KEY").then(|| "env-gemini".to_string())
    });
    assert!(secrets.secret_file_exists().await);
    assert_eq!(
        secrets
            .credential_for(ProviderKind::Gemini)
            .await
            .unwrap()
            .expose(),
        "env-gemini"
    );
    assert!(secrets.credential_for(ProviderKind::OpenAI).await.is_none());
}

#[tokio::test]
async fn test_secret_file_key_wins_over_environment() {
    let temp_dir = TempDir::new().unwrap();
    let secret_path = temp_dir.path().join("secret.json");
    fs::write(
        &secret_path,
        r#"{ "openai": { "api_key": "sk-file", "model_name": "gpt-4o-mini" } }"#,
    )
    .unwrap();

    let secrets = SecretServiceImpl::with_path(secret_path)
        .with_env_lookup(|_| Some("sk-env".to_string()));
    let credential = secrets.credential_for(ProviderKind::OpenAI).await.unwrap();
    assert_eq!(credential.expose(), "sk-file");

    let loaded = secrets.load_secrets().await.unwrap();
    assert_eq!(loaded.model_override(ProviderKind::OpenAI), Some("gpt-4o-mini"));
}

#[test]
fn test_vault_keeps_media_results() {
    let temp_dir = TempDir::new().unwrap();
    let image_path = temp_dir.path().join("reference.jpg");
    fs::write(&image_path, b"jpeg-bytes").unwrap();

    let reference = read_image(&image_path).unwrap();
    assert_eq!(reference.mime_type(), "image/jpeg");

    let vault = FileKeyValueRepository::with_path(temp_dir.path().join("vault.json"));
    vault
        .put(
            "kurta-shot",
            json!({ "task": "product-image", "media": reference.to_string() }),
        )
        .unwrap();

    let reopened = FileKeyValueRepository::with_path(vault.path().to_path_buf());
    let stored = reopened.get("kurta-shot").unwrap().unwrap();
    let media = DataUri::parse(stored["media"].as_str().unwrap()).unwrap();

    let out = temp_dir.path().join("export").join("kurta.jpg");
    write_media(&out, &media).unwrap();
    assert_eq!(fs::read(&out).unwrap(), b"jpeg-bytes");
}
