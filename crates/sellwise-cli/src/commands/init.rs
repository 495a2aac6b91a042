use anyhow::{Context, Result};
use sellwise_infrastructure::{ConfigStorage, SellwisePaths};

pub fn run() -> Result<()> {
    let secret_path =
        SellwisePaths::ensure_secret_file().context("Failed to create secret.json")?;
    println!("Secrets: {}", secret_path.display());

    let storage = ConfigStorage::new()?;
    if storage.ensure_exists()? {
        println!("Config:  {} (created with defaults)", storage.path().display());
    } else {
        println!("Config:  {}", storage.path().display());
    }

    let logs_dir = SellwisePaths::logs_dir()?;
    std::fs::create_dir_all(&logs_dir)
        .with_context(|| format!("Failed to create {}", logs_dir.display()))?;
    println!("Logs:    {}", logs_dir.display());

    println!();
    println!("Add your API key to secret.json, or set GEMINI_API_KEY / OPENAI_API_KEY.");
    Ok(())
}
