//! `ace onboard`: First-time setup.

use ace_config::{AppConfig, TaskFile};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = AppConfig::config_path();
    let task_path = AppConfig::default_task_path();

    println!("ACE — First-Time Setup");
    println!("======================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("⚠️  Config already exists at: {}", config_path.display());
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("✅ Created config.toml at: {}", config_path.display());
    }

    if task_path.exists() {
        println!("⚠️  Task already exists at: {}", task_path.display());
    } else {
        std::fs::write(&task_path, TaskFile::sample_toml())?;
        println!("✅ Created sample task at: {}", task_path.display());
    }

    println!("\n📝 Next steps:");
    println!("   1. Start a local OpenAI-compatible server (LM Studio listens on 127.0.0.1:1234)");
    println!("      or set default_provider and api_key in {}", config_path.display());
    println!("   2. Edit {} with your own task", task_path.display());
    println!("   3. Run: ace run\n");

    Ok(())
}
