//! `ace doctor`: Diagnose config and gateway health.

use ace_config::{AppConfig, ConfigError, TaskFile};
use ace_core::task::Task;
use ace_providers::router;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 ACE Doctor");
    println!("=============\n");

    if !AppConfig::config_path().exists() {
        println!("  ⚠️  No config file, using defaults — run `ace onboard`");
    }

    let task_path = AppConfig::default_task_path();
    println!("  Default task: {}", task_path.display());
    let failures = diagnose(AppConfig::load(), TaskFile::load_from(&task_path)).await;

    println!();
    if failures == 0 {
        println!("  🎉 All checks passed!");
        Ok(())
    } else {
        println!("  ❌ {failures} check(s) failed. See above for details.");
        Err(format!("{failures} doctor check(s) failed").into())
    }
}

/// Run every check and return how many failed.
async fn diagnose(
    config: Result<AppConfig, ConfigError>,
    task: Result<Task, ConfigError>,
) -> usize {
    let mut failures = 0;

    let config = match config {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            return 1;
        }
    };
    println!("     provider: {}", config.default_provider);
    println!("     model:    {}", config.model());

    match task {
        Ok(_) => println!("  ✅ Default task loads"),
        Err(e) => {
            println!("  ❌ Default task unusable: {e}");
            failures += 1;
        }
    }

    match router::build_from_config(&config) {
        Ok(router) => match router.default() {
            Some(provider) => match provider.health_check().await {
                Ok(true) => println!("  ✅ Gateway '{}' reachable", provider.name()),
                Ok(false) => {
                    println!("  ❌ Gateway '{}' responded but is not healthy", provider.name());
                    failures += 1;
                }
                Err(e) => {
                    println!("  ❌ Gateway '{}' unreachable: {e}", provider.name());
                    failures += 1;
                }
            },
            None => {
                println!("  ❌ Default provider '{}' not registered", config.default_provider);
                failures += 1;
            }
        },
        Err(e) => {
            println!("  ❌ Provider setup failed: {e}");
            failures += 1;
        }
    }

    failures
}
