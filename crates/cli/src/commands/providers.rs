//! `ace providers`: List built-in gateway endpoints.

use ace_providers::router::KNOWN_PROVIDERS;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🤖 Built-in Providers");
    println!("=====================\n");
    println!("  {:<12} Base URL", "Provider");
    for (name, url) in KNOWN_PROVIDERS {
        println!("  {name:<12} {url}");
    }
    println!();
    println!("  Any OpenAI-compatible endpoint works:");
    println!("    default_provider = \"myserver\"");
    println!("    [providers.myserver]");
    println!("    api_url = \"http://10.0.0.5:8000/v1\"");
    println!("    api_key = \"your-key\"");
    println!();
    println!("  Environment variables:");
    println!("    ACE_API_KEY, OPENAI_API_KEY, OPENROUTER_API_KEY");
    println!("    ACE_PROVIDER, ACE_MODEL");

    Ok(())
}
