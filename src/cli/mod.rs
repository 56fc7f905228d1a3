use anyhow::{Context, Result};
use clap::Args;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::form::FormSubmission;
use crate::merge::merge;
use crate::providers::ProviderRegistry;

/// Arguments of `pcm merge`
#[derive(Debug, Clone, Args)]
pub struct MergeArgs {
    /// Provider name
    #[arg(short, long)]
    pub provider: String,

    /// Base URL (defaults to the provider's preset)
    #[arg(short = 'u', long)]
    pub base_url: Option<String>,

    /// API key, or `$VAR` to read it from that environment variable
    #[arg(short = 'k', long, env = "PCM_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// API mode (defaults to the first configured mode)
    #[arg(short, long)]
    pub api_mode: Option<String>,

    /// Model ID; repeat for several, the first one is the primary model
    #[arg(short, long = "model", value_name = "ID")]
    pub models: Vec<String>,

    /// Base config JSON file, `-` for stdin
    #[arg(short, long, default_value = "-")]
    pub input: PathBuf,

    /// Write the result to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl MergeArgs {
    /// Turn the arguments into a form submission, filling the base URL and
    /// API mode from the registry when they were not given
    pub fn submission(&self, registry: &ProviderRegistry, config_text: String) -> Result<FormSubmission> {
        let base_url = match &self.base_url {
            Some(url) => url.clone(),
            None => registry
                .base_url_for(&self.provider)
                .unwrap_or_default()
                .to_string(),
        };
        let api_mode = match &self.api_mode {
            Some(mode) => mode.clone(),
            None => registry.api_modes().first().cloned().unwrap_or_default(),
        };
        let api_key = match &self.api_key {
            Some(key) => resolve_env(key)?,
            None => String::new(),
        };

        Ok(FormSubmission {
            config: config_text,
            base_url,
            api_key,
            api_mode,
            provider: self.provider.clone(),
            model_ids: self.models.clone(),
        })
    }
}

/// `$VAR` reads the variable; anything else is returned as is
fn resolve_env(value: &str) -> Result<String> {
    match value.strip_prefix('$') {
        Some(env_var) => std::env::var(env_var)
            .with_context(|| format!("Environment variable {} not found", env_var)),
        None => Ok(value.to_string()),
    }
}

/// Validate and merge, returning the display text
pub fn render_merge(args: &MergeArgs, registry: &ProviderRegistry, config_text: String) -> Result<String> {
    let payload = args.submission(registry, config_text)?.into_payload()?;
    debug!("Merging {} model(s) for provider '{}'", payload.model_ids.len(), payload.provider);

    let merged = merge(&payload)?;
    Ok(merged.to_pretty_string())
}

/// `pcm merge`
pub fn run_merge(args: &MergeArgs, registry: &ProviderRegistry) -> Result<()> {
    let config_text = read_input(&args.input)?;
    let text = render_merge(args, registry, config_text)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, format!("{}\n", text))
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            info!("Wrote merged config to {}", path.display());
        }
        None => println!("{}", text),
    }

    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read base config from stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read base config file: {}", path.display()))
    }
}

/// `pcm providers` listing
pub fn format_providers(registry: &ProviderRegistry) -> String {
    let mut out = String::from("Providers:\n");
    for preset in registry.presets() {
        out.push_str(&format!("  • {} ({})", preset.name, preset.base_url));
        if !preset.models.is_empty() {
            out.push_str(&format!(" models: {}", preset.models.join(", ")));
        }
        out.push('\n');
    }

    out.push_str("\nAPI modes:\n");
    for mode in registry.api_modes() {
        out.push_str(&format!("  • {}\n", mode));
    }

    out
}
