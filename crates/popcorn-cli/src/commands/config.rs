use super::context::AppContext;
use super::prompts;
use crate::output::Output;
use crate::ConfigCommands;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Attribute, Cell, Color, Table};
use popcorn_config::{Config, API_KEY_ENV};
use serde_json::json;

pub fn run_config(cmd: ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show { full } => show_config(full, output),
        ConfigCommands::ApiKey { key } => configure_api_key(key, output),
        ConfigCommands::Set { base_url, timeout_secs, min_query_len, debounce_ms } => {
            configure_settings(base_url, timeout_secs, min_query_len, debounce_ms, output)
        }
    }
}

fn show_config(full: bool, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let credentials = ctx.credentials()?;
    let api_key = credentials.resolve_api_key().unwrap_or_default();
    let api_key_display = if full { api_key } else { mask_string(&api_key) };
    let api_key_source = if std::env::var(API_KEY_ENV).map(|v| !v.trim().is_empty()).unwrap_or(false) {
        API_KEY_ENV.to_string()
    } else {
        ctx.paths.credentials_file().display().to_string()
    };

    if !output.is_human() {
        output.json(&json!({
            "config_file": ctx.paths.config_file(),
            "store_dir": ctx.paths.store_dir(),
            "omdb": {
                "base_url": ctx.config.omdb.base_url,
                "timeout_secs": ctx.config.omdb.timeout_secs,
                "api_key": api_key_display,
                "api_key_source": api_key_source,
            },
            "search": {
                "min_query_len": ctx.config.search.min_query_len,
                "debounce_ms": ctx.config.search.debounce_ms,
            },
            "storage": {
                "watched_key": ctx.config.storage.watched_key,
            },
        }));
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table.set_header(vec![
        Cell::new("Setting").fg(Color::Cyan).add_attribute(Attribute::Bold),
        Cell::new("Value").fg(Color::Cyan).add_attribute(Attribute::Bold),
    ]);
    let rows = [
        ("Config file", ctx.paths.config_file().display().to_string()),
        ("Store directory", ctx.paths.store_dir().display().to_string()),
        ("OMDb base URL", ctx.config.omdb.base_url.clone()),
        ("Request timeout", format!("{}s", ctx.config.omdb.timeout_secs)),
        ("API key", api_key_display),
        ("API key from", api_key_source),
        ("Minimum query length", ctx.config.search.min_query_len.to_string()),
        ("Search debounce", format!("{}ms", ctx.config.search.debounce_ms)),
        ("Watched list key", ctx.config.storage.watched_key.clone()),
    ];
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    output.println(table.to_string());
    Ok(())
}

fn configure_api_key(key: Option<String>, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let key = match key {
        Some(key) => key,
        None => prompts::prompt_password("OMDb API key")?,
    };
    let key = key.trim().to_string();
    if key.is_empty() {
        return Err(eyre!("API key cannot be empty"));
    }

    let mut credentials = ctx.credentials()?;
    credentials.set_omdb_api_key(key);
    credentials
        .save()
        .map_err(|e| eyre!("Failed to save credentials: {:#}", e))?;

    output.success(format!("API key saved to {}", ctx.paths.credentials_file().display()));
    if std::env::var(API_KEY_ENV).is_ok() {
        output.warn(format!("{} is set and takes precedence over the stored key", API_KEY_ENV));
    }
    Ok(())
}

fn configure_settings(
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    min_query_len: Option<usize>,
    debounce_ms: Option<u64>,
    output: &Output,
) -> Result<()> {
    let ctx = AppContext::load()?;
    let mut config: Config = ctx.config;
    let mut changed = false;

    if let Some(base_url) = base_url {
        config.omdb.base_url = base_url;
        changed = true;
    }
    if let Some(timeout_secs) = timeout_secs {
        config.omdb.timeout_secs = timeout_secs;
        changed = true;
    }
    if let Some(min_query_len) = min_query_len {
        config.search.min_query_len = min_query_len;
        changed = true;
    }
    if let Some(debounce_ms) = debounce_ms {
        config.search.debounce_ms = debounce_ms;
        changed = true;
    }

    if !changed {
        output.warn("Nothing to change. See 'popcorn config set --help'");
        return Ok(());
    }

    config.validate().map_err(|e| eyre!("{:#}", e))?;
    let config_file = ctx.paths.config_file();
    config
        .save_to_file(&config_file)
        .map_err(|e| eyre!("Failed to save config to {}: {:#}", config_file.display(), e))?;
    output.success(format!("Configuration saved to {}", config_file.display()));
    Ok(())
}

fn mask_string(s: &str) -> String {
    if s.is_empty() {
        return "<not set>".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_string() {
        assert_eq!(mask_string(""), "<not set>");
        assert_eq!(mask_string("abcd"), "****");
        assert_eq!(mask_string("8fdeb9af"), "8f***af");
    }
}
