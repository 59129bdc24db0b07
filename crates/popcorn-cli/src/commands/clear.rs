use super::context::AppContext;
use super::prompts;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use popcorn_core::KeyValueStore;

pub fn run_clear(watched: bool, credentials: bool, yes: bool, output: &Output) -> Result<()> {
    if !watched && !credentials {
        output.warn("No clear option specified. Use --watched or --credentials");
        output.println("\nExample: popcorn clear --watched");
        return Ok(());
    }

    let ctx = AppContext::load()?;

    if watched {
        let list = ctx.watched()?;
        let confirmed = yes
            || list.is_empty()
            || prompts::prompt_yes_no(&format!("Delete all {} watched entries?", list.len()), false)?;
        if confirmed {
            ctx.store()?
                .remove(&ctx.config.storage.watched_key)
                .map_err(|e| eyre!("Failed to clear watched list: {:#}", e))?;
            output.success("Watched list cleared");
        } else {
            output.info("Watched list kept");
        }
    }

    if credentials {
        let mut store = ctx.credentials()?;
        if store.get_omdb_api_key().is_none() {
            output.info("No stored API key to clear");
        } else {
            store.clear_omdb_api_key();
            store
                .save()
                .map_err(|e| eyre!("Failed to save credentials: {:#}", e))?;
            output.success(format!("Cleared API key from {}", ctx.paths.credentials_file().display()));
        }
    }

    Ok(())
}
