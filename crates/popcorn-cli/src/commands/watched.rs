use super::context::AppContext;
use super::prompts;
use crate::output::Output;
use crate::render;
use crate::ui::wait_loading;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use popcorn_core::AddOutcome;

pub async fn run_add(imdb_id: &str, rating: Option<u8>, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let mut session = ctx.session()?;

    if let Some(previous) = session.watched().user_rating(imdb_id) {
        output.warn(format!("Already on your list: you rated this movie {} 🌟", previous));
        return Ok(());
    }

    if let Some(handle) = session.select(imdb_id) {
        wait_loading(handle, format!("Loading {}...", imdb_id), output).await;
    }
    let state = session.detail_state();
    if let Some(error) = state.error {
        return Err(eyre!("{}", error));
    }
    render::detail(output, &session.detail_state(), None);

    let rating = match rating {
        Some(rating) => rating,
        None => prompts::prompt_rating("Your rating", None)?,
    };
    session.rate(rating).map_err(|e| eyre!("{}", e))?;

    let title = state.detail.map(|d| d.title).unwrap_or_else(|| imdb_id.to_string());
    match session.add_selected().map_err(|e| eyre!("{:#}", e))? {
        AddOutcome::Added => output.success(format!("Added {} with your rating {} 🌟", title, rating)),
        AddOutcome::AlreadyWatched => output.warn(format!("{} is already on your list", title)),
    }
    Ok(())
}

pub fn run_remove(imdb_id: &str, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let mut watched = ctx.watched()?;

    if watched.remove(imdb_id).map_err(|e| eyre!("{:#}", e))? {
        output.success(format!("Removed {} from your watched list", imdb_id));
    } else {
        output.warn(format!("{} is not on your watched list", imdb_id));
    }
    Ok(())
}

pub fn run_list(output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let watched = ctx.watched()?;
    render::watched_list(output, watched.entries(), &watched.summary());
    Ok(())
}

pub fn run_summary(output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let watched = ctx.watched()?;
    render::summary(output, &watched.summary());
    Ok(())
}
