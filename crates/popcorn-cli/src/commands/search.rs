use super::context::AppContext;
use crate::output::Output;
use crate::render;
use crate::ui::wait_loading;
use color_eyre::Result;

pub async fn run_search(query: &str, output: &Output) -> Result<()> {
    tracing::debug!("Search command started");
    let ctx = AppContext::load()?;
    let mut session = ctx.session()?;

    match session.set_query(query) {
        Some(handle) => wait_loading(handle, format!("Searching for \"{}\"...", query), output).await,
        None => {
            output.warn(format!(
                "Type at least {} characters to search",
                session.search().min_query_len()
            ));
            return Ok(());
        }
    }

    render::search_results(output, &session.search_state());
    Ok(())
}

pub async fn run_show(imdb_id: &str, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let mut session = ctx.session()?;

    if let Some(handle) = session.select(imdb_id) {
        wait_loading(handle, format!("Loading {}...", imdb_id), output).await;
    }

    render::detail(output, &session.detail_state(), session.selected_watched_rating());
    Ok(())
}
