use super::context::AppContext;
use crate::output::Output;
use crate::render;
use crate::ui::wait_loading;
use color_eyre::Result;
use popcorn_core::{AddOutcome, Session};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;

const HELP: &str = "\
Type a title to search; each new line replaces the previous query.
  :show <n|id>   open result n (or an IMDb id); again to close
  :rate <1-10>   rate the open title
  :add [1-10]    add the open title to your watched list
  :close         close the open title
  :results       show the current results again
  :list          show your watched list
  :remove <id>   remove a title from your watched list
  :quit          exit";

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub async fn run_interactive(output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let mut session = ctx.session()?;
    let mut printer: Option<JoinHandle<()>> = None;

    output.info("Type a title to search. ':help' lists commands, ':quit' exits.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();

        if let Some(command) = line.strip_prefix(':') {
            if run_command(command, &mut session, output).await == Flow::Quit {
                break;
            }
            continue;
        }

        // Results of a superseded query are never printed
        if let Some(previous) = printer.take() {
            previous.abort();
        }

        match session.set_query(line) {
            Some(handle) => printer = Some(print_when_settled(&session, handle, line.to_string(), *output)),
            None if line.is_empty() => {}
            None => output.info(format!(
                "Type at least {} characters to search",
                session.search().min_query_len()
            )),
        }
    }

    if let Some(printer) = printer {
        printer.abort();
    }
    session.search().cancel();
    session.close();
    Ok(())
}

fn print_when_settled(session: &Session, handle: JoinHandle<()>, query: String, output: Output) -> JoinHandle<()> {
    let state_rx = session.search().subscribe();
    tokio::spawn(async move {
        if let Err(e) = handle.await {
            tracing::warn!("Search task failed: {}", e);
            return;
        }
        let state = state_rx.borrow().clone();
        if state.query == query && !state.is_loading {
            render::search_results(&output, &state);
        }
    })
}

async fn run_command(command: &str, session: &mut Session, output: &Output) -> Flow {
    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next();

    match (name, arg) {
        ("quit" | "q" | "exit", _) => return Flow::Quit,
        ("help" | "h", _) => output.println(HELP),
        ("show", Some(target)) => show(session, target, output).await,
        ("rate", Some(value)) => match value.parse::<u8>() {
            Ok(rating) => match session.rate(rating) {
                Ok(()) => output.info(format!("Rating set to {} 🌟 (':add' to save)", rating)),
                Err(e) => output.error(e.to_string()),
            },
            Err(_) => output.error(format!("Not a rating: {}", value)),
        },
        ("add", value) => add(session, value, output),
        ("close", _) => {
            session.close();
            render::summary(output, &session.summary());
        }
        ("results", _) => render::search_results(output, &session.search_state()),
        ("list", _) => render::watched_list(output, session.watched().entries(), &session.summary()),
        ("remove", Some(imdb_id)) => match session.remove_watched(imdb_id) {
            Ok(true) => output.success(format!("Removed {}", imdb_id)),
            Ok(false) => output.warn(format!("{} is not on your watched list", imdb_id)),
            Err(e) => output.error(format!("{:#}", e)),
        },
        _ => output.error(format!("Unknown command ':{}'. Try ':help'", command)),
    }
    Flow::Continue
}

/// `n` picks the n-th current result; anything else is taken as an IMDb id.
fn resolve_target(session: &Session, target: &str) -> String {
    let items = session.search_state().items;
    target
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| items.get(i))
        .map(|movie| movie.imdb_id.clone())
        .unwrap_or_else(|| target.to_string())
}

async fn show(session: &mut Session, target: &str, output: &Output) {
    let imdb_id = resolve_target(session, target);
    match session.select(&imdb_id) {
        Some(handle) => {
            wait_loading(handle, format!("Loading {}...", imdb_id), output).await;
            render::detail(output, &session.detail_state(), session.selected_watched_rating());
        }
        None => {
            output.info(format!("Closed {}", imdb_id));
            render::summary(output, &session.summary());
        }
    }
}

fn add(session: &mut Session, value: Option<&str>, output: &Output) {
    if let Some(value) = value {
        let rating = match value.parse::<u8>() {
            Ok(rating) => rating,
            Err(_) => {
                output.error(format!("Not a rating: {}", value));
                return;
            }
        };
        if let Err(e) = session.rate(rating) {
            output.error(e.to_string());
            return;
        }
    }

    let title = session
        .detail_state()
        .detail
        .map(|d| d.title)
        .unwrap_or_default();
    match session.add_selected() {
        Ok(AddOutcome::Added) => {
            output.success(format!("Added {}", title));
            render::summary(output, &session.summary());
        }
        Ok(AddOutcome::AlreadyWatched) => match session.selected_watched_rating() {
            Some(rating) => output.warn(format!("You rated this movie {} 🌟", rating)),
            None => output.warn(format!("{} is already on your list", title)),
        },
        Err(e) => output.error(format!("{:#}", e)),
    }
}
