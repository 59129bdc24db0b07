use crate::output::Output;
use comfy_table::{Attribute, Cell, Color, Table};
use owo_colors::OwoColorize;
use popcorn_core::{DetailState, SearchState};
use popcorn_models::{MovieDetail, WatchedEntry, WatchlistSummary};
use serde_json::json;

fn table() -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

fn header(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

/// Loader, error line, or result list; never more than one.
pub fn search_results(output: &Output, state: &SearchState) {
    if !output.is_human() {
        output.json(&json!({ "type": "search", "state": state }));
        return;
    }

    if state.is_loading {
        output.info("Loading...");
        return;
    }
    if let Some(error) = &state.error {
        output.error(format!("🍕 {}", error));
        return;
    }
    if state.query.is_empty() {
        return;
    }

    output.println(format!("Found {} results", state.items.len().to_string().bold()));
    if state.items.is_empty() {
        return;
    }

    let mut results = table();
    results.set_header(vec![header("#"), header("Title"), header("Year"), header("IMDb ID")]);
    for (i, movie) in state.items.iter().enumerate() {
        results.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&movie.title),
            Cell::new(&movie.year),
            Cell::new(&movie.imdb_id).fg(Color::DarkGrey),
        ]);
    }
    output.println(results.to_string());
}

pub fn detail(output: &Output, state: &DetailState, watched_rating: Option<u8>) {
    if !output.is_human() {
        output.json(&json!({ "type": "detail", "state": state, "watched_rating": watched_rating }));
        return;
    }

    if state.is_loading {
        output.info("Loading...");
        return;
    }
    if let Some(error) = &state.error {
        output.error(error);
        return;
    }
    let Some(movie) = &state.detail else {
        return;
    };

    output.println(detail_table(movie).to_string());
    match watched_rating {
        Some(rating) => output.println(format!("You rated this movie {} 🌟", rating)),
        None => output.println("Not on your watched list yet".bright_black().to_string()),
    }
}

fn detail_table(movie: &MovieDetail) -> Table {
    let mut details = table();
    details.set_header(vec![
        Cell::new(format!("{} ({})", movie.title, movie.year))
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
    ]);
    let rows = [
        ("Released", format!("{} • {}", movie.released, movie.runtime)),
        ("Genre", movie.genre.clone()),
        ("IMDb rating", format!("⭐ {}", movie.imdb_rating)),
        ("Plot", movie.plot.clone()),
        ("Country", movie.country.clone()),
        ("Starring", movie.actors.clone()),
        ("Directed by", movie.director.clone()),
        ("Awards", movie.awards.clone()),
        ("IMDb ID", movie.imdb_id.clone()),
    ];
    for (label, value) in rows {
        details.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    details
}

pub fn summary(output: &Output, summary: &WatchlistSummary) {
    if !output.is_human() {
        output.json(&json!({ "type": "summary", "summary": summary }));
        return;
    }

    output.println("Movies you watched".bold().to_string());
    output.println(format!(
        "#️⃣  {} movies   ⭐️ {:.2}   🌟 {:.2}   ⏳ {:.0} min",
        summary.count, summary.avg_imdb_rating, summary.avg_user_rating, summary.avg_runtime_minutes
    ));
}

pub fn watched_list(output: &Output, entries: &[WatchedEntry], stats: &WatchlistSummary) {
    if !output.is_human() {
        output.json(&json!({ "type": "watched", "entries": entries, "summary": stats }));
        return;
    }

    summary(output, stats);
    if entries.is_empty() {
        return;
    }

    let mut list = table();
    list.set_header(vec![
        header("Title"),
        header("Year"),
        header("⭐️ IMDb"),
        header("🌟 Yours"),
        header("⏳ Runtime"),
        header("IMDb ID"),
    ]);
    for entry in entries {
        list.add_row(vec![
            Cell::new(&entry.title),
            Cell::new(&entry.year),
            Cell::new(entry.imdb_rating.map(|r| format!("{:.1}", r)).unwrap_or_else(|| "N/A".to_string())),
            Cell::new(entry.user_rating),
            Cell::new(entry.runtime.map(|m| format!("{} min", m)).unwrap_or_else(|| "N/A".to_string())),
            Cell::new(&entry.imdb_id).fg(Color::DarkGrey),
        ]);
    }
    output.println(list.to_string());
}
