mod logging;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use dialoguer::{Input, Select};
use showdown::{
    Config, Countdown, Person, SearchOutcome, Section, Show, ShowDetails, Showdown, countdown,
    countdown_from_str, format_airdate,
};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

/// Browse tv shows and count down to their next episodes
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Base URL of the TVMaze-compatible catalog API
    #[arg(long, global = true, env = "SHOWDOWN_API_URL")]
    api_url: Option<String>,

    /// Directory for favourites (defaults to the platform data directory)
    #[arg(long, global = true, env = "SHOWDOWN_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search shows and show their next episodes
    Search { query: Vec<String> },
    /// Show seasons, episodes and cast of a show
    Show {
        id: u64,
        /// Expand the episode list of every season
        #[arg(long)]
        episodes: bool,
    },
    /// Search people
    People { query: Vec<String> },
    /// List favourites, soonest next episode first
    Favourites,
    /// Add a show to the favourites, or remove it if already there
    Favourite { id: u64 },
    /// Time left until an air date (YYYY-MM-DD or RFC 3339)
    Countdown { airdate: String },
    /// Interactive session
    Browse,
}

/// Formats the one-line summary of a show
fn show_line(show: &Show, favourite: bool) -> String {
    let mut line = format!(
        "{} {} [{}]",
        if favourite { "★" } else { "☆" },
        show.name,
        show.status
    );
    if let (Some(seasons), Some(episodes)) = (show.seasons_count, show.episodes_count) {
        line.push_str(&format!(" - {} season(s), {} episode(s)", seasons, episodes));
    }
    line
}

/// Formats the next-episode line, if there is an upcoming episode
fn next_episode_line(show: &Show, now: DateTime<Utc>) -> Option<String> {
    let next = show.next_episode.as_ref()?;
    let remaining = countdown(next.airdate, now);
    if !remaining.is_upcoming() {
        return None;
    }
    Some(format!(
        "Next: S{:02}E{:02} - Countdown: {} ({})",
        next.season,
        next.episode,
        remaining,
        format_airdate(next.airdate)
    ))
}

fn print_shows(app: &Showdown, shows: &[Show]) {
    let now = app.now();
    for show in shows {
        println!("#{:<7} {}", show.id, show_line(show, app.is_favourite(show.id)));
        if let Some(next) = next_episode_line(show, now) {
            println!("         {}", next);
        }
    }
}

fn print_people(people: &[Person]) {
    if people.is_empty() {
        println!("No people found.");
        return;
    }
    for person in people {
        println!("#{:<7} {}", person.id, person.name);
        for (label, value) in [
            ("Country", &person.country),
            ("Birthday", &person.birthday),
            ("Gender", &person.gender),
        ] {
            if let Some(value) = value {
                println!("         {}: {}", label, value);
            }
        }
    }
}

fn print_details(app: &Showdown, details: &ShowDetails) {
    let show = &details.show;
    println!("{}", show_line(show, app.is_favourite(show.id)));
    if let Some(next) = next_episode_line(show, app.now()) {
        println!("{}", next);
    }
    if let Some(summary) = show.summary_text() {
        println!("\n{}", summary);
    }

    println!(
        "\n{} Episodes ({} season(s))",
        collapse_marker(details.episodes_collapsed),
        details.seasons.len()
    );
    if !details.episodes_collapsed {
        print_seasons(details);
    }

    println!(
        "\n{} Cast ({})",
        collapse_marker(details.cast_collapsed),
        details.cast.len()
    );
    if details.cast_collapsed {
        return;
    }
    if details.cast.is_empty() {
        println!("No cast found.");
    }
    for member in &details.cast {
        println!("  {} as {}", member.name, member.character);
    }
}

fn print_seasons(details: &ShowDetails) {
    if details.seasons.is_empty() {
        println!("No episodes found.");
    }
    for group in &details.seasons {
        println!(
            "{} Season {} ({} episode(s))",
            collapse_marker(group.collapsed),
            group.season,
            group.episodes.len()
        );
        if group.collapsed {
            continue;
        }
        for episode in &group.episodes {
            let airdate = episode
                .airdate
                .map(format_airdate)
                .unwrap_or_else(|| "TBA".to_string());
            println!("    E{:02} {} ({})", episode.number, episode.name, airdate);
        }
    }
}

fn collapse_marker(collapsed: bool) -> &'static str {
    if collapsed { "▸" } else { "▾" }
}

/// Prints the show search results, or returns the search error
fn report_search(app: &Showdown, outcome: SearchOutcome) -> Result<(), String> {
    if outcome == SearchOutcome::Cleared {
        println!("Nothing to search for.");
        return Ok(());
    }
    let state = app.show_search();
    if let Some(error) = state.error {
        return Err(error);
    }
    if state.results.is_empty() {
        println!("No shows found.");
    } else {
        print_shows(app, &state.results);
    }
    Ok(())
}

type PromptResult<T> = Result<T, dialoguer::Error>;

/// Runs a terminal prompt on the blocking thread pool
async fn blocking_prompt<T, F>(interact: F) -> PromptResult<T>
where
    F: FnOnce() -> PromptResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(interact)
        .await
        .map_err(|e| dialoguer::Error::from(std::io::Error::other(e)))?
}

async fn pick(prompt: &str, items: &[String]) -> PromptResult<Option<usize>> {
    let prompt = prompt.to_string();
    let items = items.to_vec();
    blocking_prompt(move || {
        Select::new()
            .with_prompt(prompt)
            .items(&items)
            .default(0)
            .interact_opt()
    })
    .await
}

async fn ask(prompt: &str) -> PromptResult<String> {
    let prompt = prompt.to_string();
    blocking_prompt(move || {
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
    })
    .await
}

/// Lets the user pick a show from `shows` and work with its details
async fn browse_shows(app: &Showdown, shows: Vec<Show>) -> PromptResult<()> {
    loop {
        let mut items: Vec<String> = shows
            .iter()
            .map(|s| show_line(s, app.is_favourite(s.id)))
            .collect();
        items.push("Back".to_string());

        let Some(index) = pick("Open a show", &items).await? else {
            return Ok(());
        };
        let Some(show) = shows.get(index) else {
            return Ok(());
        };

        println!("Loading details...");
        app.open_details(show.clone()).await;
        browse_details(app).await?;
        app.close_details();
    }
}

enum DetailAction {
    Favourite,
    Section(Section),
    Season(u32),
}

fn expand_label(collapsed: bool) -> &'static str {
    if collapsed { "Expand" } else { "Collapse" }
}

async fn browse_details(app: &Showdown) -> PromptResult<()> {
    loop {
        let Some(details) = app.details() else {
            return Ok(());
        };
        print_details(app, &details);

        let favourite = app.is_favourite(details.show.id);
        let mut actions = vec![(
            if favourite {
                "Remove from favourites".to_string()
            } else {
                "Add to favourites".to_string()
            },
            DetailAction::Favourite,
        )];
        actions.push((
            format!("{} episodes", expand_label(details.episodes_collapsed)),
            DetailAction::Section(Section::Episodes),
        ));
        if !details.episodes_collapsed {
            actions.extend(details.seasons.iter().map(|g| {
                (
                    format!("{} season {}", expand_label(g.collapsed), g.season),
                    DetailAction::Season(g.season),
                )
            }));
        }
        actions.push((
            format!("{} cast", expand_label(details.cast_collapsed)),
            DetailAction::Section(Section::Cast),
        ));

        let mut items: Vec<String> = actions.iter().map(|(label, _)| label.clone()).collect();
        items.push("Back".to_string());

        let Some(index) = pick("Action", &items).await? else {
            return Ok(());
        };
        match actions.get(index).map(|(_, action)| action) {
            Some(DetailAction::Favourite) => {
                app.toggle_favourite(details.show.clone());
            }
            Some(DetailAction::Section(section)) => {
                app.toggle_section(*section);
            }
            Some(DetailAction::Season(season)) => {
                app.toggle_season(*season);
            }
            None => return Ok(()),
        }
    }
}

async fn browse(app: &Showdown) -> PromptResult<()> {
    let actions = [
        "Search shows",
        "Search people",
        "Favourites",
        "Upcoming",
        "Quit",
    ]
    .map(String::from);

    loop {
        match pick("Showdown", &actions).await? {
            Some(0) => {
                let query = ask("Search for a TV show").await?;
                println!("Searching...");
                let outcome = app.search(&query).await;
                if let Err(error) = report_search(app, outcome) {
                    eprintln!("Error: {}", error);
                }
                let results = app.show_search().results;
                if !results.is_empty() {
                    browse_shows(app, results).await?;
                }
            }
            Some(1) => {
                let query = ask("Search for a person").await?;
                if app.search_people(&query).await == SearchOutcome::Cleared {
                    continue;
                }
                let state = app.people_search();
                match state.error {
                    Some(error) => eprintln!("Error: {}", error),
                    None => print_people(&state.results),
                }
            }
            Some(2) => {
                let favourites = app.favourites();
                if favourites.is_empty() {
                    println!("No favourites yet.");
                } else {
                    browse_shows(app, favourites).await?;
                }
            }
            Some(3) => {
                let upcoming = app.upcoming();
                if upcoming.is_empty() {
                    println!("No upcoming episodes among the shows seen so far.");
                } else {
                    print_shows(app, &upcoming);
                }
            }
            _ => return Ok(()),
        }
    }
}

async fn run(app: &Showdown, command: Command) -> Result<(), String> {
    match command {
        Command::Search { query } => {
            let outcome = app.search(&query.join(" ")).await;
            report_search(app, outcome)?;
        }
        Command::Show { id, episodes } => {
            let base = app
                .find_show(id)
                .await
                .map_err(|e| format!("Failed to fetch show {}: {}", id, e))?;
            app.open_details(base).await;
            if let Some(mut details) = app.details() {
                details.episodes_collapsed = false;
                details.cast_collapsed = false;
                if episodes {
                    for group in &mut details.seasons {
                        group.collapsed = false;
                    }
                }
                print_details(app, &details);
            }
        }
        Command::People { query } => {
            if app.search_people(&query.join(" ")).await == SearchOutcome::Cleared {
                println!("Nothing to search for.");
                return Ok(());
            }
            let state = app.people_search();
            match state.error {
                Some(error) => return Err(error),
                None => print_people(&state.results),
            }
        }
        Command::Favourites => {
            let favourites = app.favourites();
            if favourites.is_empty() {
                println!("No favourites yet.");
            } else {
                print_shows(app, &favourites);
            }
        }
        Command::Favourite { id } => {
            let added = app
                .toggle_favourite_by_id(id)
                .await
                .map_err(|e| format!("Failed to fetch show {}: {}", id, e))?;
            if added {
                println!("Added #{} to favourites.", id);
            } else {
                println!("Removed #{} from favourites.", id);
            }
        }
        Command::Countdown { airdate } => {
            let remaining = countdown_from_str(&airdate, app.now());
            if remaining == Countdown::InvalidDate {
                return Err(format!("{}: '{}'", remaining, airdate));
            }
            println!("{}", remaining);
        }
        Command::Browse => browse(app).await.map_err(|e| e.to_string())?,
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet);

    let config = match Config::resolve(cli.api_url, cli.data_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    tracing::debug!(?config, "resolved configuration");

    let (provider, store) = match config.open() {
        Ok(opened) => opened,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let app = Showdown::new(Arc::new(provider), Arc::new(store)).await;
    let result = run(&app, cli.command).await;

    // Favourites are written in the background; wait for them before exiting
    app.flush().await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use showdown::{MemoryStore, TvMazeProvider};

    /// A controller whose catalog refuses every connection
    async fn offline_app() -> Showdown {
        let provider = TvMazeProvider::with_base_url("http://127.0.0.1:9").unwrap();
        Showdown::new(Arc::new(provider), Arc::new(MemoryStore::new())).await
    }

    #[tokio::test]
    async fn test_failed_search_is_an_error() {
        let app = offline_app().await;

        let outcome = app.search("office").await;
        assert_eq!(
            report_search(&app, outcome),
            Err("Failed to fetch shows".to_string())
        );

        let outcome = app.search("  ").await;
        assert_eq!(report_search(&app, outcome), Ok(()));
    }

    #[tokio::test]
    async fn test_countdown_command() {
        let app = offline_app().await;

        let valid = Command::Countdown {
            airdate: "2999-01-01".to_string(),
        };
        assert_eq!(run(&app, valid).await, Ok(()));

        let invalid = Command::Countdown {
            airdate: "next tuesday".to_string(),
        };
        assert_eq!(
            run(&app, invalid).await,
            Err("Invalid date: 'next tuesday'".to_string())
        );
    }

    #[tokio::test]
    async fn test_prompts_run_off_the_async_thread() {
        let caller = std::thread::current().id();

        let prompt_thread = blocking_prompt(|| Ok(std::thread::current().id()))
            .await
            .unwrap();

        assert_ne!(prompt_thread, caller);
    }
}
