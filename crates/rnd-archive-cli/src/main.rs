//! RND Archive CLI - Chart search and image previews
//!
//! Terminal front end for the archive's search API and the admin image widgets.

mod config;
mod display;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dialoguer::{Input, Password};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

use rnd_archive::services::format::result_count_label;
use rnd_archive::services::image_preview::{BACKGROUND_IMAGE_FIELD, CLIPBOARD_IMAGE_FIELD};
use rnd_archive::services::render::render_page;
use rnd_archive::{
    ClipboardItem, ClipboardPastePreview, FileInputPreview, HttpClient, NotificationCenter,
    PasteEvent, PreviewOutcome, ResultsView, SearchController, SearchEvent, SearchState,
    SelectedFile, SortKey,
};

use config::Config;
use display::{print_toast, print_view};

/// Extra wait after an event so the controller can pick it up
const RENDER_GRACE: Duration = Duration::from_millis(20);
/// Upper bound for one browse round trip
const RENDER_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Parser)]
#[command(name = "rnd-archive")]
#[command(about = "RND Archive CLI - Chart search and image previews", long_about = None)]
#[command(version)]
struct Cli {
    /// Archive URL (overrides the config file)
    #[arg(long, env = "RND_ARCHIVE_BASE_URL", global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store the session cookies of a logged-in browser
    Login {
        /// Value of the csrftoken cookie (will prompt if not provided)
        #[arg(long)]
        csrf_token: Option<String>,
        /// Value of the sessionid cookie
        #[arg(long)]
        session: Option<String>,
    },

    /// Run a single search
    Search {
        /// Free-text query
        query: Option<String>,
        /// Tag filter (repeatable or comma-separated)
        #[arg(short, long = "tag", value_delimiter = ',')]
        tags: Vec<String>,
        /// Sort key, e.g. "-published_date" or "title"
        #[arg(short, long)]
        sort: Option<String>,
        /// Page number (1-based)
        #[arg(short, long, default_value = "1")]
        page: u32,
        /// Print the rendered view as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interactive search session
    Browse,

    /// Preview an image file as the background image input would
    PreviewImage {
        /// Image file
        path: PathBuf,
    },

    /// Paste an image file as if it came from the clipboard
    PasteImage {
        /// File standing in for the clipboard content
        path: PathBuf,
        /// MIME type of the clipboard item (guessed from the extension if omitted)
        #[arg(long)]
        mime: Option<String>,
        /// Write the data URL here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Login { csrf_token, session } => cmd_login(cli.base_url, csrf_token, session).await,
        Commands::Search { query, tags, sort, page, json } => {
            let config = load_config(cli.base_url)?;
            cmd_search(&config, query, tags, sort, page, json).await
        }
        Commands::Browse => {
            let config = load_config(cli.base_url)?;
            cmd_browse(&config).await
        }
        Commands::PreviewImage { path } => cmd_preview_image(&path).await,
        Commands::PasteImage { path, mime, out } => cmd_paste_image(path, mime, out).await,
        Commands::Config => cmd_config(cli.base_url),
    }
}

fn load_config(base_url: Option<String>) -> Result<Config> {
    let mut config = Config::load()?;
    if let Some(url) = base_url {
        config.base_url = url;
    }
    Ok(config)
}

fn archive_client(config: &Config) -> Result<(HttpClient, Arc<NotificationCenter>)> {
    let notifications = Arc::new(NotificationCenter::new(config.toast_duration()));
    let client = HttpClient::new(config.client_config(), notifications.clone())
        .context("Failed to build HTTP client")?;
    Ok((client, notifications))
}

// ============================================
// Command Implementations
// ============================================

async fn cmd_login(
    base_url: Option<String>,
    csrf_token: Option<String>,
    session: Option<String>,
) -> Result<()> {
    let mut config = Config::load()?;

    let csrf_token = match csrf_token {
        Some(t) => t,
        None => Password::new()
            .with_prompt("csrftoken cookie")
            .interact()
            .context("Failed to read csrftoken")?,
    };

    let session = match session {
        Some(s) => Some(s),
        None => {
            let s: String = Input::new()
                .with_prompt("sessionid cookie (empty to skip)")
                .allow_empty(true)
                .interact_text()
                .context("Failed to read sessionid")?;
            Some(s).filter(|s| !s.trim().is_empty())
        }
    };

    config.set_credentials(csrf_token, session);

    // Test connection against the effective URL without persisting an override
    let mut effective = config.clone();
    if let Some(url) = base_url {
        effective.base_url = url;
    }
    let (client, _) = archive_client(&effective)?;
    print!("Testing connection... ");

    match client.search(&SearchState::new(1).to_query()).await {
        Ok(page) => {
            println!("{} ({})", "OK".green(), result_count_label(page.total_count));
        }
        Err(e) => {
            println!("{}", "Failed".red());
            bail!("Could not reach the archive at {}: {}", effective.base_url, e);
        }
    }

    config.save()?;
    println!("{} Cookies saved to {:?}", "✓".green(), Config::config_path()?);

    Ok(())
}

async fn cmd_search(
    config: &Config,
    query: Option<String>,
    tags: Vec<String>,
    sort: Option<String>,
    page: u32,
    json: bool,
) -> Result<()> {
    let (client, notifications) = archive_client(config)?;

    let mut state = SearchState::new(config.page_size);
    state.query_text = query.unwrap_or_default();
    for tag in tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        if !state.is_tag_selected(tag) {
            state.toggle_tag(tag);
        }
    }
    if let Some(sort) = sort {
        state.sort_key = SortKey::from(sort.as_str());
    }
    state.page_index = page.max(1);

    let result = match client.search(&state.to_query()).await {
        Ok(result) => result,
        Err(e) => {
            for toast in notifications.visible() {
                print_toast(&toast);
            }
            return Err(e).context("Search failed");
        }
    };
    state.total_result_count = result.total_count;

    let mut view = ResultsView {
        result_count_label: Some(result_count_label(result.total_count)),
        load_more_visible: state.has_more(),
        query_text: state.query_text.clone(),
        selected_tags: state.selected_tags.clone(),
        sort_key: state.sort_key.clone(),
        ..Default::default()
    };
    view.replace(render_page(&result.results));

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    print_view(&view, &config.base_url);
    if state.has_more() {
        println!("{}", format!("Next page: --page {}", state.page_index + 1).dimmed());
    }

    Ok(())
}

/// One line of input in a browse session
#[derive(Debug, Clone, PartialEq)]
enum BrowseCommand {
    Event(SearchEvent),
    Help,
    Quit,
    Unknown(String),
}

fn parse_browse_command(line: &str) -> BrowseCommand {
    let line = line.trim();
    let Some(command) = line.strip_prefix(':') else {
        return BrowseCommand::Event(SearchEvent::QueryInput(line.to_string()));
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match (name, arg) {
        ("q" | "quit", _) => BrowseCommand::Quit,
        ("h" | "help", _) => BrowseCommand::Help,
        ("more", _) => BrowseCommand::Event(SearchEvent::LoadMore),
        ("reset", _) => BrowseCommand::Event(SearchEvent::Reset),
        ("refresh", _) => BrowseCommand::Event(SearchEvent::Refresh),
        ("tag", tag) if !tag.is_empty() => BrowseCommand::Event(SearchEvent::ToggleTag(tag.to_string())),
        ("sort", key) if !key.is_empty() => BrowseCommand::Event(SearchEvent::SortChanged(SortKey::from(key))),
        _ => BrowseCommand::Unknown(line.to_string()),
    }
}

fn print_browse_help() {
    println!("{}", "Type to search. Commands:".dimmed());
    println!("  {}    toggle a tag filter", ":tag <name>".cyan());
    println!("  {}    change sort order (e.g. -published_date, title)", ":sort <key>".cyan());
    println!("  {}          load the next page", ":more".cyan());
    println!("  {}         clear query, tags and sort", ":reset".cyan());
    println!("  {}          leave", ":quit".cyan());
}

async fn cmd_browse(config: &Config) -> Result<()> {
    let (client, notifications) = archive_client(config)?;
    let printer = spawn_toast_printer(&notifications);

    let handle = SearchController::new(
        Arc::new(client),
        notifications.clone(),
        config.controller_config(),
    )
    .spawn();
    let mut view = handle.view();
    let search_delay = Duration::from_millis(config.search_delay_ms);

    print_browse_help();
    handle.send(SearchEvent::Refresh).await?;
    wait_for_render(&mut view, Duration::ZERO).await;
    print_view(&handle.current_view(), &config.base_url);

    loop {
        let line = prompt_line().await?;
        let event = match parse_browse_command(&line) {
            BrowseCommand::Quit => break,
            BrowseCommand::Help => {
                print_browse_help();
                continue;
            }
            BrowseCommand::Unknown(input) => {
                println!("{} Unknown command: {}", "?".yellow(), input);
                continue;
            }
            BrowseCommand::Event(event) => event,
        };

        let delay = match event {
            SearchEvent::QueryInput(_) => search_delay,
            _ => Duration::ZERO,
        };
        handle.send(event).await?;
        wait_for_render(&mut view, delay).await;
        print_view(&handle.current_view(), &config.base_url);
    }

    handle.shutdown().await?;
    printer.abort();

    Ok(())
}

async fn wait_for_render(view: &mut watch::Receiver<ResultsView>, delay: Duration) {
    tokio::time::sleep(delay + RENDER_GRACE).await;
    let waited = tokio::time::timeout(RENDER_TIMEOUT, view.wait_for(|v| v.loading.is_none())).await;
    if waited.is_err() {
        tracing::warn!(timeout = ?RENDER_TIMEOUT, "Search still running, showing current results");
    }
}

async fn prompt_line() -> Result<String> {
    tokio::task::spawn_blocking(|| {
        Input::<String>::new()
            .with_prompt("search")
            .allow_empty(true)
            .interact_text()
    })
    .await
    .context("Prompt task failed")?
    .context("Failed to read input")
}

fn spawn_toast_printer(notifications: &NotificationCenter) -> JoinHandle<()> {
    let mut toasts = notifications.subscribe();
    tokio::spawn(async move {
        loop {
            match toasts.recv().await {
                Ok(toast) => print_toast(&toast),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

async fn cmd_preview_image(path: &Path) -> Result<()> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read file: {:?}", path))?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut widget = FileInputPreview::new();
    match widget.on_change(Some(SelectedFile::new(name, mime.essence_str(), bytes))) {
        PreviewOutcome::Rendered => {
            let pane = widget.pane();
            if let Some(image) = &pane.image {
                println!("{} {} [{}]", "✓".green(), image.caption, BACKGROUND_IMAGE_FIELD.dimmed());
                println!("  {}", image.src.cyan());
                println!(
                    "  {}",
                    format!("max {}x{} px", image.max_width, image.max_height).dimmed()
                );
            }
            if let Some(warning) = &pane.warning {
                println!("{}", warning.red().bold());
            }
        }
        PreviewOutcome::Skipped => {
            println!("{} {:?} is not an image ({}); nothing to preview", "-".yellow(), path, mime);
        }
    }

    Ok(())
}

async fn cmd_paste_image(path: PathBuf, mime: Option<String>, out: Option<PathBuf>) -> Result<()> {
    let mime = mime.unwrap_or_else(|| {
        mime_guess::from_path(&path)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    });

    let mut widget = ClipboardPastePreview::new();
    println!("{}", widget.paste_hint().dimmed());

    let mut event = PasteEvent::new(vec![ClipboardItem::from_file(mime.clone(), path.clone())]);
    let outcome = widget
        .on_paste(&mut event)
        .await
        .with_context(|| format!("Failed to paste {:?}", path))?;

    match outcome {
        PreviewOutcome::Rendered => {
            if let Some(image) = &widget.pane().image {
                println!("{} {} [{}]", "✓".green(), image.caption, CLIPBOARD_IMAGE_FIELD.dimmed());
            }
            match out {
                Some(out) => {
                    tokio::fs::write(&out, widget.hidden_value())
                        .await
                        .with_context(|| format!("Failed to write {:?}", out))?;
                    println!("{} Data URL written to {:?}", "✓".green(), out);
                }
                None => println!("{}", widget.hidden_value()),
            }
            if let Some(warning) = &widget.pane().warning {
                println!("{}", warning.red().bold());
            }
        }
        PreviewOutcome::Skipped => {
            println!("{} Clipboard content is not an image ({}); pasted as usual", "-".yellow(), mime);
        }
    }

    Ok(())
}

fn cmd_config(base_url: Option<String>) -> Result<()> {
    let config = load_config(base_url)?;
    let config_path = Config::config_path()?;

    println!("{}", "Configuration:".bold());
    println!("  Config file: {:?}", config_path);
    println!("  Base URL: {}", config.base_url);
    println!("  API path: {}", config.api_base_path);
    println!(
        "  Session: {}",
        if config.is_logged_in() { "✓ cookies stored".green() } else { "✗ not logged in".red() }
    );
    println!("  Page size: {}", config.page_size);
    println!("  Search delay: {} ms", config.search_delay_ms);
    println!("  Toast duration: {} ms", config.toast_duration_ms);
    println!("  Timeout: {} s", config.timeout_secs);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_query_input() {
        assert_eq!(
            parse_browse_command("  wahl 2024 "),
            BrowseCommand::Event(SearchEvent::QueryInput("wahl 2024".to_string()))
        );
        assert_eq!(
            parse_browse_command(""),
            BrowseCommand::Event(SearchEvent::QueryInput(String::new()))
        );
    }

    #[test]
    fn test_browse_commands() {
        assert_eq!(parse_browse_command(":quit"), BrowseCommand::Quit);
        assert_eq!(parse_browse_command(":q"), BrowseCommand::Quit);
        assert_eq!(parse_browse_command(":more"), BrowseCommand::Event(SearchEvent::LoadMore));
        assert_eq!(parse_browse_command(":reset"), BrowseCommand::Event(SearchEvent::Reset));
        assert_eq!(
            parse_browse_command(":tag Politik und Wahl"),
            BrowseCommand::Event(SearchEvent::ToggleTag("Politik und Wahl".to_string()))
        );
        assert_eq!(
            parse_browse_command(":sort -title"),
            BrowseCommand::Event(SearchEvent::SortChanged(SortKey::TitleDesc))
        );
    }

    #[test]
    fn test_missing_argument_is_unknown() {
        assert_eq!(parse_browse_command(":tag"), BrowseCommand::Unknown(":tag".to_string()));
        assert_eq!(parse_browse_command(":nope"), BrowseCommand::Unknown(":nope".to_string()));
    }
}
