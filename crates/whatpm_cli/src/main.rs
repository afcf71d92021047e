//! `whatpm` command-line front end.
//!
//! # Responsibility
//! - Map subcommands onto core services: item actions, year pages, search,
//!   export download, backup job and stats.
//! - Own process concerns: config resolution, logging init, clock access.

use anyhow::{bail, Context, Result};
use chrono::{Datelike, Local, Utc};
use clap::{Args, Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use whatpm_core::search::refine::refine;
use whatpm_core::{
    init_logging, open_db, ActionError, AppConfig, BackupError, BackupService, ConfigOverrides,
    ExportService, FsObjectStore, Item, ItemForm, ItemKind, ItemService, ItemType, SortOrder,
    SqliteItemRepository, TypeFilter,
};

#[derive(Parser, Debug)]
#[command(name = "whatpm")]
#[command(about = "Log the books, movies and shows you finished each year")]
#[command(version)]
struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database path
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; stderr when unset
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log a new item in the current year
    Add(ItemArgs),
    /// Edit an existing item
    Update {
        id: String,
        #[command(flatten)]
        item: ItemArgs,
        /// Year the item is logged under
        #[arg(long)]
        year_logged: Option<String>,
    },
    /// Delete an item permanently
    Delete { id: String },
    /// Show one item
    Show { id: String },
    /// List items logged in a year (defaults to the current year)
    List {
        #[arg(long)]
        year: Option<i32>,
    },
    /// List years with logged items
    Years,
    /// Search titles, authors and directors
    Search {
        query: String,
        #[arg(long, default_value = "relevance")]
        sort: SortOrder,
        #[arg(long = "type", default_value = "all")]
        itemtype: TypeFilter,
    },
    /// Export items as CSV or JSON
    Export {
        #[arg(long)]
        format: Option<String>,
        #[arg(long)]
        year: Option<String>,
        /// Output directory; the dated filename is appended
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Run the scheduled backup job
    Backup {
        /// Authorization header value, e.g. `Bearer <secret>`
        #[arg(long, env = "WHATPM_AUTHORIZATION")]
        authorization: Option<String>,
        /// Object store root directory
        #[arg(long)]
        store_root: Option<PathBuf>,
    },
    /// Show totals and per-year counts
    Stats,
}

#[derive(Args, Debug)]
struct ItemArgs {
    #[arg(long)]
    title: String,
    /// book, movie or show
    #[arg(long = "type")]
    itemtype: ItemType,
    #[arg(long)]
    published_year: String,
    #[arg(long)]
    author: Option<String>,
    #[arg(long)]
    director: Option<String>,
    #[arg(long)]
    season: Option<String>,
    /// Re-read or re-watched
    #[arg(long)]
    redo: bool,
    /// Show is still being watched
    #[arg(long)]
    in_progress: bool,
}

impl ItemArgs {
    fn into_form(self, belongs_to_year: Option<String>) -> ItemForm {
        ItemForm {
            title: self.title,
            itemtype: self.itemtype.as_str().to_string(),
            published_year: self.published_year,
            belongs_to_year,
            author: self.author,
            director: self.director,
            season: self.season,
            redo: self.redo,
            in_progress: self.in_progress,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let backup_root = match &cli.command {
        Command::Backup { store_root, .. } => store_root.clone(),
        _ => None,
    };
    let config = AppConfig::load(ConfigOverrides {
        config_path: cli.config,
        database_path: cli.db,
        log_level: cli.log_level,
        log_dir: cli.log_dir,
        backup_root,
        backup_secret: None,
    })
    .context("Failed to load configuration")?;

    let log_dir = config
        .log_dir
        .as_ref()
        .map(|dir| dir.to_string_lossy().into_owned());
    init_logging(&config.log_level, log_dir.as_deref())
        .map_err(anyhow::Error::msg)
        .context("Failed to initialize logging")?;

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let conn = open_db(&config.database_path)
        .with_context(|| format!("Failed to open {}", config.database_path.display()))?;
    let repo = SqliteItemRepository::try_new(&conn).context("Database is not initialized")?;
    let items = ItemService::new(repo);

    let current_year = Local::now().year();
    info!("event=cli_command module=cli status=start");

    match cli.command {
        Command::Add(item) => {
            let redirect = items
                .create_item(&item.into_form(None), current_year)
                .map_err(action_failure)?;
            println!("Saved {} -> {}", redirect.item_id, redirect.location);
        }
        Command::Update {
            id,
            item,
            year_logged,
        } => {
            let redirect = items
                .update_item(&id, &item.into_form(year_logged), current_year)
                .map_err(action_failure)?;
            println!("Updated {} -> {}", redirect.item_id, redirect.location);
        }
        Command::Delete { id } => {
            let redirect = items.delete_item(&id).map_err(action_failure)?;
            println!("Deleted {} -> {}", redirect.item_id, redirect.location);
        }
        Command::Show { id } => match items.get_item(&id).map_err(anyhow::Error::msg)? {
            Some(item) => print_item(&item),
            None => bail!("Item not found."),
        },
        Command::List { year } => {
            let year = year.unwrap_or(current_year);
            let logged = items.items_for_year(year).map_err(anyhow::Error::msg)?;
            if logged.is_empty() {
                println!("Nothing logged in {year}.");
            }
            for item in &logged {
                print_item(item);
            }
        }
        Command::Years => {
            for year in items.logged_years().map_err(anyhow::Error::msg)? {
                println!("{year}");
            }
        }
        Command::Search {
            query,
            sort,
            itemtype,
        } => {
            let state = items.search(&query);
            if let Some(message) = &state.message {
                bail!("{message}");
            }
            let results = refine(&state.results, sort, itemtype);
            if results.is_empty() {
                println!("No results for \"{}\".", state.query);
            }
            for item in &results {
                print_item(item);
            }
        }
        Command::Export { format, year, out } => {
            let download = ExportService::new(&items)
                .download(format.as_deref(), year.as_deref(), Utc::now())
                .map_err(|err| anyhow::Error::new(err).context("Export failed"))?;
            match out {
                Some(dir) => {
                    let path = dir.join(&download.filename);
                    std::fs::write(&path, &download.body)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Wrote {} item(s) to {}", download.item_count, path.display());
                }
                None => println!("{}", download.body),
            }
        }
        Command::Backup { authorization, .. } => {
            let store = FsObjectStore::new(config.backup.store_root.clone());
            let summary = BackupService::new(&items, &store, config.backup.secret.clone())
                .run(authorization.as_deref(), Utc::now())
                .map_err(|err| match err {
                    BackupError::Unauthorized => anyhow::anyhow!("Unauthorized"),
                    other => anyhow::Error::new(other).context("Backup failed"),
                })?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Stats => {
            let stats = items.stats(current_year).map_err(anyhow::Error::msg)?;
            println!("All time:");
            for count in &stats.totals {
                println!("  {}: {}", count.itemtype, count.count);
            }
            println!("{}:", stats.current_year);
            for count in &stats.current_year_counts {
                println!("  {}: {}", count.itemtype, count.count);
            }
            println!("Years logged: {}", stats.years_logged);
            for year in &stats.cumulative {
                println!(
                    "  {} books={} movies={} shows={}",
                    year.year, year.books, year.movies, year.shows
                );
            }
        }
    }

    Ok(())
}

fn action_failure(err: ActionError) -> anyhow::Error {
    anyhow::anyhow!(err.user_message())
}

fn print_item(item: &Item) {
    let creator = match &item.kind {
        ItemKind::Book { author } => format!("by {author}"),
        ItemKind::Movie { director } => format!("dir. {director}"),
        ItemKind::Show {
            season,
            in_progress,
        } => {
            let progress = if in_progress.unwrap_or(false) {
                ", in progress"
            } else {
                ""
            };
            format!("season {season}{progress}")
        }
    };
    let redo = if item.redo { " (again)" } else { "" };
    println!(
        "{}  [{}] {} ({}) {creator}{redo}  logged {}",
        item.id,
        item.item_type(),
        item.title,
        item.published_year,
        item.belongs_to_year
    );
}
