mod clipboard;
mod config;
mod editor;
mod executor;
mod lister;
mod matcher;
mod model;
mod plugin;
mod results;
mod sources;
mod store;

use std::path::PathBuf;
use std::process::ExitCode;
use anyhow::{Context, Result, bail};
use clap::{Args as ClapArgs, Parser, Subcommand};
use log::error;

use crate::config::{Settings, config_path, load_config};
use crate::editor::{Draft, Editor};
use crate::lister::visible_title;
use crate::model::ShortcutType;
use crate::plugin::Plugin;
use crate::sources::chromium::ChromiumSource;
use crate::sources::{ImportOptions, Source, browsers};

#[derive(Parser, Debug)]
#[command(author, version, about = "Keyword shortcuts for folders, files, apps and URLs", long_about = None)]
struct Args {
    /// Use this shortcuts file instead of the configured one
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Handle one JSON-RPC request from the launcher and print the reply
    Rpc { request: String },
    /// Show what the launcher would show for a query
    #[command(visible_alias = "search")]
    Query { query: Vec<String> },
    /// Print every shortcut in file order
    List,
    /// Add a shortcut
    Add(AddArgs),
    /// Change fields of an existing shortcut
    Edit(EditArgs),
    /// Delete a shortcut
    Remove { keyword: String },
    /// Import browser bookmarks as URL shortcuts
    Import(ImportArgs),
    /// List browsers with a bookmarks file
    Browsers,
    /// Show or change where shortcuts are saved
    Location {
        path: Option<PathBuf>,
        /// Copy the current shortcuts to the new location
        #[arg(long)]
        copy: bool,
    },
}

#[derive(ClapArgs, Debug)]
struct AddArgs {
    keyword: String,
    #[arg(short = 't', long = "type", value_enum)]
    kind: ShortcutType,
    path: String,
    #[arg(short, long, default_value = "")]
    category: String,
    #[arg(short, long)]
    priority: Option<i64>,
    #[arg(long, default_value = "")]
    icon: String,
    /// Application to open a file shortcut with
    #[arg(long, default_value = "")]
    open_with: String,
}

#[derive(ClapArgs, Debug)]
struct EditArgs {
    keyword: String,
    /// New keyword
    #[arg(long = "rename")]
    new_keyword: Option<String>,
    #[arg(short = 't', long = "type", value_enum)]
    kind: Option<ShortcutType>,
    #[arg(long)]
    path: Option<String>,
    #[arg(short, long)]
    category: Option<String>,
    #[arg(short, long)]
    priority: Option<i64>,
    #[arg(long)]
    icon: Option<String>,
    #[arg(long)]
    open_with: Option<String>,
}

#[derive(ClapArgs, Debug)]
struct ImportArgs {
    /// Browser label as printed by `browsers`
    #[arg(short, long, conflicts_with = "file")]
    browser: Option<String>,
    /// A Chromium-style Bookmarks file
    #[arg(short, long)]
    file: Option<PathBuf>,
    /// Import everything listed
    #[arg(long)]
    all: bool,
    /// Indices (as listed) to import
    #[arg(short, long, num_args = 1..)]
    select: Vec<usize>,
    /// Only bookmarks whose folder contains this text
    #[arg(long)]
    folder: Option<String>,
    #[arg(long, default_value = "Bookmarks")]
    category: String,
    #[arg(long, default_value_t = 80)]
    priority: i64,
    /// Don't use the bookmark folder as the category
    #[arg(long)]
    no_folder_category: bool,
    /// Print what would be added without saving
    #[arg(long)]
    dry_run: bool,
}

fn main() -> ExitCode {
    env_logger::init();

    // The launcher passes the request as the only argument.
    let mut argv: Vec<String> = std::env::args().collect();
    if argv.get(1).is_some_and(|a| a.trim_start().starts_with('{')) {
        argv.insert(1, "rpc".to_string());
    }
    let args = Args::parse_from(argv);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let config = load_config().unwrap_or_else(|e| {
        error!("Error loading settings, using defaults: {}", e);
        Default::default()
    });
    let mut settings = Settings::resolve(config, config_path());
    if let Some(store) = args.store {
        settings.store_path = store;
    }

    match args.command {
        Command::Rpc { request } => {
            let mut plugin = Plugin::new(settings);
            println!("{}", plugin.handle_json(&request)?);
        }
        Command::Query { query } => {
            let plugin = Plugin::new(settings);
            for item in plugin.query(&query.join(" ")) {
                println!("{:>6}  {}", item.score, visible_title(&item.title));
                println!("        {}", item.sub_title);
            }
        }
        Command::List => {
            let editor = Editor::open(&settings.store_path)?;
            print_table(&editor);
        }
        Command::Add(add) => {
            let mut editor = Editor::open(&settings.store_path)?;
            let record = editor.add(Draft {
                keyword: add.keyword,
                kind: add.kind,
                path: add.path,
                category: add.category,
                priority: add.priority,
                icon: add.icon,
                open_with: add.open_with,
            })?;
            println!("Added '{}' to {}", record.keyword, record.category);
        }
        Command::Edit(edit) => {
            let mut editor = Editor::open(&settings.store_path)?;
            let current = editor
                .store()
                .find(&edit.keyword)
                .with_context(|| format!("no shortcut named '{}'", edit.keyword))?;
            let mut draft = Draft::from_record(current);
            if let Some(v) = edit.new_keyword { draft.keyword = v; }
            if let Some(v) = edit.kind { draft.kind = v; }
            if let Some(v) = edit.path { draft.path = v; }
            if let Some(v) = edit.category { draft.category = v; }
            if let Some(v) = edit.priority { draft.priority = Some(v); }
            if let Some(v) = edit.icon { draft.icon = v; }
            if let Some(v) = edit.open_with { draft.open_with = v; }
            let record = editor.edit(&edit.keyword, draft)?;
            println!("Updated '{}'", record.keyword);
        }
        Command::Remove { keyword } => {
            let mut editor = Editor::open(&settings.store_path)?;
            if editor.remove(&keyword)? {
                println!("Deleted '{}'", keyword);
            } else {
                println!("No shortcut named '{}'", keyword);
            }
        }
        Command::Import(import) => run_import(&settings, import)?,
        Command::Browsers => {
            let found = browsers::discover();
            if found.is_empty() {
                println!("No browser bookmarks found");
            }
            for source in found {
                println!("{:<24} {}", source.label, source.path.display());
            }
        }
        Command::Location { path, copy } => match path {
            None => println!("{}", settings.store_path.display()),
            Some(path) => {
                let mut editor = Editor::open(&settings.store_path)?;
                let used = editor.change_location(&path, copy)?;
                settings.remember_store_path(&used)?;
                println!("Shortcuts will now be saved to {}", used.display());
            }
        },
    }
    Ok(())
}

fn print_table(editor: &Editor) {
    let records = editor.records();
    if records.is_empty() {
        println!("No shortcuts in {}", editor.store().path().display());
        return;
    }
    println!("{:<20} {:<7} {:<16} {:>4}  PATH", "KEYWORD", "TYPE", "CATEGORY", "PRIO");
    for r in records {
        println!("{:<20} {:<7} {:<16} {:>4}  {}", r.keyword, r.kind, r.category, r.priority, r.path);
    }
    println!("{} shortcut(s) in {}", records.len(), editor.store().path().display());
}

fn run_import(settings: &Settings, args: ImportArgs) -> Result<()> {
    let source = match (&args.file, &args.browser) {
        (Some(file), _) => ChromiumSource::new("Custom Location", file),
        (None, browser) => {
            let found = browsers::discover();
            let picked = match browser {
                Some(label) => browsers::find(&found, label).cloned(),
                None => found.first().cloned(),
            };
            match picked {
                Some(source) => source,
                None => bail!("no bookmarks file found, pass --file"),
            }
        }
    };

    let listed = sources::filter_by_folder(source.scan_or_empty(), args.folder.as_deref());
    if listed.is_empty() {
        println!("No bookmarks found in {}", source.name());
        return Ok(());
    }

    let chosen = sources::select(&listed, args.all, &args.select);
    if chosen.is_empty() {
        println!("Loaded bookmarks from {}:", source.name());
        for (i, b) in &listed {
            let folder = if b.folder.is_empty() { "Root" } else { &b.folder };
            println!("{:>4}  [{}] {}", i, folder, b.display_name());
        }
        println!("Pass --all or --select <index>... to import");
        return Ok(());
    }

    let options = ImportOptions {
        default_category: args.category,
        priority: args.priority,
        folder_as_category: !args.no_folder_category,
    };

    if args.dry_run {
        let editor = Editor::open_read_only(&settings.store_path)?;
        let (records, renamed) = editor.preview_import(&chosen, &options);
        for r in &records {
            println!("{:<30} [{}] {}", r.keyword, r.category, r.path);
        }
        println!("{} bookmark(s) would be imported, {} renamed", records.len(), renamed);
        return Ok(());
    }

    let mut editor = Editor::open(&settings.store_path)?;
    let summary = editor.import(&chosen, &options)?;
    println!("Successfully imported {} bookmark(s)!", summary.added);
    if summary.renamed > 0 {
        println!("Note: {} keyword(s) were renamed to avoid duplicates.", summary.renamed);
    }
    Ok(())
}
