// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::fmt::Write;
use wastewise::render::{count_label, tab_label, LIST_LOAD_ERROR, NOT_FOUND_MESSAGE};
use wastewise::{
    category_counts, confusing_items, logging, parse_item_id, query, Advice, AdviceBook,
    Catalogue, CatalogueArgs, CategoryKey, Item, NotFound,
};

#[derive(Parser)]
#[command(name = "wastewise", version, about = "Look up how to dispose of household waste")]
struct Cli {
    #[command(flatten)]
    catalogue: CatalogueArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Browse the catalogue in a terminal UI (default)
    Browse,

    /// Search items by name or alias
    Search {
        /// Search text (empty shows the starter set)
        #[arg(default_value = "")]
        query: String,

        /// Category key: all, wet, dry-recyclable, dry-nonrecyclable, e-waste, biomedical
        #[arg(long, default_value = "all")]
        category: String,

        #[arg(long)]
        json: bool,
    },

    /// Show disposal advice for one item
    Show {
        /// Item id
        id: String,

        #[arg(long)]
        json: bool,
    },

    /// Item count per category
    Counts {
        #[arg(long)]
        json: bool,
    },

    /// Items people commonly misclassify
    Confusing {
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Browse) {
        Command::Browse => run_ui_mode(&cli.catalogue)?,
        Command::Search { query, category, json } => {
            logging::init("warn")?;
            let catalogue = load_or_exit(&cli.catalogue);
            print!("{}", format_search(&catalogue, &query, &category, json)?);
        }
        Command::Show { id, json } => {
            logging::init("warn")?;
            let catalogue = load_or_exit(&cli.catalogue);
            let advice = cli.catalogue.advice_book()?;
            run_show(&catalogue, &advice, &id, json)?;
        }
        Command::Counts { json } => {
            logging::init("warn")?;
            let catalogue = load_or_exit(&cli.catalogue);
            print!("{}", format_counts(&catalogue, json)?);
        }
        Command::Confusing { json } => {
            logging::init("warn")?;
            let catalogue = load_or_exit(&cli.catalogue);
            print!("{}", format_items(&confusing_items(&catalogue), json)?);
        }
    }

    Ok(())
}

/// A load failure ends the command with a message, never a panic
fn load_or_exit(args: &CatalogueArgs) -> Catalogue {
    match args.source().load_blocking() {
        Ok(catalogue) => catalogue,
        Err(e) => {
            eprintln!("❌ {}", LIST_LOAD_ERROR);
            eprintln!("   {}", e);
            std::process::exit(1);
        }
    }
}

fn format_items(items: &[&Item], json: bool) -> Result<String> {
    if json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(items)?));
    }

    let mut out = format!("{}\n", count_label(items.len()));
    for it in items {
        writeln!(out, "  {:>4}  {:<40} [{}]", it.id, it.name, it.category)?;
    }

    Ok(out)
}

fn format_search(catalogue: &Catalogue, text: &str, category: &str, json: bool) -> Result<String> {
    let key = CategoryKey::parse(category);
    let results = query(catalogue, text, &key);
    tracing::debug!(query = text, category = %key, results = results.len(), "search");

    format_items(&results, json)
}

/// Resolve the `show` argument the same way the detail page resolves `id=`
fn find_item<'a>(catalogue: &'a Catalogue, raw_id: &str) -> Result<&'a Item, NotFound> {
    catalogue.find(parse_item_id(Some(raw_id)))
}

fn run_show(catalogue: &Catalogue, advice: &AdviceBook, raw_id: &str, json: bool) -> Result<()> {
    let it = match find_item(catalogue, raw_id) {
        Ok(it) => it,
        Err(e) => {
            tracing::info!(error = %e, "lookup failed");
            eprintln!("{}", NOT_FOUND_MESSAGE);
            std::process::exit(1);
        }
    };

    print!("{}", format_show(it, &advice.resolve(it), json)?);
    Ok(())
}

fn format_show(it: &Item, advice: &Advice, json: bool) -> Result<String> {
    if json {
        let body = json!({ "item": it, "advice": advice });
        return Ok(format!("{}\n", serde_json::to_string_pretty(&body)?));
    }

    let mut out = String::new();
    writeln!(out, "{}  [{}]", it.name, it.category)?;
    writeln!(out, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
    writeln!(out, "Verdict: {}", advice.verdict)?;
    writeln!(out, "Where:   {}", advice.destination)?;
    if !advice.do_message.is_empty() {
        writeln!(out, "Do:      {}", advice.do_message)?;
        writeln!(out, "Avoid:   {}", advice.avoid_message)?;
    }

    writeln!(out, "\nRules:")?;
    for rule in &it.rules {
        writeln!(out, "  • {}", rule)?;
    }

    writeln!(out, "\nCommon mistakes:")?;
    for mistake in &it.mistakes {
        writeln!(out, "  • {}", mistake)?;
    }

    Ok(out)
}

fn format_counts(catalogue: &Catalogue, json: bool) -> Result<String> {
    let counts = category_counts(catalogue);

    if json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(&counts)?));
    }

    let mut out = String::new();
    for (key, count) in counts.entries() {
        writeln!(out, "  {:<12} {:>4}", tab_label(&key), count)?;
    }

    Ok(out)
}

#[cfg(feature = "tui")]
fn run_ui_mode(args: &CatalogueArgs) -> Result<()> {
    let log_path = std::env::temp_dir().join("wastewise.log");
    logging::init_to_file("info", &log_path)?;

    println!("🖥️  Loading WasteWise...\n");

    let catalogue = load_or_exit(args);
    let advice = args.advice_book()?;

    println!("✓ Loaded {} items", catalogue.len());
    println!("Starting UI... (Press 'q' to quit, logs in {:?})\n", log_path);

    let mut app = ui::App::new(catalogue, advice);
    ui::run_ui(&mut app)?;

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_args: &CatalogueArgs) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the web UI: cargo run --bin wastewise-server --features server");
    std::process::exit(1);
}
