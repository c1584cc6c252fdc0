//! Keyhint CLI
//!
//! Entry point for the `keyhint` command-line tool.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use keyhint::assemble::keys::display_label;
use keyhint::matcher::explain::MatchExplain;
use keyhint::settings::default_settings_path;
use keyhint::{
    logging, ActiveWindow, Catalog, EffectiveSettings, Loader, Report, Section, SelectionRequest,
    SettingsOverrides, SortMode,
};

#[derive(Parser)]
#[command(name = "keyhint")]
#[command(about = "Keyboard shortcut cheatsheets for the focused window", version)]
struct Cli {
    /// Log pipeline decisions to stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Settings file (default: <config dir>/keyhint.toml)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Directory of bundled sheets
    #[arg(long, global = true)]
    builtin_dir: Option<PathBuf>,

    /// Directory of user sheets (default: <config dir>/keyhint/)
    #[arg(long, global = true)]
    user_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cheatsheet for a window, or one picked by id
    Show {
        /// Show this cheatsheet instead of matching the window
        #[arg(long, short = 'i')]
        cheatsheet: Option<String>,

        /// Cheatsheet to show when nothing matches
        #[arg(long, short = 'f')]
        fallback: Option<String>,

        /// Class of the active window
        #[arg(long, default_value = "")]
        wmclass: String,

        /// Title of the active window
        #[arg(long, default_value = "")]
        title: String,

        /// Section order: native, size or title
        #[arg(long, short = 's')]
        sort: Option<SortMode>,

        /// Only shortcuts whose key or description contains this text
        #[arg(long)]
        filter: Option<String>,

        /// Output the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List cheatsheet ids
    List {
        /// Include hidden cheatsheets
        #[arg(long, short = 'a')]
        all: bool,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Explain which cheatsheet a window selects and why
    Explain {
        /// Class of the active window
        #[arg(long, default_value = "")]
        wmclass: String,

        /// Title of the active window
        #[arg(long, default_value = "")]
        title: String,

        /// Explicit cheatsheet id
        #[arg(long, short = 'i')]
        cheatsheet: Option<String>,

        /// Cheatsheet to show when nothing matches
        #[arg(long, short = 'f')]
        fallback: Option<String>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Load every sheet and report problems
    Check {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("Error initializing logging: {}", e);
    }

    let mut overrides = SettingsOverrides {
        builtin_dir: cli.builtin_dir.clone(),
        user_dir: cli.user_dir.clone(),
        ..Default::default()
    };

    match cli.command {
        Commands::Show {
            cheatsheet,
            fallback,
            wmclass,
            title,
            sort,
            filter,
            json,
        } => {
            overrides.fallback_cheatsheet = fallback;
            overrides.sort_by = sort;
            let settings = load_settings(cli.config, &overrides);
            run_show(&settings, cheatsheet, ActiveWindow::new(wmclass, title), filter, json);
        }
        Commands::List { all, json } => {
            let settings = load_settings(cli.config, &overrides);
            run_list(&settings, all, json);
        }
        Commands::Explain {
            wmclass,
            title,
            cheatsheet,
            fallback,
            json,
        } => {
            overrides.fallback_cheatsheet = fallback;
            let settings = load_settings(cli.config, &overrides);
            run_explain(&settings, cheatsheet, ActiveWindow::new(wmclass, title), json);
        }
        Commands::Check { json } => {
            let settings = load_settings(cli.config, &overrides);
            run_check(&settings, json);
        }
    }
}

fn load_settings(config_path: Option<PathBuf>, overrides: &SettingsOverrides) -> EffectiveSettings {
    let path = config_path.unwrap_or_else(default_settings_path);
    match EffectiveSettings::build(Some(&path), overrides) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            process::exit(1);
        }
    }
}

fn load_catalog(settings: &EffectiveSettings) -> Catalog {
    let s = &settings.settings;
    Catalog::load(Loader::new(&s.builtin_dir, &s.user_dir))
}

fn print_json(result: Result<String, serde_json::Error>) {
    match result {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }
}

fn run_show(
    settings: &EffectiveSettings,
    cheatsheet: Option<String>,
    window: ActiveWindow,
    filter: Option<String>,
    json_output: bool,
) {
    let catalog = load_catalog(settings);
    let s = &settings.settings;

    let mut request = SelectionRequest::new(s.fallback_cheatsheet.clone(), window.clone());
    if let Some(id) = cheatsheet {
        request = request.with_explicit(id);
    }

    let selection = match catalog.select(&request) {
        Ok(selection) => selection,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if json_output {
        let report = Report::new(&catalog, window, selection, s.sort_by, filter);
        print_json(report.to_json());
        return;
    }

    let Some(sheet) = catalog.get(&selection.id) else {
        eprintln!("Error: cheatsheet '{}' does not exist", selection.id);
        process::exit(1);
    };

    println!("{} ({})", sheet.id, selection.reason.as_str());
    if let Some(ref url) = sheet.url {
        println!("{}", url);
    }

    let sections = sheet.view(s.sort_by, filter.as_deref().unwrap_or_default());
    if sections.is_empty() {
        println!("\nNo shortcuts match.");
        return;
    }
    print_sections(&sections);
}

fn print_sections(sections: &[Section]) {
    for section in sections {
        println!("\n{}", section.title);

        let labels: Vec<String> = section.shortcuts.iter().map(|s| display_label(&s.key)).collect();
        let width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);

        for (label, shortcut) in labels.iter().zip(&section.shortcuts) {
            let pad = width - label.chars().count();
            println!("  {}{}  {}", label, " ".repeat(pad), shortcut.description);
        }
    }
}

fn run_list(settings: &EffectiveSettings, all: bool, json_output: bool) {
    let catalog = load_catalog(settings);
    let listed = catalog.listed(all);

    if json_output {
        let output: Vec<serde_json::Value> = listed
            .iter()
            .map(|sheet| {
                serde_json::json!({
                    "id": sheet.id,
                    "hidden": sheet.hidden,
                    "url": sheet.url,
                    "size": sheet.size(),
                })
            })
            .collect();
        print_json(serde_json::to_string_pretty(&output));
        return;
    }

    if listed.is_empty() {
        println!("No cheatsheets found.");
        return;
    }
    for sheet in listed {
        if sheet.hidden {
            println!("{} (hidden)", sheet.id);
        } else {
            println!("{}", sheet.id);
        }
    }
}

fn run_explain(
    settings: &EffectiveSettings,
    cheatsheet: Option<String>,
    window: ActiveWindow,
    json_output: bool,
) {
    let catalog = load_catalog(settings);

    let mut request = SelectionRequest::new(settings.settings.fallback_cheatsheet.clone(), window);
    if let Some(id) = cheatsheet {
        request = request.with_explicit(id);
    }

    let explain = MatchExplain::build(catalog.documents(), &request);
    if json_output {
        print_json(explain.to_json());
    } else {
        print!("{}", explain.to_human());
    }

    if explain.error.is_some() {
        process::exit(1);
    }
}

fn run_check(settings: &EffectiveSettings, json_output: bool) {
    let catalog = load_catalog(settings);
    let fallback = &settings.settings.fallback_cheatsheet;
    let fallback_ok = catalog.get(fallback).is_some();

    if json_output {
        let diagnostics: Vec<serde_json::Value> = catalog
            .diagnostics()
            .iter()
            .map(|e| serde_json::json!({ "kind": e.kind(), "message": e.to_string() }))
            .collect();
        let output = serde_json::json!({
            "cheatsheets": catalog.len(),
            "fallback": fallback,
            "fallback_ok": fallback_ok,
            "diagnostics": diagnostics,
        });
        print_json(serde_json::to_string_pretty(&output));
    } else {
        println!("Loaded {} cheatsheets", catalog.len());
        for error in catalog.diagnostics() {
            println!("  {}: {}", error.kind(), error);
        }
        if !fallback_ok {
            println!("  INVALID_FALLBACK: fallback cheatsheet '{}' does not exist", fallback);
        }
        if catalog.diagnostics().is_empty() && fallback_ok {
            println!("No problems found.");
        }
    }

    if !catalog.diagnostics().is_empty() || !fallback_ok {
        process::exit(1);
    }
}
