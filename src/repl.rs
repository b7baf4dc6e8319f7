//! Interactive REPL for browsing listing pages.
//!
//! Type `/help` for available commands, Tab for completion. Status output goes
//! to stderr; `/copy` writes the code list to stdout so it can be piped.

use std::path::PathBuf;

use rustyline::completion::{Completer, Pair};
use rustyline::config::CompletionType;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{
    Cmd, ConditionalEventHandler, Config, Editor, Event, EventContext, EventHandler, Helper,
    KeyEvent, RepeatCount,
};
use tokio::runtime::Runtime;
use tracing::{debug, info};

use crate::application::{AppState, ProductExtractionService};
use crate::commands::{
    self, PageSummary, clear_selection, copy_codes, download_codes, list_products,
    select_all_products, session_status, toggle_products,
};
use crate::domain::export::ExportScope;
use crate::domain::services::PageFetcher;
use crate::infrastructure::config::ConfigManager;

const HISTORY_FILE_NAME: &str = "history.txt";

/// Available REPL commands.
const COMMANDS: &[(&str, &str)] = &[
    ("/search", "Load a listing URL from page 1"),
    ("/next", "Go to the next page"),
    ("/prev", "Go to the previous page"),
    ("/page", "Jump to page <n>"),
    ("/list", "Show products on the current page"),
    ("/select", "Toggle selection of <code>..."),
    ("/select-all", "Select every product on the page"),
    ("/clear-selection", "Clear the selection"),
    ("/download", "Save codes to a file: [selected] [path]"),
    ("/copy", "Print codes to stdout: [selected]"),
    ("/status", "Show session status"),
    ("/help", "Show available commands"),
    ("/exit", "Quit the REPL"),
];

/// REPL helper for tab completion.
#[derive(Default)]
struct ExtractorHelper;

impl Completer for ExtractorHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let input = &line[..pos];

        if !input.contains(' ') {
            let matches: Vec<Pair> = COMMANDS
                .iter()
                .filter(|(cmd, _)| cmd.starts_with(input))
                .map(|(cmd, desc)| Pair {
                    display: format!("{cmd:<18} {desc}"),
                    replacement: format!("{cmd} "),
                })
                .collect();
            return Ok((0, matches));
        }

        // scope argument completion
        let (cmd, args) = input.split_once(' ').unwrap_or((input, ""));
        if cmd == "/copy" || cmd == "/download" {
            let prefix_start = input.len() - args.len();
            let matches: Vec<Pair> = ["selected", "all"]
                .iter()
                .filter(|scope| scope.starts_with(args.trim()))
                .map(|scope| Pair {
                    display: scope.to_string(),
                    replacement: format!("{scope} "),
                })
                .collect();
            return Ok((prefix_start, matches));
        }

        Ok((pos, Vec::new()))
    }
}

impl Hinter for ExtractorHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        if pos < line.len() || line.is_empty() {
            return None;
        }
        if line.starts_with('/') && !line.contains(' ') {
            for (cmd, _) in COMMANDS {
                if cmd.starts_with(line) && *cmd != line {
                    return Some(cmd[line.len()..].to_string());
                }
            }
        }
        None
    }
}

impl Highlighter for ExtractorHelper {}
impl Validator for ExtractorHelper {}
impl Helper for ExtractorHelper {}

struct TabCompleteOrAcceptHint;

impl ConditionalEventHandler for TabCompleteOrAcceptHint {
    fn handle(
        &self,
        _evt: &Event,
        _n: RepeatCount,
        _positive: bool,
        ctx: &EventContext<'_>,
    ) -> Option<Cmd> {
        if ctx.has_hint() {
            Some(Cmd::CompleteHint)
        } else {
            Some(Cmd::Complete)
        }
    }
}

/// What the loop should do after a command
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Run the interactive REPL until `/exit` or EOF.
pub fn run<F: PageFetcher>(
    runtime: &Runtime,
    service: &ProductExtractionService<F>,
    state: &mut AppState,
) -> anyhow::Result<()> {
    eprintln!();
    eprintln!(
        "  \x1b[1mproduct-extractor v{}\x1b[0m \x1b[90m- listing page product code extractor\x1b[0m",
        env!("CARGO_PKG_VERSION")
    );
    eprintln!();
    eprintln!(
        "    Start with \x1b[36m/search <url>\x1b[0m, \x1b[90mTab\x1b[0m to complete, \x1b[90m/exit\x1b[0m to quit."
    );
    eprintln!();

    let config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .completion_type(CompletionType::List)
        .completion_prompt_limit(20)
        .build();

    let mut rl: Editor<ExtractorHelper, rustyline::history::DefaultHistory> =
        Editor::with_config(config)?;
    rl.set_helper(Some(ExtractorHelper));
    rl.bind_sequence(
        KeyEvent::from('\t'),
        EventHandler::Conditional(Box::new(TabCompleteOrAcceptHint)),
    );

    let hist_path = history_path();
    if let Some(path) = hist_path.as_ref().filter(|p| p.exists()) {
        let _ = rl.load_history(path);
    }

    info!("REPL session started");

    loop {
        let prompt = format!(" \x1b[36mproducts[p{}]>\x1b[0m ", state.page());
        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if dispatch(line, runtime, service, state) == Flow::Exit {
                    eprintln!("  Goodbye!");
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                eprintln!("  \x1b[90m(Ctrl+C)\x1b[0m Type \x1b[1m/exit\x1b[0m to quit.");
            }
            Err(ReadlineError::Eof) => {
                eprintln!("  Goodbye!");
                break;
            }
            Err(err) => {
                eprintln!("  Error: {err}");
                break;
            }
        }
    }

    if let Some(path) = hist_path {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let _ = rl.save_history(&path);
    }
    info!("REPL session ended");

    Ok(())
}

fn history_path() -> Option<PathBuf> {
    ConfigManager::get_app_data_dir()
        .ok()
        .map(|dir| dir.join(HISTORY_FILE_NAME))
}

fn dispatch<F: PageFetcher>(
    line: &str,
    runtime: &Runtime,
    service: &ProductExtractionService<F>,
    state: &mut AppState,
) -> Flow {
    let input = line.strip_prefix('/').unwrap_or(line);
    if input.is_empty() {
        cmd_help();
        return Flow::Continue;
    }

    let (cmd, args) = input.split_once(' ').unwrap_or((input, ""));
    let args = args.trim();
    debug!("REPL command: /{} {}", cmd, args);

    match cmd {
        "exit" | "quit" => return Flow::Exit,
        "help" | "h" | "?" => cmd_help(),
        "search" => {
            if args.is_empty() {
                eprintln!("  Usage: /search <url>");
            } else {
                let result = runtime.block_on(commands::search_products(state, service, args));
                show_page(result, state);
            }
        }
        "next" => {
            let result = runtime.block_on(commands::next_page(state, service));
            show_page(result, state);
        }
        "prev" => {
            let result = runtime.block_on(commands::prev_page(state, service));
            show_page(result, state);
        }
        "page" => match args.parse::<i64>() {
            Ok(n) => {
                let page = u32::try_from(n.max(1)).unwrap_or(u32::MAX);
                let result = runtime.block_on(commands::go_to_page(state, service, page));
                show_page(result, state);
            }
            Err(_) => eprintln!("  Usage: /page <n>"),
        },
        "list" => cmd_list(state),
        "select" => {
            let codes: Vec<&str> = args.split_whitespace().collect();
            match toggle_products(state, &codes) {
                Ok(changes) => {
                    for change in changes {
                        let mark = if change.selected { "[x]" } else { "[ ]" };
                        eprintln!("  {mark} {}", change.code);
                    }
                    eprintln!("  {} selected", state.selection().len());
                }
                Err(message) => eprintln!("  {message}"),
            }
        }
        "select-all" => match select_all_products(state) {
            Ok(count) => eprintln!("  Selected {count} products"),
            Err(message) => eprintln!("  {message}"),
        },
        "clear-selection" => {
            let dropped = clear_selection(state);
            eprintln!("  Cleared {dropped} selected products");
        }
        "copy" => match args.parse::<ExportScope>() {
            Ok(scope) => match copy_codes(state, scope) {
                Ok(text) => println!("{text}"),
                Err(message) => eprintln!("  {message}"),
            },
            Err(message) => eprintln!("  {message}"),
        },
        "download" => {
            let (scope, path) = parse_download_args(args);
            match runtime.block_on(download_codes(state, path, scope)) {
                Ok(summary) => eprintln!(
                    "  Saved {} codes ({}) to {}",
                    summary.count,
                    summary.scope,
                    summary.path.display()
                ),
                Err(message) => eprintln!("  {message}"),
            }
        }
        "status" => cmd_status(state),
        _ => {
            eprintln!("  Unknown command '/{cmd}'. Type /help for commands.");
        }
    }

    Flow::Continue
}

/// `[selected|all] [path]` in either order
fn parse_download_args(args: &str) -> (ExportScope, Option<PathBuf>) {
    let mut scope = ExportScope::All;
    let mut path = None;
    for token in args.split_whitespace() {
        match token.parse::<ExportScope>() {
            Ok(parsed) => scope = parsed,
            Err(_) => path = Some(PathBuf::from(token)),
        }
    }
    (scope, path)
}

fn show_page(result: Result<PageSummary, String>, state: &AppState) {
    match result {
        Ok(summary) if !summary.fetched => {
            if let Some(notice) = state.notice() {
                eprintln!("  {notice}");
            }
        }
        Ok(summary) => {
            if let Some(error) = &summary.error {
                eprintln!("  \x1b[33m!\x1b[0m Failed to load page {}: {error}", summary.page);
                return;
            }
            let source = summary
                .source
                .map_or_else(|| "none".to_string(), |s| s.to_string());
            eprintln!(
                "  Page {}: {} products (source: {})",
                summary.page, summary.product_count, source
            );
            eprintln!("  \x1b[90m{}\x1b[0m", summary.url);
        }
        Err(message) => eprintln!("  \x1b[33m!\x1b[0m {message}"),
    }
}

fn cmd_help() {
    eprintln!();
    eprintln!("  Commands:");
    eprintln!();
    for (cmd, desc) in COMMANDS {
        eprintln!("    {cmd:<18} {desc}");
    }
    eprintln!();
}

fn cmd_list(state: &AppState) {
    let rows = list_products(state);
    if rows.is_empty() {
        eprintln!("  No products on this page");
        return;
    }

    eprintln!();
    for row in &rows {
        let mark = if row.selected { "[x]" } else { "[ ]" };
        eprintln!(
            "  {mark} {:>3}. {:<16} {}",
            row.index,
            row.code,
            row.name.as_deref().unwrap_or("")
        );
        eprintln!("        \x1b[90m{}\x1b[0m", row.detail_url);
    }
    eprintln!();
    eprintln!(
        "  {} products, {} selected",
        rows.len(),
        state.selection().len()
    );
    eprintln!();
}

fn cmd_status(state: &AppState) {
    let status = session_status(state);
    eprintln!();
    eprintln!(
        "  Search:    {}",
        status.base_url.as_deref().unwrap_or("(none)")
    );
    eprintln!("  Page:      {}", status.page);
    eprintln!("  Products:  {}", status.product_count);
    eprintln!("  Selected:  {}", status.selected_count);
    eprintln!(
        "  Source:    {}",
        status
            .source
            .map_or_else(|| "none".to_string(), |s| s.to_string())
    );
    eprintln!(
        "  Text scan: {}",
        if status.text_scan_fallback { "on" } else { "off" }
    );
    if let Some(notice) = &status.notice {
        eprintln!("  Notice:    {notice}");
    }
    eprintln!();
}
