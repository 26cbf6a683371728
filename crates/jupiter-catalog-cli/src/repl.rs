//! Interactive query shell over a loaded catalog.
//!
//! Entered through `jupiter-catalog repl` or `scrape --interactive`.

use std::path::PathBuf;

use rustyline::completion::{Completer, Pair};
use rustyline::config::CompletionType;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{
    Cmd, ConditionalEventHandler, Config, Editor, Event, EventContext, EventHandler, Helper,
    KeyEvent, RepeatCount,
};

use jupiter_catalog::Catalog;

use crate::{export, query, report};

/// Command words with their usage line, in help order.
const COMMANDS: &[(&str, &str, &str)] = &[
    ("/units", "", "List academic units"),
    ("/courses", "[unit]", "List courses, optionally of matching units"),
    ("/search-course", "<term>", "Find courses by name"),
    ("/search-discipline", "<term>", "Find disciplines by code or name"),
    ("/course", "<term>", "Durations and disciplines of one course"),
    ("/stats", "", "Catalog statistics"),
    ("/export", "[file]", "Write disciplines to CSV"),
    ("/clear", "", "Clear the screen"),
    ("/help", "", "This list"),
    ("/exit", "", "Leave the shell"),
];

const HISTORY_FILE: &str = ".jupiter_catalog_history";
const PROMPT: &str = "\x1b[36mcatalog>\x1b[0m ";

/// A parsed input line.
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Units,
    Courses(&'a str),
    SearchCourse(&'a str),
    SearchDiscipline(&'a str),
    Course(&'a str),
    Stats,
    Export(&'a str),
    Clear,
    Help,
    Exit,
    Empty,
    Unknown(&'a str),
}

impl<'a> Command<'a> {
    /// The leading `/` is optional.
    fn parse(line: &'a str) -> Self {
        let line = line.trim();
        let line = line.strip_prefix('/').unwrap_or(line);
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        match word {
            "" => Command::Empty,
            "units" => Command::Units,
            "courses" => Command::Courses(rest),
            "search-course" => Command::SearchCourse(rest),
            "search-discipline" => Command::SearchDiscipline(rest),
            "course" => Command::Course(rest),
            "stats" => Command::Stats,
            "export" => Command::Export(rest),
            "clear" | "cls" => Command::Clear,
            "help" | "h" | "?" => Command::Help,
            "exit" | "quit" | "q" => Command::Exit,
            other => Command::Unknown(other),
        }
    }
}

struct CatalogHelper {
    units: Vec<String>,
}

impl CatalogHelper {
    fn command_pairs(typed: &str) -> Vec<Pair> {
        COMMANDS
            .iter()
            .filter(|(word, _, _)| word.starts_with(typed))
            .map(|(word, usage, about)| Pair {
                display: format!("{:<28} {about}", format!("{word} {usage}")),
                replacement: format!("{word} "),
            })
            .collect()
    }

    fn unit_names(&self, typed: &str) -> Vec<String> {
        let typed = typed.to_lowercase();
        self.units
            .iter()
            .filter(|name| name.to_lowercase().starts_with(&typed))
            .cloned()
            .collect()
    }

    fn csv_files(typed: &str) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(".") else {
            return Vec::new();
        };
        let mut files: Vec<String> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "csv"))
            .filter_map(|path| path.file_name()?.to_str().map(String::from))
            .filter(|name| name.starts_with(typed))
            .collect();
        files.sort();
        files
    }
}

impl Completer for CatalogHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let typed = &line[..pos];
        let Some((word, arg)) = typed.split_once(' ') else {
            return Ok((0, Self::command_pairs(typed)));
        };
        let start = typed.len() - arg.len();

        let names = match word {
            "/courses" => self.unit_names(arg),
            "/export" => Self::csv_files(arg),
            _ => return Ok((pos, Vec::new())),
        };
        let pairs = names
            .into_iter()
            .map(|name| Pair {
                display: name.clone(),
                replacement: name,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for CatalogHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        if pos != line.len() || !line.starts_with('/') || line.contains(' ') {
            return None;
        }
        COMMANDS
            .iter()
            .map(|(word, _, _)| *word)
            .find(|word| word.len() > line.len() && word.starts_with(line))
            .map(|word| word[line.len()..].to_string())
    }
}

impl Highlighter for CatalogHelper {}
impl Validator for CatalogHelper {}
impl Helper for CatalogHelper {}

/// Tab accepts a visible hint, otherwise completes.
struct TabKey;

impl ConditionalEventHandler for TabKey {
    fn handle(
        &self,
        _evt: &Event,
        _n: RepeatCount,
        _positive: bool,
        ctx: &EventContext<'_>,
    ) -> Option<Cmd> {
        Some(if ctx.has_hint() {
            Cmd::CompleteHint
        } else {
            Cmd::Complete
        })
    }
}

/// Read commands until `/exit`, Ctrl+D or a terminal error.
pub fn run(catalog: &Catalog) -> anyhow::Result<()> {
    eprintln!(
        "\n  \x1b[1mjupiter-catalog {}\x1b[0m  \x1b[90m{} units, {} courses, {} disciplines\x1b[0m",
        env!("CARGO_PKG_VERSION"),
        catalog.len(),
        catalog.course_count(),
        catalog.discipline_count(),
    );
    eprintln!("  \x1b[90m/help lists commands, Tab completes.\x1b[0m\n");

    let config = Config::builder()
        .auto_add_history(true)
        .history_ignore_space(true)
        .history_ignore_dups(true)?
        .completion_type(CompletionType::List)
        .build();
    let mut editor: Editor<CatalogHelper, DefaultHistory> = Editor::with_config(config)?;
    editor.set_helper(Some(CatalogHelper {
        units: catalog.iter().map(|unit| unit.name.clone()).collect(),
    }));
    editor.bind_sequence(KeyEvent::from('\t'), EventHandler::Conditional(Box::new(TabKey)));

    let history = history_path();
    if let Err(e) = editor.load_history(&history) {
        tracing::debug!(path = %history.display(), error = %e, "no shell history loaded");
    }

    loop {
        match editor.readline(PROMPT) {
            Ok(line) => match Command::parse(&line) {
                Command::Exit => break,
                command => execute(catalog, command),
            },
            Err(ReadlineError::Interrupted) => eprintln!("  (Ctrl+C) /exit leaves the shell."),
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                tracing::error!(error = %e, "terminal read failed");
                break;
            }
        }
    }

    if let Err(e) = editor.save_history(&history) {
        tracing::warn!(path = %history.display(), error = %e, "could not save shell history");
    }
    Ok(())
}

fn history_path() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(HISTORY_FILE)
}

fn execute(catalog: &Catalog, command: Command<'_>) {
    match command {
        Command::Empty | Command::Exit => {}
        Command::Help => eprint!("{}", help_text()),
        Command::Clear => eprint!("\x1b[2J\x1b[H"),
        Command::Units => {
            let units = query::list_units(catalog);
            eprintln!("\n  {} units:", units.len());
            for (n, unit) in units.iter().enumerate() {
                eprintln!("  {:>4}. {unit}", n + 1);
            }
            eprintln!();
        }
        Command::Courses(filter) => {
            let units = query::list_courses(catalog, filter);
            if units.is_empty() {
                eprintln!("  No unit matches '{filter}'.");
            }
            for unit in units {
                eprintln!("\n  {}", unit.name);
                for course in &unit.courses {
                    eprintln!("    - {} ({} disciplines)", course.name, course.discipline_count());
                }
            }
            eprintln!();
        }
        Command::SearchCourse("") => eprintln!("  Usage: /search-course <term>"),
        Command::SearchCourse(term) => {
            let hits = query::search_courses(catalog, term);
            eprintln!("\n  {} course(s) match '{term}'", hits.len());
            for course in hits {
                eprintln!("    - {course} ({} disciplines)", course.discipline_count());
            }
            eprintln!();
        }
        Command::SearchDiscipline("") => eprintln!("  Usage: /search-discipline <term>"),
        Command::SearchDiscipline(term) => {
            let hits = query::search_disciplines(catalog, term);
            if hits.is_empty() {
                eprintln!("  No discipline matches '{term}'.");
            } else {
                eprint!("\n{}\n", report::discipline_hits(&hits));
            }
        }
        Command::Course("") => eprintln!("  Usage: /course <term>"),
        Command::Course(term) => match query::course_details(catalog, term) {
            Some(course) => eprint!("\n{}\n", report::course_details(course)),
            None => eprintln!("  Course not found: {term}"),
        },
        Command::Stats => eprint!("\n{}\n", report::statistics(&query::statistics(catalog))),
        Command::Export(name) => {
            let path = export::csv_path(name);
            match export::export_csv(catalog, &path) {
                Ok(rows) => eprintln!("  Exported {rows} rows to {}", path.display()),
                Err(e) => eprintln!("  Export failed: {e:#}"),
            }
        }
        Command::Unknown(word) => eprintln!("  Unknown command '/{word}'. Try /help."),
    }
}

fn help_text() -> String {
    let mut text = String::from("\n");
    for (word, usage, about) in COMMANDS {
        text.push_str(&format!("  {:<28} {about}\n", format!("{word} {usage}")));
    }
    text.push('\n');
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_and_without_slash() {
        assert_eq!(Command::parse("/units"), Command::Units);
        assert_eq!(Command::parse("  units  "), Command::Units);
        assert_eq!(Command::parse("/exit"), Command::Exit);
        assert_eq!(Command::parse("quit"), Command::Exit);
        assert_eq!(Command::parse("/"), Command::Empty);
        assert_eq!(Command::parse(""), Command::Empty);
    }

    #[test]
    fn test_parse_keeps_multi_word_arguments() {
        assert_eq!(
            Command::parse("/courses Instituto de Física "),
            Command::Courses("Instituto de Física")
        );
        assert_eq!(Command::parse("/course  Bacharelado"), Command::Course("Bacharelado"));
        assert_eq!(Command::parse("/search-discipline MAC"), Command::SearchDiscipline("MAC"));
        assert_eq!(Command::parse("/export"), Command::Export(""));
        assert_eq!(Command::parse("/frobnicate x"), Command::Unknown("frobnicate"));
    }

    #[test]
    fn test_every_command_word_parses() {
        for (word, _, _) in COMMANDS {
            assert!(
                !matches!(Command::parse(word), Command::Unknown(_) | Command::Empty),
                "{word}"
            );
        }
    }

    #[test]
    fn test_command_completion_and_unit_names() {
        let pairs = CatalogHelper::command_pairs("/search");
        let words: Vec<&str> = pairs.iter().map(|p| p.replacement.as_str()).collect();
        assert_eq!(words, vec!["/search-course ", "/search-discipline "]);

        let helper = CatalogHelper {
            units: vec!["Instituto de Física - IF".into(), "Instituto de Química - IQ".into()],
        };
        assert_eq!(helper.unit_names("instituto de f"), vec!["Instituto de Física - IF"]);
        assert_eq!(helper.unit_names("").len(), 2);
    }

    #[test]
    fn test_help_lists_every_command() {
        let help = help_text();
        for (word, _, _) in COMMANDS {
            assert!(help.contains(word), "{word}");
        }
    }
}
