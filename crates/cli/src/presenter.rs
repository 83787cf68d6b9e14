//! Line-oriented front end: reads commands, runs searches, prints pages.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use tracing::{info, warn};

use nyaq_core::{
    validate_config, ConfigSource, SearchCount, SearchError, SearchSession, TorrentRecord,
    CONFIG_NAME, OPTION_TABLE,
};

use crate::args::parse_edit;
use crate::view;

const HELP: &str = "\
Commands:
  <keywords>           search (same as /search)
  /search [keywords]   count matches and show the first page
  /page <n>            show page n of the last search
  /show <n>            details of result n on the current page
  /options             list options and their values
  /set <name>=<value>  change an option for this session
  /reload              re-read the configuration files
  /save [path]         write the configuration (default .nyaqrc)
  /help                this text
  /quit                exit";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Search(Option<String>),
    Page(u32),
    Show(usize),
    Options,
    Set(String, String),
    Reload,
    Save(Option<PathBuf>),
    Help,
    Quit,
    Nothing,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Command::Nothing);
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Command::Search(Some(line.to_string())));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    let number = |what: &str| {
        arg.parse::<u32>()
            .map_err(|_| format!("/{} needs a {} number", name, what))
    };

    match name {
        "search" | "s" => Ok(Command::Search((!arg.is_empty()).then(|| arg.to_string()))),
        "page" | "p" => number("page").map(Command::Page),
        "show" => number("result").map(|n| Command::Show(n as usize)),
        "options" | "o" => Ok(Command::Options),
        "set" => parse_edit(arg).map(|(name, value)| Command::Set(name, value)),
        "reload" => Ok(Command::Reload),
        "save" => Ok(Command::Save((!arg.is_empty()).then(|| PathBuf::from(arg)))),
        "help" | "h" | "?" => Ok(Command::Help),
        "quit" | "q" | "exit" => Ok(Command::Quit),
        _ => Err(format!("Unknown command /{} (try /help)", name)),
    }
}

/// The last search and the page being viewed. Only exists once a page has
/// loaded, so `page` is at least 1.
struct CurrentSearch {
    keywords: Option<String>,
    count: SearchCount,
    page: u32,
    rows: Vec<TorrentRecord>,
}

impl CurrentSearch {
    /// Listing number of the first row on the current page.
    fn first_index(&self) -> usize {
        self.page.saturating_sub(1) as usize * self.count.page_size as usize + 1
    }
}

/// Interactive presenter over a search session.
pub struct Presenter {
    session: SearchSession,
    source: ConfigSource,
    /// Command-line edits, re-applied on every reload.
    overrides: Vec<(String, String)>,
    current: Option<CurrentSearch>,
}

impl Presenter {
    pub fn new(session: SearchSession, source: ConfigSource) -> Self {
        Self {
            session,
            source,
            overrides: Vec::new(),
            current: None,
        }
    }

    pub fn with_overrides(mut self, overrides: Vec<(String, String)>) -> Self {
        self.overrides = overrides;
        self
    }

    /// Read commands until end of input or /quit.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> io::Result<()> {
        writeln!(out, "nyaq {} - type /help for commands", env!("CARGO_PKG_VERSION"))?;
        prompt(out)?;
        for line in input.lines() {
            match parse_command(&line?) {
                Ok(Command::Quit) => break,
                Ok(command) => self.execute(command, out)?,
                Err(message) => writeln!(out, "{}", message)?,
            }
            prompt(out)?;
        }
        writeln!(out)?;
        Ok(())
    }

    fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> io::Result<()> {
        match command {
            Command::Search(keywords) => self.search(keywords, out),
            Command::Page(page) => self.turn_to(page, out),
            Command::Show(index) => self.show(index, out),
            Command::Options => self.list_options(out),
            Command::Set(name, value) => {
                if nyaq_core::config::find_option(&name).is_none() {
                    writeln!(out, "Note: base.{} is not a recognised option", name)?;
                }
                writeln!(out, "base.{} = {}", name, value)?;
                self.session.apply_edits([(name, value)]);
                self.current = None;
                Ok(())
            }
            Command::Reload => self.reload(out),
            Command::Save(path) => {
                let path = path.unwrap_or_else(|| PathBuf::from(CONFIG_NAME));
                match self.session.save(&path) {
                    Ok(()) => writeln!(out, "Configuration saved to {}", path.display()),
                    Err(e) => writeln!(out, "Save failed: {}", e),
                }
            }
            Command::Help => writeln!(out, "{}", HELP),
            Command::Quit | Command::Nothing => Ok(()),
        }
    }

    fn search<W: Write>(&mut self, keywords: Option<String>, out: &mut W) -> io::Result<()> {
        self.current = None;
        let count = match self.session.count(keywords.as_deref()) {
            Ok(count) => count,
            Err(e) => return report(&e, out),
        };
        if count.total == 0 {
            return writeln!(out, "No results.");
        }
        let rows = match self.session.page(keywords.as_deref(), 1) {
            Ok(rows) => rows,
            Err(e) => return report(&e, out),
        };
        let current = self.current.insert(CurrentSearch {
            keywords,
            count,
            page: 1,
            rows,
        });
        print_page(current, out)
    }

    fn turn_to<W: Write>(&mut self, page: u32, out: &mut W) -> io::Result<()> {
        let Some(current) = self.current.as_mut() else {
            return writeln!(out, "Search for something first.");
        };
        let pages = current.count.pages();
        if u64::from(page) > pages {
            return writeln!(out, "Page {} is out of range (1-{}).", page, pages);
        }

        match self.session.page(current.keywords.as_deref(), page) {
            Ok(rows) => {
                current.page = page;
                current.rows = rows;
            }
            Err(e) => return report(&e, out),
        }
        print_page(current, out)
    }

    fn show<W: Write>(&self, index: usize, out: &mut W) -> io::Result<()> {
        let Some(current) = &self.current else {
            return writeln!(out, "Search for something first.");
        };
        let first = current.first_index();
        match index
            .checked_sub(first)
            .and_then(|offset| current.rows.get(offset))
        {
            Some(record) => writeln!(out, "{}", view::detail(record, self.session.categories())),
            None => writeln!(
                out,
                "Result {} is not on this page ({}-{}).",
                index,
                first,
                first + current.rows.len().saturating_sub(1)
            ),
        }
    }

    fn list_options<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let config = self.session.config();
        for spec in OPTION_TABLE {
            let value = config.get_raw(spec.name).unwrap_or("");
            writeln!(out, "{:<9}= {:<12} {}", spec.name, value, spec.description)?;
        }
        for (name, value) in config.options() {
            if nyaq_core::config::find_option(name).is_none() {
                writeln!(out, "{:<9}= {:<12} (not recognised)", name, value)?;
            }
        }
        Ok(())
    }

    fn reload<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let mut config = match self.source.load() {
            Ok(config) => config,
            Err(e) => return writeln!(out, "Reload failed: {}", e),
        };
        for (name, value) in &self.overrides {
            config.set(name.as_str(), value.as_str());
        }
        for diagnostic in validate_config(&config) {
            warn!("{}", diagnostic);
        }

        if config.database_path() == self.session.config().database_path() {
            self.session.reload(config);
        } else {
            info!(path = %config.database_path().display(), "Catalog path changed, reopening");
            match crate::open_session(config) {
                Ok(session) => self.session = session,
                Err(e) => return writeln!(out, "Reload failed: {:#}", e),
            }
        }
        self.current = None;
        writeln!(out, "Configuration reloaded.")
    }
}

fn print_page<W: Write>(current: &CurrentSearch, out: &mut W) -> io::Result<()> {
    let first = current.first_index();
    for (i, record) in current.rows.iter().enumerate() {
        writeln!(out, "{}", view::summary_line(first + i, record))?;
    }
    writeln!(out, "{}", view::page_status(current.page, &current.count))
}

fn prompt<W: Write>(out: &mut W) -> io::Result<()> {
    write!(out, "> ")?;
    out.flush()
}

fn report<W: Write>(error: &SearchError, out: &mut W) -> io::Result<()> {
    writeln!(out, "Search failed: {}", error)?;
    if let Some(hint) = error.hint() {
        writeln!(out, "{}", hint)?;
    }
    Ok(())
}

/// One-shot mode: print one page of results for `keywords`.
pub fn print_search<W: Write>(
    session: &SearchSession,
    keywords: &str,
    page: u32,
    json: bool,
    out: &mut W,
) -> anyhow::Result<()> {
    let count = session.count(Some(keywords)).map_err(with_hint)?;
    if count.total == 0 {
        if !json {
            writeln!(out, "No results.")?;
        }
        return Ok(());
    }

    let rows = session.page(Some(keywords), page).map_err(with_hint)?;
    let first = (page as usize - 1) * count.page_size as usize + 1;
    for (i, record) in rows.iter().enumerate() {
        if json {
            writeln!(out, "{}", view::json_line(record, session.categories())?)?;
        } else {
            writeln!(out, "{}", view::summary_line(first + i, record))?;
        }
    }
    if !json {
        writeln!(out, "{}", view::page_status(page, &count))?;
    }
    Ok(())
}

fn with_hint(error: SearchError) -> anyhow::Error {
    let hint = error.hint();
    let error = anyhow::Error::new(error);
    match hint {
        Some(hint) => error.context(hint),
        None => error,
    }
}
