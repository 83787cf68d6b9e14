//! Command-line argument definition.

use std::path::PathBuf;

use clap::Parser;

/// nyaq - search a local torrent metadata catalog
#[derive(Parser, Debug)]
#[command(name = "nyaq")]
#[command(version)]
#[command(about = "Search a local torrent metadata catalog", long_about = None)]
pub struct Args {
    /// Keywords to search for; without keywords an interactive prompt starts
    pub keywords: Vec<String>,

    /// Page of results to print (with keywords)
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,

    /// Print results as JSON lines
    #[arg(long)]
    pub json: bool,

    /// Extra configuration file, layered after ~/.nyaqrc and ./.nyaqrc
    #[arg(short, long = "config", value_name = "PATH")]
    pub config: Vec<PathBuf>,

    /// Override an option for this run, e.g. --set limit=50
    #[arg(short, long = "set", value_name = "NAME=VALUE", value_parser = parse_edit)]
    pub set: Vec<(String, String)>,

    /// Set the logging level (trace, debug, info, warn, error); RUST_LOG wins
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Args {
    /// Positional keywords joined by spaces, if any were given.
    pub fn keywords(&self) -> Option<String> {
        if self.keywords.is_empty() {
            None
        } else {
            Some(self.keywords.join(" "))
        }
    }
}

/// Parse `name=value`. The name is trimmed; the value is kept verbatim.
pub fn parse_edit(text: &str) -> Result<(String, String), String> {
    let (name, value) = text
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got {:?}", text))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing option name in {:?}", text));
    }
    Ok((name.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_edit() {
        assert_eq!(
            parse_edit("limit=50"),
            Ok(("limit".to_string(), "50".to_string()))
        );
        assert_eq!(
            parse_edit(" size =1G:2G"),
            Ok(("size".to_string(), "1G:2G".to_string()))
        );
        assert_eq!(parse_edit("order="), Ok(("order".to_string(), String::new())));
        assert!(parse_edit("limit").is_err());
        assert!(parse_edit("=5").is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from([
            "nyaq", "--set", "limit=10", "-c", "/tmp/extra.toml", "--page", "2", "frieren", "1080p",
        ]);
        assert_eq!(args.keywords().as_deref(), Some("frieren 1080p"));
        assert_eq!(args.page, 2);
        assert_eq!(args.set, vec![("limit".to_string(), "10".to_string())]);
        assert_eq!(args.config, vec![PathBuf::from("/tmp/extra.toml")]);
        assert!(!args.json);
    }

    #[test]
    fn test_args_reject_page_zero() {
        assert!(Args::try_parse_from(["nyaq", "--page", "0", "x"]).is_err());
    }

    #[test]
    fn test_no_keywords_means_interactive() {
        let args = Args::parse_from(["nyaq"]);
        assert!(args.keywords().is_none());
        assert_eq!(args.log_level, "warn");
    }
}
