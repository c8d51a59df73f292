//! Command-line argument parsing for the `tabital` binary.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Line count, word count and unknown words for each file
    Check { files: Vec<PathBuf> },
    /// Dictionary completions for a prefix
    Suggest { prefix: String },
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cli {
    pub command: Command,
    /// Dictionary file instead of the per-user one
    pub dictionary: Option<PathBuf>,
    /// Overrides `lexicon.max_suggestions` from the settings file
    pub max_suggestions: Option<usize>,
}

pub const USAGE: &str = "\
tabital - Fulfulde document checker

Usage:
  tabital check [--dictionary PATH] FILE...
  tabital suggest [--dictionary PATH] [--max-suggestions N] PREFIX

Options:
  -d, --dictionary PATH      Use this dictionary file
  -n, --max-suggestions N    Cap the number of completions (at most 8)
  -h, --help                 Show this help message";

impl Cli {
    pub fn parse() -> Result<Self, String> {
        Self::parse_from(std::env::args().skip(1))
    }

    pub fn parse_from<I>(args: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let mut dictionary = None;
        let mut max_suggestions = None;
        let mut positional = Vec::new();

        let Some(subcommand) = args.next() else {
            return Err("missing command. Use --help for usage.".to_string());
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-d" | "--dictionary" => match args.next() {
                    Some(path) => dictionary = Some(PathBuf::from(path)),
                    None => return Err("--dictionary requires a value".to_string()),
                },
                "-n" | "--max-suggestions" => {
                    let value = args
                        .next()
                        .ok_or_else(|| "--max-suggestions requires a value".to_string())?;
                    max_suggestions = Some(
                        value
                            .parse()
                            .map_err(|_| format!("invalid --max-suggestions value: {}", value))?,
                    );
                }
                "-h" | "--help" => {
                    return Ok(Self {
                        command: Command::Help,
                        dictionary,
                        max_suggestions,
                    });
                }
                arg if arg.starts_with('-') && arg.len() > 1 => {
                    return Err(format!("Unknown flag: {}. Use --help for usage.", arg));
                }
                _ => positional.push(arg),
            }
        }

        let command = match subcommand.as_str() {
            "check" if positional.is_empty() => {
                return Err("check needs at least one file".to_string());
            }
            "check" => Command::Check {
                files: positional.into_iter().map(PathBuf::from).collect(),
            },
            "suggest" => match positional.as_slice() {
                [prefix] => Command::Suggest {
                    prefix: prefix.clone(),
                },
                _ => return Err("suggest takes exactly one prefix".to_string()),
            },
            "-h" | "--help" | "help" => Command::Help,
            other => return Err(format!("Unknown command: {}. Use --help for usage.", other)),
        };

        Ok(Self {
            command,
            dictionary,
            max_suggestions,
        })
    }
}
