mod cli;

use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use tabital::{
    Result,
    app::describe,
    document::{Document, DocumentFormat, detect_format, txt::read_text},
    lexicon::{
        LexicalAssistant,
        dictionary::{DictionaryStore, JsonDictionaryStore},
    },
    settings::{load_settings, schema::Settings},
};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, USAGE};

fn main() -> ExitCode {
    // RUST_LOG=tabital=debug for more detail; stdout is reserved for results.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::parse() {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::from(2);
        }
    };

    if cli.command == Command::Help {
        println!("{}", USAGE);
        return ExitCode::SUCCESS;
    }

    let store = match &cli.dictionary {
        Some(path) => JsonDictionaryStore::open(path),
        None => JsonDictionaryStore::open_default(),
    };
    let store = match store {
        Ok(store) => store,
        Err(err) => {
            tracing::error!(%err, "could not load dictionary");
            return ExitCode::FAILURE;
        }
    };

    let mut settings = load_settings();
    if let Some(max) = cli.max_suggestions {
        settings.lexicon.max_suggestions = max;
    }

    match cli.command {
        Command::Help => ExitCode::SUCCESS,
        Command::Check { files } => check(&files, &store, &settings),
        Command::Suggest { prefix } => suggest(&prefix, &store, &settings),
    }
}

fn check(files: &[PathBuf], store: &JsonDictionaryStore, settings: &Settings) -> ExitCode {
    let mut failed = false;
    for path in files {
        let content = match read_content(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::error!(path = %path.display(), %err, "could not read file");
                failed = true;
                continue;
            }
        };

        let (lines, words, unknown) = describe(&content, store.dictionary(), settings);
        println!("{}: {} lines, {} words", path.display(), lines, words);
        if !unknown.is_empty() {
            println!("  unknown: {}", unknown.join(", "));
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn read_content(path: &Path) -> Result<String> {
    let decoded = read_text(path)?;
    match detect_format(path) {
        DocumentFormat::Tabital => Ok(Document::from_json(&decoded.text, None)?.content),
        _ => Ok(decoded.text),
    }
}

fn suggest(prefix: &str, store: &JsonDictionaryStore, settings: &Settings) -> ExitCode {
    let assistant = LexicalAssistant::from(&settings.lexicon);
    let dictionary = match store.all_words() {
        Ok(dictionary) => dictionary,
        Err(err) => {
            tracing::error!(%err, "could not read dictionary");
            return ExitCode::FAILURE;
        }
    };

    for suggestion in assistant.suggest(prefix, &dictionary) {
        match suggestion.translation {
            Some(translation) => println!("{}\t{}", suggestion.word, translation),
            None => println!("{}", suggestion.word),
        }
    }
    ExitCode::SUCCESS
}
