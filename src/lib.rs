//! Headless editing core for Fulfulde documents.
//!
//! [`editor::ContentModel`] keeps the text, caret and everything derived from
//! them (line numbers, unknown words, completions). [`app::EditorSession`]
//! wires it to the document, dictionary and settings collaborators.

pub mod app;
pub mod document;
pub mod editor;
pub mod error;
pub mod lexicon;
pub mod settings;
pub mod storage;
pub mod ui;

pub use error::{Error, Result};
