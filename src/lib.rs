//! phrasedesk - A keyword phrase collection engine with undoable list
//! transforms, scoped stop words and folders, grouping, and sessions

pub mod commands;
pub mod config;
pub mod export;
pub mod filter;
pub mod folders;
pub mod grouping;
pub mod history;
pub mod ingest;
pub mod logging;
pub mod models;
pub mod processor;
pub mod session;
pub mod workspace;
