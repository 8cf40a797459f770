//! phrasedesk - keyword phrase collection workbench
//!
//! Load phrase lists, clean them up with undoable transforms, filter by
//! stop words, sort into folders and groups, and export the result.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use phrasedesk::commands::{self, ExportTarget, FolderOperation, Session, ShowOptions, StopOperation};
use phrasedesk::logging;
use phrasedesk::models::Transfer;

#[derive(Parser)]
#[command(name = "phrasedesk")]
#[command(author, version, about = "Keyword phrase collection workbench")]
struct Cli {
    /// Session file (defaults to ~/.phrasedesk/sessions/default.json)
    #[arg(long, global = true)]
    session: Option<PathBuf>,

    /// Debug-level logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize phrasedesk (first-time setup)
    Init,

    /// Load .txt/.tsv/.csv/.xls/.xlsx phrase files
    Load {
        /// Files to read
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Name for the new list (defaults to the first file's name)
        #[arg(short, long)]
        name: Option<String>,

        /// Append to this existing list instead of opening a new one
        #[arg(long, conflicts_with = "name")]
        into: Option<String>,
    },

    /// List open phrase lists
    Lists,

    /// Show the phrases of a list after stop words and search
    Show {
        /// List name (defaults to the active list)
        #[arg(short, long)]
        list: Option<String>,

        /// Search term
        #[arg(short, long)]
        search: Option<String>,

        /// Match the search term as whole words
        #[arg(long)]
        whole_word: bool,

        /// Hide rows that don't match the search
        #[arg(long)]
        only_matches: bool,

        /// Exclude on any substring hit instead of whole tokens
        #[arg(long)]
        substring_stop_words: bool,

        /// Print bare phrase texts, one per line
        #[arg(long)]
        plain: bool,
    },

    /// Apply a transform: dedup, sort-az, sort-za, sort-freq-desc,
    /// sort-freq-asc, upper, lower, strip-special, drop-long, translit,
    /// translit-back
    Transform {
        operation: String,

        #[arg(short, long)]
        list: Option<String>,

        /// Word limit for drop-long
        #[arg(long)]
        max_words: Option<usize>,
    },

    /// Undo the last change to a list
    Undo {
        #[arg(short, long)]
        list: Option<String>,
    },

    /// Redo an undone change
    Redo {
        #[arg(short, long)]
        list: Option<String>,
    },

    /// Add a phrase with frequency 0
    Add {
        text: String,

        #[arg(short, long)]
        list: Option<String>,
    },

    /// Delete phrases by exact text
    Delete {
        #[arg(required = true)]
        texts: Vec<String>,

        #[arg(short, long)]
        list: Option<String>,
    },

    /// Stop word operations
    Stop {
        #[command(subcommand)]
        operation: StopOperationCli,

        /// Use the global stop words shared by every list
        #[arg(long, global = true)]
        global: bool,

        #[arg(short, long, global = true)]
        list: Option<String>,
    },

    /// Folder operations
    Folder {
        #[command(subcommand)]
        operation: FolderOperationCli,

        /// Use the global folders shared by every list
        #[arg(long, global = true)]
        global: bool,

        #[arg(short, long, global = true)]
        list: Option<String>,
    },

    /// Show phrase groups
    Groups {
        /// Group across every list using global stop words only
        #[arg(long)]
        all: bool,

        #[arg(short, long)]
        list: Option<String>,
    },

    /// Export: tsv, list, all, groups, or folders
    Export {
        target: String,

        /// Output file (tsv, or .xlsx for sheets) or a directory of CSV sheets
        output: PathBuf,

        /// Global groups/folders instead of one list's
        #[arg(long)]
        global: bool,

        #[arg(short, long)]
        list: Option<String>,
    },

    /// Rename a list
    Rename { old: String, new: String },

    /// Close a list, discarding its folders and history
    Close { name: String },

    /// Make the list at this index active
    Activate { index: usize },
}

#[derive(Subcommand)]
enum StopOperationCli {
    /// Add stop words
    Add {
        #[arg(required = true)]
        words: Vec<String>,
    },

    /// Remove stop words
    Remove {
        #[arg(required = true)]
        words: Vec<String>,
    },

    /// Remove every stop word
    Clear,

    /// Print stop words, one per line
    List,
}

#[derive(Subcommand)]
enum FolderOperationCli {
    /// Create a folder
    Create { name: String },

    /// Delete a folder and its phrases
    Delete { name: String },

    /// Empty a folder
    Clear { name: String },

    /// Copy (or move) list phrases into a folder
    Send {
        folder: String,

        #[arg(required = true)]
        texts: Vec<String>,

        /// Remove the phrases from the list
        #[arg(long = "move")]
        move_phrases: bool,
    },

    /// Copy (or move) folder phrases back into the list
    Back {
        folder: String,

        #[arg(required = true)]
        texts: Vec<String>,

        /// Remove the phrases from the folder
        #[arg(long = "move")]
        move_phrases: bool,
    },

    /// Remove phrases from a folder
    Remove {
        folder: String,

        #[arg(required = true)]
        texts: Vec<String>,
    },

    /// List folders, or the phrases of one folder
    List { folder: Option<String> },
}

fn transfer(move_phrases: bool) -> Transfer {
    if move_phrases {
        Transfer::Move
    } else {
        Transfer::Copy
    }
}

// Conversion functions from CLI enums to library enums
impl From<StopOperationCli> for StopOperation {
    fn from(op: StopOperationCli) -> Self {
        match op {
            StopOperationCli::Add { words } => StopOperation::Add { words },
            StopOperationCli::Remove { words } => StopOperation::Remove { words },
            StopOperationCli::Clear => StopOperation::Clear,
            StopOperationCli::List => StopOperation::List,
        }
    }
}

impl From<FolderOperationCli> for FolderOperation {
    fn from(op: FolderOperationCli) -> Self {
        match op {
            FolderOperationCli::Create { name } => FolderOperation::Create { name },
            FolderOperationCli::Delete { name } => FolderOperation::Delete { name },
            FolderOperationCli::Clear { name } => FolderOperation::Clear { name },
            FolderOperationCli::Send { folder, texts, move_phrases } => FolderOperation::Send {
                folder,
                texts,
                transfer: transfer(move_phrases),
            },
            FolderOperationCli::Back { folder, texts, move_phrases } => FolderOperation::Back {
                folder,
                texts,
                transfer: transfer(move_phrases),
            },
            FolderOperationCli::Remove { folder, texts } => FolderOperation::Remove { folder, texts },
            FolderOperationCli::List { folder } => FolderOperation::List { folder },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose)?;

    if let Commands::Init = cli.command {
        return commands::init();
    }

    let mut session = Session::open(cli.session.as_deref())?;

    match cli.command {
        // handled above
        Commands::Init => {}
        Commands::Load { files, name, into } => {
            commands::load(&mut session, files, name.as_deref(), into.as_deref()).await?;
        }
        Commands::Lists => {
            commands::lists(&session)?;
        }
        Commands::Show {
            list,
            search,
            whole_word,
            only_matches,
            substring_stop_words,
            plain,
        } => {
            let options = ShowOptions {
                list,
                search,
                whole_word,
                only_matches,
                substring_stop_words,
                plain,
            };
            commands::show(&mut session, &options)?;
        }
        Commands::Transform {
            operation,
            list,
            max_words,
        } => {
            commands::transform(&mut session, &operation, list.as_deref(), max_words)?;
        }
        Commands::Undo { list } => {
            commands::undo(&mut session, list.as_deref())?;
        }
        Commands::Redo { list } => {
            commands::redo(&mut session, list.as_deref())?;
        }
        Commands::Add { text, list } => {
            commands::add(&mut session, &text, list.as_deref())?;
        }
        Commands::Delete { texts, list } => {
            commands::delete(&mut session, &texts, list.as_deref())?;
        }
        Commands::Stop {
            operation,
            global,
            list,
        } => {
            commands::stop(&mut session, operation.into(), global, list.as_deref())?;
        }
        Commands::Folder {
            operation,
            global,
            list,
        } => {
            commands::folder(&mut session, operation.into(), global, list.as_deref())?;
        }
        Commands::Groups { all, list } => {
            commands::groups(&session, all, list.as_deref())?;
        }
        Commands::Export {
            target,
            output,
            global,
            list,
        } => {
            let target: ExportTarget = target.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            commands::export(&session, target, &output, global, list.as_deref())?;
        }
        Commands::Rename { old, new } => {
            commands::rename(&mut session, &old, &new)?;
        }
        Commands::Close { name } => {
            commands::close(&mut session, &name)?;
        }
        Commands::Activate { index } => {
            commands::activate(&mut session, index)?;
        }
    }

    Ok(())
}
