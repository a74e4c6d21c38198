use clap::{Args, Parser, Subcommand};
use scanshelf_core::config::DEFAULT_PREFERENCES_NAME;
use std::path::PathBuf;

/// Scanshelf: import, name and browse scanned document folders.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding the folder collection and PDF attachments.
    #[arg(long, global = true, env = "SCANSHELF_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Name of the preference file the folder collection is stored in.
    #[arg(long, global = true, env = "SCANSHELF_PREFERENCES", default_value = DEFAULT_PREFERENCES_NAME)]
    pub preferences: String,

    /// Increase verbosity (use multiple times for more).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store a finished scan session as a new folder.
    Import(ImportArgs),
    /// List all folders.
    List {},
    /// Show the pages and attachment of one folder.
    Show(ShowArgs),
    /// Rename a folder.
    Rename(RenameArgs),
    /// Rename a page within a folder.
    RenamePage(RenamePageArgs),
    /// Print the location of a folder's PDF.
    Pdf(PdfArgs),
}

// --- Argument Structs for each Subcommand ---

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Image URIs of the scanned pages, in scan order.
    #[arg(required = true)]
    pub pages: Vec<String>,

    /// PDF produced for the scan session.
    #[arg(long)]
    pub pdf: Option<PathBuf>,

    /// Folder name. Prompted for if omitted.
    #[arg(long, short)]
    pub name: Option<String>,

    /// Keep the generated folder name without prompting.
    #[arg(long, short, conflicts_with = "name")]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// ID of the folder.
    pub folder_id: String,
}

#[derive(Args, Debug)]
pub struct RenameArgs {
    /// ID of the folder.
    pub folder_id: String,
    /// New folder name.
    pub name: String,
}

#[derive(Args, Debug)]
pub struct RenamePageArgs {
    /// ID of the folder.
    pub folder_id: String,
    /// Page number, starting at 1.
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,
    /// New page name.
    pub name: String,
}

#[derive(Args, Debug)]
pub struct PdfArgs {
    /// ID of the folder.
    pub folder_id: String,

    /// Print a `file://` URI instead of a path.
    #[arg(long)]
    pub uri: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_import() {
        let cli = Cli::try_parse_from([
            "scanshelf", "import", "content://1", "content://2", "--pdf", "/tmp/s.pdf", "-n", "Taxes",
        ])
        .unwrap();
        match cli.command {
            Commands::Import(args) => {
                assert_eq!(args.pages, vec!["content://1", "content://2"]);
                assert_eq!(args.pdf, Some(PathBuf::from("/tmp/s.pdf")));
                assert_eq!(args.name.as_deref(), Some("Taxes"));
                assert!(!args.yes);
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert_eq!(cli.preferences, DEFAULT_PREFERENCES_NAME);
    }

    #[test]
    fn test_import_requires_pages() {
        assert!(Cli::try_parse_from(["scanshelf", "import"]).is_err());
    }

    #[test]
    fn test_import_name_conflicts_with_yes() {
        assert!(Cli::try_parse_from(["scanshelf", "import", "u", "--name", "a", "--yes"]).is_err());
    }

    #[test]
    fn test_rename_page_rejects_zero() {
        assert!(Cli::try_parse_from(["scanshelf", "rename-page", "id", "0", "x"]).is_err());
        let cli = Cli::try_parse_from(["scanshelf", "rename-page", "id", "2", "Back"]).unwrap();
        assert!(matches!(cli.command, Commands::RenamePage(RenamePageArgs { page: 2, .. })));
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["scanshelf", "list", "-vv", "--data-dir", "/tmp/x"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
    }
}
