//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Download papers from arXiv, CVF open access and ECVA.
///
/// Each TARGET is an arXiv identifier or a paper URL. PDFs are saved under
/// normalized names next to a JSON index and one Markdown note per paper.
#[derive(Parser, Debug)]
#[command(name = "paper")]
#[command(author, version, about)]
pub struct Args {
    /// arXiv ids or paper URLs, processed in order
    #[arg(required = true, value_name = "TARGET")]
    pub targets: Vec<String>,

    /// Directory receiving PDFs, notes and the index
    /// (default: $ARXIV_DOWNLOAD_FOLDER, config file, ~/Downloads/ArXiv_Papers)
    #[arg(short = 'd', long, value_name = "DIR")]
    pub download_dir: Option<PathBuf>,

    /// Save the PDF and index entry only; skip the note file
    #[arg(short = 'p', long)]
    pub pdf_only: bool,

    /// Download connections per file (1-16)
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u8).range(1..=16))]
    pub parallel: Option<u8>,

    /// Write title, authors and abstract into the PDF metadata
    #[arg(long)]
    pub embed_metadata: bool,

    /// Config file (default: $XDG_CONFIG_HOME/paperdl/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Default tracing level when `RUST_LOG` is unset.
    pub fn default_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }
}
