//! DOM Lens - command line entry point
//!
//! Parses an HTML file (or stdin) and prints its simplified tree.
//!
//! ```text
//! lens [--variant ref-id|path] [--url URL] [--compact] [FILE|-]
//! ```
//!
//! `LENS_VARIANT` picks the variant when `--variant` is absent.
//! Logs go to stderr, filtered by `RUST_LOG` (default `info`).

use std::io::Read;

use anyhow::{Context, Result};
use clap::Parser;
use lens_html::HtmlParser;
use lens_snapshot::{SnapshotConfig, Snapshotter, Variant};

#[derive(Debug, Parser)]
#[command(name = "lens")]
#[command(about = "Print a simplified snapshot of an HTML document", long_about = None)]
#[command(version)]
struct Args {
    /// HTML file to read; stdin when absent or `-`
    input: Option<String>,

    /// Output variant: `ref-id` or `path`
    #[arg(short, long, env = "LENS_VARIANT", default_value_t = Variant::default())]
    variant: Variant,

    /// Document URL, used for origins and relative frame sources
    #[arg(long, default_value = "about:blank")]
    url: String,

    /// Print JSON on one line
    #[arg(long)]
    compact: bool,
}

impl Args {
    fn config(&self) -> SnapshotConfig {
        SnapshotConfig {
            variant: self.variant,
            pretty: !self.compact,
            ..SnapshotConfig::default()
        }
    }

    fn input_path(&self) -> Option<&str> {
        self.input.as_deref().filter(|&path| path != "-")
    }
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path))
        }
        None => {
            let mut html = String::new();
            std::io::stdin()
                .read_to_string(&mut html)
                .context("failed to read stdin")?;
            Ok(html)
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    tracing::debug!(?args, "starting");

    let html = read_input(args.input_path())?;
    let mut document = HtmlParser::new()
        .parse_with_url(&html, &args.url)
        .context("failed to parse document")?;
    tracing::info!(nodes = document.tree().len(), variant = %args.variant, "parsed document");

    let output = Snapshotter::new(args.config()).snapshot(&mut document)?;
    println!("{}", output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["lens", "--variant", "ref-id"]).unwrap();
        assert_eq!(args.input_path(), None);
        assert_eq!(args.url, "about:blank");
        let config = args.config();
        assert_eq!(config.variant, Variant::RefId);
        assert!(config.pretty);
        assert_eq!(config.start_marker, 1);
    }

    #[test]
    fn test_flags() {
        let args = Args::try_parse_from(["lens", "-v", "xpath", "--compact", "page.html"]).unwrap();
        assert_eq!(args.variant, Variant::Path);
        assert_eq!(args.input_path(), Some("page.html"));
        assert!(!args.config().pretty);

        let args = Args::try_parse_from(["lens", "--variant", "path", "-"]).unwrap();
        assert_eq!(args.input_path(), None);
    }

    #[test]
    fn test_errors() {
        assert!(Args::try_parse_from(["lens", "--variant"]).is_err());
        assert!(Args::try_parse_from(["lens", "--bogus"]).is_err());
        assert!(Args::try_parse_from(["lens", "--variant", "tree"]).is_err());
    }
}
