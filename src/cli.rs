use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Instrument record to open on start-up
    #[arg(value_name = "RECORD")]
    pub record: Option<PathBuf>,

    /// Path to config TOML
    #[arg(long, default_value = "hemaview.toml")]
    pub config: PathBuf,

    /// Write the report (.html, .json, .csv, .parquet) and exit without GUI
    #[arg(long, value_name = "OUT")]
    pub export: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["hemaview"]);
        assert!(args.record.is_none());
        assert_eq!(args.config, PathBuf::from("hemaview.toml"));
        assert!(args.export.is_none());
    }

    #[test]
    fn test_headless_export() {
        let args = Args::parse_from(["hemaview", "run.txt", "--export", "out.json"]);
        assert_eq!(args.record, Some(PathBuf::from("run.txt")));
        assert_eq!(args.export, Some(PathBuf::from("out.json")));
    }
}
