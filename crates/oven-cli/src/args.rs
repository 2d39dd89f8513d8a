//! Command-line argument definitions for the Oven CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the input files, the target module and
//! artifacts, the output directory, configuration file, and logging
//! verbosity.

use clap::Parser;

use oven::artifact::OutputKind;

/// Command-line arguments for the Oven skeleton generator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// WebIDL input files, concatenated in order
    #[arg(required = true, help = "Paths to the input files")]
    pub inputs: Vec<String>,

    /// Artifacts to prepare (js, cpp, both)
    #[arg(short, long, default_value = "both")]
    pub target: OutputKind,

    /// Directory the emission context is written to; stdout if omitted
    #[arg(short = 'd', long)]
    pub out_dir: Option<String>,

    /// Module to generate; defaults to the first input's base name
    #[arg(short, long)]
    pub module: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["oven", "badge.widl"]).expect("Failed to parse args");
        assert_eq!(args.inputs, vec!["badge.widl"]);
        assert_eq!(args.target, OutputKind::Both);
        assert_eq!(args.out_dir, None);
        assert_eq!(args.module, None);
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn test_all_flags() {
        let args = Args::try_parse_from([
            "oven", "-t", "js", "-d", "out", "-m", "badge", "a.widl", "b.widl",
        ])
        .expect("Failed to parse args");
        assert_eq!(args.inputs, vec!["a.widl", "b.widl"]);
        assert_eq!(args.target, OutputKind::Js);
        assert_eq!(args.out_dir.as_deref(), Some("out"));
        assert_eq!(args.module.as_deref(), Some("badge"));
    }

    #[test]
    fn test_rejects_unknown_target() {
        assert!(Args::try_parse_from(["oven", "-t", "python", "a.widl"]).is_err());
    }

    #[test]
    fn test_requires_input() {
        assert!(Args::try_parse_from(["oven"]).is_err());
    }
}
