//! Oven CLI library
//!
//! This module contains the core CLI logic for the Oven skeleton generator.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::{debug, info};

use oven::{EmissionContext, OvenError, SkeletonBuilder};

/// Run the Oven CLI application
///
/// The inputs are concatenated, parsed and resolved for the selected module,
/// and the resulting emission context is written as JSON to
/// `<out_dir>/<module>.context.json`, or to stdout without an output
/// directory.
///
/// # Errors
///
/// Returns `OvenError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - A module name that cannot be derived
/// - Parsing errors
/// - Resolution errors
pub fn run(args: &Args) -> Result<(), OvenError> {
    let module = module_name(args)?;
    info!(
        inputs:? = args.inputs,
        module = module,
        target:% = args.target;
        "Processing inputs"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let mut source = String::new();
    for input in &args.inputs {
        source.push_str(&fs::read_to_string(input)?);
        source.push('\n');
    }
    debug!(bytes = source.len(); "Inputs read");

    let builder = SkeletonBuilder::new(app_config);
    let context = builder.build_context(&source, &module, args.target)?;

    match &args.out_dir {
        Some(dir) => {
            let path = write_context(Path::new(dir), &module, &context)?;
            info!(output_file = path.display().to_string(); "Emission context written");
        }
        None => {
            let json = serde_json::to_string_pretty(&context).map_err(io::Error::from)?;
            println!("{json}");
        }
    }

    Ok(())
}

/// The explicit module name, or the first input's file name up to its
/// first `.`.
fn module_name(args: &Args) -> Result<String, OvenError> {
    let name = match &args.module {
        Some(module) => module.clone(),
        None => args
            .inputs
            .first()
            .and_then(|input| Path::new(input).file_name())
            .map(|file| file.to_string_lossy())
            .and_then(|file| file.split('.').next().map(str::to_string))
            .unwrap_or_default(),
    };

    if name.is_empty() {
        return Err(OvenError::Config(
            "cannot determine the module name; pass --module".to_string(),
        ));
    }
    Ok(name)
}

fn write_context(dir: &Path, module: &str, context: &EmissionContext) -> Result<PathBuf, OvenError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{module}.context.json"));
    let json = serde_json::to_string_pretty(context).map_err(io::Error::from)?;
    fs::write(&path, json)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use oven::artifact::OutputKind;

    use super::*;

    fn args(inputs: &[&str], module: Option<&str>) -> Args {
        Args {
            inputs: inputs.iter().map(|i| i.to_string()).collect(),
            target: OutputKind::Both,
            out_dir: None,
            module: module.map(str::to_string),
            config: None,
            log_level: "off".to_string(),
        }
    }

    #[test]
    fn test_module_name_from_first_input() {
        let name = module_name(&args(&["idl/badge.widl", "idl/extra.widl"], None))
            .expect("module name");
        assert_eq!(name, "badge");

        let name = module_name(&args(&["tv.audio.widl"], None)).expect("module name");
        assert_eq!(name, "tv");
    }

    #[test]
    fn test_explicit_module_name() {
        let name = module_name(&args(&["idl/badge.widl"], Some("notification")))
            .expect("module name");
        assert_eq!(name, "notification");
    }

    #[test]
    fn test_empty_module_name() {
        let err = module_name(&args(&[".widl"], None)).expect_err("Should fail");
        assert!(matches!(err, OvenError::Config(_)), "got {err:?}");
    }
}
