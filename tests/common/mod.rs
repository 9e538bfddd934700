#![allow(dead_code)]

use std::fs;

use phpantom_types::{Constant, Extractor, ExtractorConfig, FunctionParameters, Parameter};

pub fn create_test_extractor() -> Extractor {
    init_tracing();
    Extractor::new(ExtractorConfig::default())
}

/// Extractor whose registry knows the given class names.
pub fn create_extractor_with_known_types(known: &[&str]) -> Extractor {
    init_tracing();
    Extractor::new(ExtractorConfig {
        known_types: known.iter().map(|s| s.to_string()).collect(),
        ..ExtractorConfig::default()
    })
}

/// Install a test subscriber honouring `RUST_LOG`, once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Find a constant by its (possibly qualified) name.
pub fn constant<'a>(constants: &'a [Constant], name: &str) -> &'a Constant {
    constants
        .iter()
        .find(|c| c.name == name)
        .unwrap_or_else(|| {
            let names: Vec<_> = constants.iter().map(|c| c.name.as_str()).collect();
            panic!("constant {name} not found among {names:?}")
        })
}

/// Find a parameter by function and parameter name.
pub fn parameter<'a>(
    functions: &'a [FunctionParameters],
    function: &str,
    name: &str,
) -> &'a Parameter {
    let func = functions
        .iter()
        .find(|f| f.function == function)
        .unwrap_or_else(|| {
            let names: Vec<_> = functions.iter().map(|f| f.function.as_str()).collect();
            panic!("function {function} not found among {names:?}")
        });
    func.parameters
        .iter()
        .find(|p| p.name == name)
        .unwrap_or_else(|| panic!("parameter ${name} not found in {function}"))
}

/// Extract the parameters of a single-function PHP snippet.
pub fn params_of(extractor: &Extractor, php: &str, function: &str) -> Vec<Parameter> {
    extractor
        .extract_parameters(php)
        .into_iter()
        .find(|f| f.function == function)
        .map(|f| f.parameters)
        .unwrap_or_else(|| panic!("function {function} not found"))
}

/// Create a temp directory tree with the given files.
pub fn create_workspace(files: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    for (rel_path, content) in files {
        let full = dir.path().join(rel_path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).expect("failed to create dirs");
        }
        fs::write(&full, content).expect("failed to write file");
    }
    dir
}
