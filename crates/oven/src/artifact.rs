//! Output selection and artifact naming.

use std::{fmt, str::FromStr};

use serde::Serialize;

/// Which artifact families a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// Only the script-facing API stub.
    Js,
    /// Only the native extension scaffolding.
    Cpp,
    #[default]
    Both,
}

impl OutputKind {
    pub fn includes_js(self) -> bool {
        matches!(self, OutputKind::Js | OutputKind::Both)
    }

    pub fn includes_cpp(self) -> bool {
        matches!(self, OutputKind::Cpp | OutputKind::Both)
    }

    /// File names of the artifacts produced for `module`, script stub first.
    pub fn artifact_names(self, module: &str) -> Vec<String> {
        let mut names = Vec::new();
        if self.includes_js() {
            names.push(format!("{module}_api.js"));
        }
        if self.includes_cpp() {
            for unit in ["extension", "instance"] {
                names.push(format!("{module}_{unit}.h"));
                names.push(format!("{module}_{unit}.cc"));
            }
        }
        names
    }
}

impl FromStr for OutputKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "js" => Ok(OutputKind::Js),
            "cpp" => Ok(OutputKind::Cpp),
            "both" => Ok(OutputKind::Both),
            other => Err(format!(
                "unknown output kind `{other}` (expected js, cpp or both)"
            )),
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputKind::Js => "js",
            OutputKind::Cpp => "cpp",
            OutputKind::Both => "both",
        };
        f.write_str(name)
    }
}
