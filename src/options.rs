use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_WIDGETS_MODULE: &str = "marko-widgets";

fn default_widgets_module() -> String {
    DEFAULT_WIDGETS_MODULE.to_string()
}

fn default_true() -> bool {
    true
}

/// Options for compiling one template (one compile unit).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileOptions {
    #[serde(default)]
    pub file_path: String,
    /// Directory searched for the default widget module (`widget.js`, `index.js`).
    #[serde(default)]
    pub dirname: Option<PathBuf>,
    /// Module that runtime helpers are required from.
    #[serde(default = "default_widgets_module")]
    pub widgets_module: String,
    /// Tags without a `-` that should still be treated as custom tags.
    #[serde(default)]
    pub custom_tags: Vec<String>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            file_path: String::new(),
            dirname: None,
            widgets_module: default_widgets_module(),
            custom_tags: vec![],
        }
    }
}

impl CompileOptions {
    pub fn for_file(file_path: &str) -> Self {
        let dirname = std::path::Path::new(file_path)
            .parent()
            .map(|p| p.to_path_buf());
        CompileOptions {
            file_path: file_path.to_string(),
            dirname,
            ..Default::default()
        }
    }

    pub fn is_custom_tag(&self, tag: &str) -> bool {
        tag.contains('-') || self.custom_tags.iter().any(|t| t == tag)
    }
}

/// Options controlling how the widget bootstrap code is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitWidgetsOptions {
    #[serde(default = "default_true")]
    pub clear_widgets: bool,
    #[serde(default, rename = "scanDOM")]
    pub scan_dom: bool,
    #[serde(default)]
    pub immediate: bool,
}

impl Default for InitWidgetsOptions {
    fn default() -> Self {
        InitWidgetsOptions {
            clear_widgets: true,
            scan_dom: false,
            immediate: false,
        }
    }
}
