//! # Widgets Compiler
//!
//! Compile-time and render-time support for stateful UI widgets in HTML
//! templates.
//!
//! ## Compile time
//!
//! A template is parsed into a node tree, rewritten by the widgets transform
//! and printed as a CommonJS render module:
//!
//! 1. **Widget roots** (`w-bind`) push a frame on the compile unit's widget
//!    stack for the duration of their subtree. The top of the stack is always
//!    the nearest enclosing widget.
//! 2. **Element ids** are assigned at most once per element. Outside loops the
//!    id is the static call `widget.elId("<n>")`; inside loops it is computed
//!    at runtime from `"<n>[]"` so every iteration gets its own id.
//! 3. **Widget args** (`w-id`, `w-on*`, `w-extend` on custom tags) become an
//!    init call before the element and a cleanup call after it. Pairs of
//!    nested elements nest.
//! 4. **Body slots** (`w-body`) must sit inside a widget; elsewhere they are
//!    reported and compilation continues.
//!
//! ## Render time
//!
//! Widgets rendered during a pass are recorded in a [`WidgetsContext`]. The
//! bootstrap writer flattens that tree children first and writes state,
//! config and the id list for the browser.

#[cfg(feature = "napi")]
use napi_derive::napi;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

pub mod ast;
pub mod codec;
pub mod codegen;
pub mod collect;
pub mod context;
pub mod error;
pub mod host;
pub mod id_allocator;
pub mod init_code;
pub mod js;
pub mod options;
pub mod out;
pub mod parse;
pub mod renderable;
pub mod transform;
pub mod transform_helper;
pub mod visitor;
pub mod widget_args;
pub mod widget_stack;
pub mod widgets_context;

#[cfg(feature = "napi")]
mod napi_bindings;

#[cfg(test)]
mod init_code_tests;

#[cfg(feature = "napi")]
pub use napi_bindings::{compile_template_native, get_init_widgets_code_native};

pub use codegen::generate_module;
pub use collect::{collect_widgets, CollectedWidgets};
pub use context::CompileContext;
pub use error::{CompileError, Error, Result};
#[allow(deprecated)]
pub use init_code::get_rendered_widget_ids;
pub use init_code::{
    get_init_widgets_code, get_rendered_widgets, write_init_widgets_code, RenderedWidgets,
    WidgetSource,
};
pub use options::{CompileOptions, InitWidgetsOptions};
pub use out::{unique_id, OutputStream, RenderGlobal, RenderOutput};
pub use parse::parse_template;
pub use renderable::{make_renderable, Renderable, Renderer};
pub use transform::transform_template;
pub use transform_helper::TransformHelper;
pub use widget_args::WidgetArgs;
pub use widget_stack::WidgetStack;
pub use widgets_context::{get_widgets_context, RenderedWidget, WidgetsContext};

/// Output of compiling one template.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "napi", napi(object))]
#[serde(rename_all = "camelCase")]
pub struct CompileResult {
    /// The render module.
    pub code: String,
    /// Diagnostics for nodes whose widget output is incomplete.
    pub errors: Vec<CompileError>,
}

impl CompileResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Compile one template: parse, apply the widgets transform, generate code.
pub fn compile_template(source: &str, options: &CompileOptions) -> Result<CompileResult> {
    let parsed = parse_template(source, options)?;
    let mut nodes = parsed.nodes;

    let mut ctx = CompileContext::new(options.clone());
    transform_template(&mut nodes, &mut ctx);
    let code = generate_module(&nodes, &mut ctx);

    let mut errors = parsed.errors;
    errors.extend(ctx.take_errors());

    tracing::debug!(
        file = %options.file_path,
        errors = errors.len(),
        "compiled template"
    );

    Ok(CompileResult { code, errors })
}

/// Compile independent templates in parallel. Each unit gets its own
/// context, so results match compiling them one by one.
pub fn compile_templates(units: &[(String, CompileOptions)]) -> Vec<Result<CompileResult>> {
    units
        .par_iter()
        .map(|(source, options)| compile_template(source, options))
        .collect()
}
