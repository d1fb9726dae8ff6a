//! Node bindings, built with `--features napi`.

use napi_derive::napi;

use crate::init_code::{write_init_widgets_code, WidgetSource};
use crate::options::{CompileOptions, InitWidgetsOptions};
use crate::out::{RenderGlobal, RenderOutput};
use crate::widgets_context::{RenderedWidget, WidgetsContext};
use crate::{compile_template, CompileResult};

#[napi(object)]
pub struct NativeRenderedWidget {
    pub id: String,
    pub state: Option<serde_json::Value>,
    pub config: Option<serde_json::Value>,
    pub children: Vec<NativeRenderedWidget>,
}

fn into_rendered_widget(native: NativeRenderedWidget) -> RenderedWidget {
    let mut widget = RenderedWidget::new(&native.id);
    if let Some(serde_json::Value::Object(state)) = native.state {
        widget.state = Some(state);
    }
    if let Some(serde_json::Value::Object(config)) = native.config {
        widget.config = Some(config);
    }
    widget.children = native.children.into_iter().map(into_rendered_widget).collect();
    widget
}

#[napi]
pub fn compile_template_native(source: String, options_json: Option<String>) -> napi::Result<CompileResult> {
    let options: CompileOptions = match options_json {
        Some(json) => serde_json::from_str(&json)
            .map_err(|e| napi::Error::from_reason(format!("Invalid options: {}", e)))?,
        None => CompileOptions::default(),
    };
    compile_template(&source, &options).map_err(|e| napi::Error::from_reason(e.to_string()))
}

#[napi]
pub fn get_init_widgets_code_native(
    widgets: Vec<NativeRenderedWidget>,
    options_json: Option<String>,
    csp_nonce: Option<String>,
) -> napi::Result<String> {
    let options: InitWidgetsOptions = match options_json {
        Some(json) => serde_json::from_str(&json)
            .map_err(|e| napi::Error::from_reason(format!("Invalid options: {}", e)))?,
        None => InitWidgetsOptions::default(),
    };

    let mut context = WidgetsContext::new();
    for widget in widgets {
        context.add_widget(into_rendered_widget(widget));
    }

    let mut global = RenderGlobal::new();
    global.csp_nonce = csp_nonce;
    let mut out = RenderOutput::with_global(global);
    write_init_widgets_code(&mut out, &options, WidgetSource::Context(&mut context))
        .map_err(|e| napi::Error::from_reason(e.to_string()))?;

    Ok(out.into_string())
}
