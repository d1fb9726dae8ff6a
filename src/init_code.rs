//! Client bootstrap code for rendered widgets.
//!
//! After a page (or a page fragment) has rendered, the widgets recorded for it
//! are written out so the browser can initialize them without re-rendering:
//!
//! * state and config as additive assignments to `$markoWidgetsState` and
//!   `$markoWidgetsConfig`;
//! * the id list, either as an immediate `$markoWidgets("...")` call or as a
//!   `<noscript id="markoWidgets">` marker read by the client runtime.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codec::{JsonCodec, StateCodec, CONFIG_SERIALIZATION, STATE_SERIALIZATION};
use crate::collect::{collect_widgets, CollectedWidgets};
use crate::error::Result;
use crate::js::quote;
use crate::options::InitWidgetsOptions;
use crate::out::OutputStream;
use crate::widgets_context::WidgetsContext;

pub const TAG_START: &str = "<noscript id=\"markoWidgets\" data-ids=\"";
pub const TAG_END: &str = "\"></noscript>";

/// Where the rendered widgets are read from.
pub enum WidgetSource<'a> {
    /// An explicitly threaded widgets context.
    Context(&'a mut WidgetsContext),
    /// The widgets context stored on `out.global`.
    Global,
}

/// Collect the widgets not written yet and mark them written.
fn take_pending<O: OutputStream + ?Sized>(out: &mut O, source: WidgetSource<'_>) -> CollectedWidgets {
    let context = match source {
        WidgetSource::Context(context) => Some(context),
        WidgetSource::Global => out.global_mut().widgets.as_mut(),
    };

    match context {
        Some(context) => {
            let collected = collect_widgets(context.pending_roots());
            context.mark_flushed();
            collected
        }
        None => CollectedWidgets::default(),
    }
}

/// State and config assignments, each followed by `;\n`; empty stores are skipped.
fn deserialization_code<C: StateCodec + ?Sized>(
    collected: &CollectedWidgets,
    codec: &C,
) -> Result<String> {
    let mut code = String::new();
    if !collected.state.is_empty() {
        code.push_str(&codec.serialize(&collected.state, &STATE_SERIALIZATION)?);
        code.push_str(";\n");
    }
    if !collected.config.is_empty() {
        code.push_str(&codec.serialize(&collected.config, &CONFIG_SERIALIZATION)?);
        code.push_str(";\n");
    }
    Ok(code)
}

fn nonce_attr<O: OutputStream + ?Sized>(out: &O) -> String {
    match &out.global().csp_nonce {
        Some(nonce) if !nonce.is_empty() => format!(" nonce={}", quote(nonce)),
        _ => String::new(),
    }
}

/// Write the bootstrap markup for the rendered widgets to `out`.
pub fn write_init_widgets_code<O: OutputStream + ?Sized>(
    out: &mut O,
    options: &InitWidgetsOptions,
    source: WidgetSource<'_>,
) -> Result<()> {
    write_init_widgets_code_with(out, options, source, &JsonCodec)
}

pub fn write_init_widgets_code_with<O: OutputStream + ?Sized, C: StateCodec + ?Sized>(
    out: &mut O,
    options: &InitWidgetsOptions,
    source: WidgetSource<'_>,
    codec: &C,
) -> Result<()> {
    if options.scan_dom {
        out.write(&format!("{}*{}", TAG_START, TAG_END));
        return Ok(());
    }

    let collected = take_pending(out, source);
    if collected.is_empty() {
        return Ok(());
    }

    let code = deserialization_code(&collected, codec)?;
    let nonce_attr = nonce_attr(out);

    tracing::debug!(ids = %collected.ids, immediate = options.immediate, "writing widget init code");

    if options.immediate {
        out.write(&format!(
            "<script{}>{}$markoWidgets(\"{}\")</script>",
            nonce_attr, code, collected.ids
        ));
    } else {
        out.write(&format!("<script{}>{}</script>", nonce_attr, code));
        out.write(&format!("{}{}{}", TAG_START, collected.ids, TAG_END));
    }

    Ok(())
}

/// Bootstrap code as a string, for pages that inline it themselves.
pub fn get_init_widgets_code<O: OutputStream + ?Sized>(out: &mut O) -> Result<String> {
    let collected = take_pending(out, WidgetSource::Global);
    let mut code = deserialization_code(&collected, &JsonCodec)?;
    code.push_str(&format!("$markoWidgets(\"{}\");", collected.ids));
    Ok(code)
}

/// JSON-transportable description of the rendered widgets. The receiver runs
/// `state` and `config` through the codec's `finalize`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedWidgets {
    pub ids: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
}

impl RenderedWidgets {
    pub fn finalize<C: StateCodec + ?Sized>(self, codec: &C) -> Result<Self> {
        Ok(RenderedWidgets {
            ids: self.ids,
            state: self.state.map(|s| codec.finalize(s)).transpose()?,
            config: self.config.map(|c| codec.finalize(c)).transpose()?,
        })
    }
}

pub fn get_rendered_widgets<O: OutputStream + ?Sized>(out: &mut O) -> Result<RenderedWidgets> {
    let collected = take_pending(out, WidgetSource::Global);
    let codec = JsonCodec;

    let state = if collected.state.is_empty() {
        None
    } else {
        Some(codec.stringify_prepare(&collected.state)?)
    };
    let config = if collected.config.is_empty() {
        None
    } else {
        Some(codec.stringify_prepare(&collected.config)?)
    };

    Ok(RenderedWidgets {
        ids: collected.ids,
        state,
        config,
    })
}

#[deprecated(note = "use `get_rendered_widgets`")]
pub fn get_rendered_widget_ids<O: OutputStream + ?Sized>(out: &mut O) -> Result<RenderedWidgets> {
    tracing::warn!("`get_rendered_widget_ids` is deprecated. Use `get_rendered_widgets` instead.");
    get_rendered_widgets(out)
}
