//! Render output stream.

use crate::id_allocator::IdAllocator;
use crate::widgets_context::WidgetsContext;

const DEFAULT_WIDGET_ID_PREFIX: &str = "w";

/// State shared by everything written during one render pass.
#[derive(Debug, Clone, Default)]
pub struct RenderGlobal {
    /// Added as `nonce` to emitted `<script>` tags.
    pub csp_nonce: Option<String>,
    pub widgets: Option<WidgetsContext>,
    pub widget_id_prefix: Option<String>,
    ids: Option<IdAllocator>,
}

impl RenderGlobal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_csp_nonce(mut self, nonce: &str) -> Self {
        self.csp_nonce = Some(nonce.to_string());
        self
    }

    pub fn with_widget_id_prefix(mut self, prefix: &str) -> Self {
        self.widget_id_prefix = Some(prefix.to_string());
        self
    }
}

pub trait OutputStream {
    fn write(&mut self, text: &str);
    fn global(&self) -> &RenderGlobal;
    fn global_mut(&mut self) -> &mut RenderGlobal;
}

/// In-memory output stream.
#[derive(Debug, Clone, Default)]
pub struct RenderOutput {
    buffer: String,
    global: RenderGlobal,
}

impl RenderOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_global(global: RenderGlobal) -> Self {
        RenderOutput {
            buffer: String::new(),
            global,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn into_string(self) -> String {
        self.buffer
    }
}

impl OutputStream for RenderOutput {
    fn write(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn global(&self) -> &RenderGlobal {
        &self.global
    }

    fn global_mut(&mut self) -> &mut RenderGlobal {
        &mut self.global
    }
}

/// Allocate the next widget id for this render pass (`w0`, `w1`, ... or
/// `<prefix>0`, ... when `widget_id_prefix` is set).
pub fn unique_id<O: OutputStream + ?Sized>(out: &mut O) -> String {
    let global = out.global_mut();
    let prefix = global
        .widget_id_prefix
        .clone()
        .unwrap_or_else(|| DEFAULT_WIDGET_ID_PREFIX.to_string());
    global
        .ids
        .get_or_insert_with(|| IdAllocator::with_prefix(&prefix))
        .next_id()
}
