//! Renderable wrappers around render functions.

use serde_json::Value;

use crate::error::Result;
use crate::out::{RenderGlobal, RenderOutput};

/// Something that writes markup for `data` to `out`.
pub trait Renderer {
    fn render(&self, data: &Value, out: &mut RenderOutput) -> Result<()>;
}

impl<F> Renderer for F
where
    F: Fn(&Value, &mut RenderOutput) -> Result<()>,
{
    fn render(&self, data: &Value, out: &mut RenderOutput) -> Result<()> {
        self(data, out)
    }
}

pub struct Renderable<R: Renderer> {
    renderer: R,
    global: RenderGlobal,
}

impl<R: Renderer> Renderable<R> {
    pub fn new(renderer: R) -> Self {
        Renderable {
            renderer,
            global: RenderGlobal::default(),
        }
    }

    /// Global state every render pass starts from (nonce, id prefix).
    pub fn with_global(mut self, global: RenderGlobal) -> Self {
        self.global = global;
        self
    }

    /// Render into a fresh output stream. The returned stream still holds the
    /// widgets recorded during the pass.
    pub fn render_sync(&self, data: &Value) -> Result<RenderOutput> {
        let mut out = RenderOutput::with_global(self.global.clone());
        self.renderer.render(data, &mut out)?;
        Ok(out)
    }

    pub fn render_with<F>(&self, data: &Value, callback: F)
    where
        F: FnOnce(Result<RenderOutput>),
    {
        callback(self.render_sync(data));
    }

    #[deprecated(note = "use `render_sync` or `render_with`")]
    pub fn render(&self, data: &Value) -> Result<RenderOutput> {
        tracing::warn!("Calling `render` synchronously is deprecated. Use `render_sync` instead.");
        self.render_sync(data)
    }
}

pub fn make_renderable<R: Renderer>(renderer: R) -> Renderable<R> {
    Renderable::new(renderer)
}
