use crate::ast::WidgetBinding;
use crate::context::CompileContext;
use crate::error::{ERR_BIND_SCOPE, ERR_DEFAULT_MODULE};
use crate::host::HostNode;
use crate::js::Expr;
use crate::widget_stack::WidgetFrame;

use super::TransformHelper;

const WIDGET_TAG_MODULE: &str = "marko-widgets/taglib/widget-tag";

impl<'a, N: HostNode + ?Sized> TransformHelper<'a, N> {
    /// `w-bind`: make this element the root of a widget. Returns `true` when a
    /// frame was pushed; the caller must then call `finish_widget_bind` after
    /// the element's subtree has been transformed.
    pub fn handle_widget_bind(&mut self) -> bool {
        let bind = match self.el.remove_attribute("w-bind") {
            Some(attr) => attr.value,
            None => return false,
        };

        let widget_type = match bind {
            Some(Expr::Str(path)) if !path.is_empty() => self.build_widget_type_node(&path),
            Some(Expr::Str(_)) | None => match self.default_widget_module() {
                Some(path) => self.build_widget_type_node(&path),
                None => {
                    self.add_error(
                        ERR_DEFAULT_MODULE,
                        "Unable to find default widget module when using w-bind without a value",
                    );
                    return false;
                }
            },
            Some(expr) => expr,
        };

        // A nested widget root takes its id from the enclosing widget, which is
        // still the top of the stack at this point.
        if let Some(attr) = self.el.remove_attribute("w-id") {
            if self.containing_widget().is_none() {
                self.add_error(
                    ERR_BIND_SCOPE,
                    "w-id can only be used within the scope of w-bind",
                );
            } else if let Some(id) = attr.value {
                self.widget_args().set_id(id);
            }
        }

        tracing::debug!(tag = self.el.tag_name(), widget_type = %widget_type, "bound widget");

        let frame = WidgetFrame::new(self.el.tag_name(), *self.el.location(), widget_type);
        self.ctx.widget_stack.push(frame);
        self.widget_root = true;
        true
    }
}

/// Apply the popped frame of a bound element: widget attributes, deferred
/// attribute writes from descendants, and the widget wrapper.
pub fn finish_widget_bind<N: HostNode + ?Sized>(
    el: &mut N,
    ctx: &mut CompileContext,
    frame: WidgetFrame,
) {
    let widget = Expr::ident("widget");
    let widget_type = frame.widget_type.clone();

    el.set_attribute_value("id", widget.clone().member("id"));
    el.set_attribute_value("data-widget", widget_type.clone().member("name"));
    if frame.has_dom_events {
        el.set_attribute_value("data-w-on", Expr::str("1"));
    }

    for (name, value) in frame.into_attributes() {
        match name.as_str() {
            "body" => el.set_attribute_value("data-w-body", value),
            _ => el.set_attribute_value(&name, value),
        }
    }

    let path = ctx.widgets_require_path(WIDGET_TAG_MODULE);
    let helper = ctx.import_module("__widgetTag", &path);
    el.bind_widget(WidgetBinding {
        helper,
        widget_type,
    });
}
