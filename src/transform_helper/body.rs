use crate::error::ERR_BODY_SCOPE;
use crate::host::HostNode;
use crate::js::{Expr, Stmt};

use super::TransformHelper;

const WIDGET_BODY_MODULE: &str = "marko-widgets/taglib/helpers/widgetBody";

impl<'a, N: HostNode + ?Sized> TransformHelper<'a, N> {
    /// `w-body`: mark where the containing widget's body content renders.
    pub fn handle_widget_body(&mut self) {
        if !self.el.has_attribute("w-body") {
            return;
        }

        if self.containing_widget().is_none() {
            self.add_error(
                ERR_BODY_SCOPE,
                "w-body can only be used within the scope of w-bind",
            );
            return;
        }

        let body = self.el.remove_attribute("w-body").and_then(|a| a.value);

        let (id_expression, widget_body_expression) = if self.is_widget_root() {
            // The root's id is the widget id, which only exists inside the
            // widget wrapper. An empty `data-w-body` marks the root itself.
            let expression = body.unwrap_or_else(|| {
                if let Some(frame) = self.containing_widget_mut() {
                    frame.set_attribute_value("body", Expr::str(""));
                }
                Expr::ident("data").member("widgetBody")
            });
            (Expr::ident("widget").member("id"), expression)
        } else {
            let expression = match body {
                Some(expression) => {
                    // The body may be rendered any number of times, so the id has to be
                    // computed at runtime.
                    let info = self.assign_widget_id(true);
                    if !info.has_id_var_node() {
                        if let Some(id_var_node) = info.create_id_var_node() {
                            self.el.insert_before(id_var_node);
                        }
                    }
                    expression
                }
                None => {
                    self.assign_widget_id(false);
                    let nested = self.nested_id_expression();
                    if let Some(frame) = self.containing_widget_mut() {
                        frame.set_attribute_value("body", nested);
                    }
                    Expr::ident("data").member("widgetBody")
                }
            };
            (self.id_expression(), expression)
        };

        let path = self.ctx.widgets_require_path(WIDGET_BODY_MODULE);
        let widget_body_var = self.ctx.import_module("__widgetBody", &path);

        let call = widget_body_var.call(vec![
            Expr::out(),
            id_expression,
            widget_body_expression,
            Expr::ident("widget"),
        ]);

        self.el.append_child(Stmt::expr(call));
    }
}
