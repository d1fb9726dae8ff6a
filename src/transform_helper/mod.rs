//! Per-node widget transform state.
//!
//! A `TransformHelper` is created for every element the widgets transformer
//! visits. It owns the node's lazily assigned widget id and its widget args,
//! and reaches the compile unit's containing-widget stack through the context.

mod bind;
mod body;
mod events;

pub use bind::finish_widget_bind;

use crate::ast::SourceLocation;
use crate::context::CompileContext;
use crate::host::HostNode;
use crate::js::{Expr, Stmt};
use crate::widget_args::WidgetArgs;
use crate::widget_stack::WidgetFrame;

/// Resolved id for one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetIdInfo {
    /// Id relative to the containing widget (what `widget.elId()` receives).
    pub nested_id_expression: Expr,
    /// Fully qualified id.
    pub id_expression: Expr,
    id_var_name: Option<String>,
    id_var_node: Option<Stmt>,
}

impl WidgetIdInfo {
    /// Whether the runtime id variable has been declared for this node.
    pub fn has_id_var_node(&self) -> bool {
        self.id_var_node.is_some()
    }

    /// Declaration of the runtime id variable: `var __widgetId<n> = widget.elId("<n>[]")`.
    /// `None` for ids that are not repeated.
    pub fn create_id_var_node(&mut self) -> Option<Stmt> {
        let name = self.id_var_name.as_ref()?;
        let init = Expr::ident("widget")
            .member("elId")
            .call(vec![self.nested_id_expression.clone()]);
        let node = Stmt::var(name, init);
        self.id_var_node = Some(node.clone());
        Some(node)
    }
}

pub struct TransformHelper<'a, N: HostNode + ?Sized> {
    pub el: &'a mut N,
    pub ctx: &'a mut CompileContext,
    in_loop: bool,
    widget_root: bool,
    widget_id_info: Option<WidgetIdInfo>,
    widget_args: Option<WidgetArgs>,
}

impl<'a, N: HostNode + ?Sized> TransformHelper<'a, N> {
    pub fn new(el: &'a mut N, ctx: &'a mut CompileContext, in_loop: bool) -> Self {
        TransformHelper {
            el,
            ctx,
            in_loop,
            widget_root: false,
            widget_id_info: None,
            widget_args: None,
        }
    }

    pub fn add_error(&mut self, code: &str, message: &str) {
        let location: SourceLocation = *self.el.location();
        self.ctx.add_error(&location, code, message);
    }

    pub fn widget_args(&mut self) -> &mut WidgetArgs {
        self.widget_args.get_or_insert_with(WidgetArgs::new)
    }

    /// Hand the accumulated args to the caller; they are compiled once the
    /// node's subtree has been transformed.
    pub fn into_widget_args(self) -> Option<WidgetArgs> {
        self.widget_args
    }

    /// Whether `handle_widget_bind` made this element a widget root.
    pub fn is_widget_root(&self) -> bool {
        self.widget_root
    }

    pub fn containing_widget(&self) -> Option<&WidgetFrame> {
        self.ctx.widget_stack.current()
    }

    pub fn containing_widget_mut(&mut self) -> Option<&mut WidgetFrame> {
        self.ctx.widget_stack.current_mut()
    }

    /// `widget.elId(<id>)`, or `widget.elId()` for the widget's own id.
    pub fn build_widget_el_id_call(&self, id: Option<Expr>) -> Expr {
        let el_id = Expr::ident("widget").member("elId");
        el_id.call(id.into_iter().collect())
    }

    /// Assign this node's widget id. Only the first call allocates; later
    /// calls return the memoized result whatever `repeated` is.
    pub fn assign_widget_id(&mut self, repeated: bool) -> &mut WidgetIdInfo {
        let info = match self.widget_id_info.take() {
            Some(info) => info,
            None => {
                let mut info = self.build_widget_id_info(repeated);
                if !self.el.is_custom_tag() {
                    // The `id` attribute may refer to the id variable, so declare it first.
                    if let Some(node) = info.create_id_var_node() {
                        self.el.insert_before(node);
                    }
                    self.el.set_attribute_value("id", info.id_expression.clone());
                }
                info
            }
        };
        self.widget_id_info.insert(info)
    }

    fn build_widget_id_info(&mut self, repeated: bool) -> WidgetIdInfo {
        if let Some(explicit) = self.el.remove_attribute("w-id").and_then(|a| a.value) {
            let id_expression = self.build_widget_el_id_call(Some(explicit.clone()));
            tracing::debug!(tag = self.el.tag_name(), id = %explicit, "explicit widget id");
            return WidgetIdInfo {
                nested_id_expression: explicit,
                id_expression,
                id_var_name: None,
                id_var_node: None,
            };
        }

        let unique_id = self.ctx.next_unique_id();
        tracing::debug!(tag = self.el.tag_name(), unique_id, repeated, "assigned widget id");

        if repeated {
            let var_name = format!("__widgetId{}", unique_id);
            WidgetIdInfo {
                nested_id_expression: Expr::Str(format!("{}[]", unique_id)),
                id_expression: Expr::ident(&var_name),
                id_var_name: Some(var_name),
                id_var_node: None,
            }
        } else {
            let nested = Expr::Str(unique_id.to_string());
            WidgetIdInfo {
                id_expression: self.build_widget_el_id_call(Some(nested.clone())),
                nested_id_expression: nested,
                id_var_name: None,
                id_var_node: None,
            }
        }
    }

    /// Declare the runtime id variable before the node unless already done.
    pub fn ensure_id_var_node(&mut self) {
        let node = match self.widget_id_info.as_mut() {
            Some(info) if !info.has_id_var_node() => info.create_id_var_node(),
            _ => None,
        };
        if let Some(node) = node {
            self.el.insert_before(node);
        }
    }

    pub fn nested_id_expression(&mut self) -> Expr {
        let repeated = self.in_loop;
        self.assign_widget_id(repeated).nested_id_expression.clone()
    }

    pub fn id_expression(&mut self) -> Expr {
        let repeated = self.in_loop;
        self.assign_widget_id(repeated);
        self.ensure_id_var_node();
        self.assign_widget_id(repeated).id_expression.clone()
    }

    /// Report `message` unless the node is inside a widget.
    fn require_containing_widget(&mut self, code: &str, message: &str) -> bool {
        if self.containing_widget().is_some() {
            return true;
        }
        self.add_error(code, message);
        false
    }

    /// `w-id` on a node that is not itself a widget root.
    pub fn handle_widget_id(&mut self) {
        if !self.el.has_attribute("w-id") {
            return;
        }
        if !self.require_containing_widget(
            crate::error::ERR_BIND_SCOPE,
            "w-id can only be used within the scope of w-bind",
        ) {
            self.el.remove_attribute("w-id");
            return;
        }

        if self.el.is_custom_tag() {
            let nested = self.nested_id_expression();
            self.widget_args().set_id(nested);
        } else {
            let repeated = self.in_loop;
            self.assign_widget_id(repeated);
            self.ensure_id_var_node();
        }
    }

    /// `w-extend="./base-widget"` with optional `w-config` / `w-state`.
    pub fn handle_widget_extend(&mut self) {
        let extend = match self.el.remove_attribute("w-extend") {
            Some(attr) => attr.value,
            None => return,
        };

        let widget_type = match extend {
            Some(Expr::Str(path)) if !path.is_empty() => self.build_widget_type_node(&path),
            Some(Expr::Str(_)) | None => match self.default_widget_module() {
                Some(path) => self.build_widget_type_node(&path),
                None => {
                    self.add_error(
                        crate::error::ERR_DEFAULT_MODULE,
                        "Unable to find default widget module when using w-extend without a value",
                    );
                    return;
                }
            },
            Some(expr) => expr,
        };

        let config = self.el.remove_attribute("w-config").and_then(|a| a.value);
        let state = self.el.remove_attribute("w-state").and_then(|a| a.value);
        self.widget_args().set_extend(widget_type, config, state);
    }

    /// `w-for="name"` points a label at a nested element id.
    pub fn handle_widget_for(&mut self) {
        let target = match self.el.remove_attribute("w-for") {
            Some(attr) => attr.value,
            None => return,
        };
        if !self.require_containing_widget(
            crate::error::ERR_BIND_SCOPE,
            "w-for can only be used within the scope of w-bind",
        ) {
            return;
        }
        if let Some(target) = target {
            let el_id = self.build_widget_el_id_call(Some(target));
            self.el.set_attribute_value("for", el_id);
        }
    }

    /// `./widget` or `./` when a `widget.js` or `index.js` sits next to the template.
    pub fn default_widget_module(&self) -> Option<String> {
        let dirname = self.ctx.dirname()?;
        if dirname.join("widget.js").exists() {
            Some("./widget".to_string())
        } else if dirname.join("index.js").exists() {
            Some("./".to_string())
        } else {
            None
        }
    }

    /// Static variable describing a widget module:
    /// `{name: "<path>", def: function() { return require("<path>"); }}`.
    pub fn build_widget_type_node(&mut self, path: &str) -> Expr {
        let name = match self.ctx.dirname() {
            Some(dirname) if path.starts_with('.') => {
                let joined = dirname.join(path.strip_prefix("./").unwrap_or(path));
                joined.to_string_lossy().replace('\\', "/")
            }
            _ => path.to_string(),
        };
        let code = format!(
            "{{name: {}, def: function() {{ return require({}); }}}}",
            crate::js::quote(&name),
            crate::js::quote(path)
        );
        self.ctx.add_unique_static_var("__widgetType", &code)
    }
}
