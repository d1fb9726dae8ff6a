use crate::context::CompileContext;
use crate::host::HostNode;
use crate::js::{Expr, Stmt};

const WIDGET_ARGS_MODULE: &str = "marko-widgets/taglib/helpers/widgetArgs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetExtend {
    pub widget_type: Expr,
    pub config: Option<Expr>,
    pub state: Option<Expr>,
}

/// Arguments handed to the next widget instantiated under a node.
///
/// Nothing is emitted unless at least one setter was called.
#[derive(Debug, Clone)]
pub struct WidgetArgs {
    id: Option<Expr>,
    custom_events: Option<Vec<(String, Expr)>>,
    extend: Option<WidgetExtend>,
    empty: bool,
}

impl Default for WidgetArgs {
    fn default() -> Self {
        WidgetArgs {
            id: None,
            custom_events: None,
            extend: None,
            empty: true,
        }
    }
}

impl WidgetArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn set_id(&mut self, id: Expr) {
        self.empty = false;
        self.id = Some(id);
    }

    pub fn id(&self) -> Option<&Expr> {
        self.id.as_ref()
    }

    pub fn add_custom_event(&mut self, event_type: &str, target_method: Expr) {
        self.empty = false;
        self.custom_events
            .get_or_insert_with(Vec::new)
            .push((event_type.to_string(), target_method));
    }

    pub fn custom_events(&self) -> &[(String, Expr)] {
        self.custom_events.as_deref().unwrap_or(&[])
    }

    pub fn set_extend(&mut self, widget_type: Expr, config: Option<Expr>, state: Option<Expr>) {
        self.empty = false;
        self.extend = Some(WidgetExtend {
            widget_type,
            config,
            state,
        });
    }

    pub fn extend(&self) -> Option<&WidgetExtend> {
        self.extend.as_ref()
    }

    /// Bracket `el` with the init call before and the cleanup call after.
    pub fn compile<N: HostNode + ?Sized>(&self, el: &mut N, ctx: &mut CompileContext) {
        if self.is_empty() {
            return;
        }

        let init = self.build_widget_args_call(ctx);
        let cleanup = self.build_cleanup_call(ctx);
        el.insert_before(Stmt::expr(init));
        el.insert_after(Stmt::expr(cleanup));
    }

    pub fn build_widget_args_call(&self, ctx: &mut CompileContext) -> Expr {
        let path = ctx.widgets_require_path(WIDGET_ARGS_MODULE);
        let widget_args_var = ctx.import_module("__widgetArgs", &path);

        // The nested widget needs the containing widget's id to scope its own.
        let should_provide_scope = self.id.is_some() || self.custom_events.is_some();

        let mut args = vec![Expr::out()];

        if should_provide_scope {
            args.push(Expr::ident("widget").member("id"));
        } else {
            args.push(Expr::Null);
        }

        args.push(self.id.clone().unwrap_or(Expr::Null));

        if let Some(events) = &self.custom_events {
            let mut flat = Vec::with_capacity(events.len() * 2);
            for (event_type, target_method) in events {
                flat.push(Expr::str(event_type));
                flat.push(target_method.clone());
            }
            args.push(Expr::Array(flat));
        }

        if let Some(extend) = &self.extend {
            if self.custom_events.is_none() {
                args.push(Expr::Null);
            }
            args.push(extend.widget_type.clone());
            args.push(extend.config.clone().unwrap_or(Expr::Null));
            args.push(extend.state.clone().unwrap_or(Expr::Null));
        }

        widget_args_var.call(args)
    }

    pub fn build_cleanup_call(&self, ctx: &mut CompileContext) -> Expr {
        let cleanup_var = ctx.add_static_var("_cleanupWidgetArgs", "__widgetArgs.cleanup");
        cleanup_var.call(vec![Expr::out()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Attribute, SourceLocation, WidgetBinding};
    use crate::options::CompileOptions;

    /// Host node that only records insertions.
    #[derive(Default)]
    struct RecordingNode {
        location: SourceLocation,
        before: Vec<Stmt>,
        after: Vec<Stmt>,
        insertions: usize,
    }

    impl HostNode for RecordingNode {
        fn tag_name(&self) -> &str {
            "app-child"
        }
        fn location(&self) -> &SourceLocation {
            &self.location
        }
        fn has_attribute(&self, _name: &str) -> bool {
            false
        }
        fn attribute_value(&self, _name: &str) -> Option<&Expr> {
            None
        }
        fn set_attribute_value(&mut self, _name: &str, _value: Expr) {}
        fn remove_attribute(&mut self, _name: &str) -> Option<Attribute> {
            None
        }
        fn attribute_names(&self) -> Vec<String> {
            vec![]
        }
        fn insert_before(&mut self, code: Stmt) {
            self.insertions += 1;
            self.before.push(code);
        }
        fn insert_after(&mut self, code: Stmt) {
            self.insertions += 1;
            self.after.push(code);
        }
        fn append_child(&mut self, _code: Stmt) {
            self.insertions += 1;
        }
        fn bind_widget(&mut self, _binding: WidgetBinding) {}
    }

    fn ctx() -> CompileContext {
        CompileContext::new(CompileOptions::default())
    }

    #[test]
    fn test_empty_args_insert_nothing() {
        let mut ctx = ctx();
        let mut node = RecordingNode::default();
        WidgetArgs::new().compile(&mut node, &mut ctx);
        assert_eq!(node.insertions, 0);
        assert!(ctx.static_vars().is_empty());
    }

    #[test]
    fn test_id_only() {
        let mut ctx = ctx();
        let mut node = RecordingNode::default();
        let mut args = WidgetArgs::new();
        args.set_id(Expr::str("btn"));
        args.compile(&mut node, &mut ctx);

        assert_eq!(node.insertions, 2);
        assert_eq!(
            node.before[0].to_string(),
            r#"__widgetArgs(out, widget.id, "btn");"#
        );
        assert_eq!(node.after[0].to_string(), "_cleanupWidgetArgs(out);");
    }

    #[test]
    fn test_custom_events_are_flattened_pairs() {
        let mut ctx = ctx();
        let mut args = WidgetArgs::new();
        args.set_id(Expr::str("0"));
        args.add_custom_event("change", Expr::str("handleChange"));
        args.add_custom_event("close", Expr::str("handleClose"));

        let call = args.build_widget_args_call(&mut ctx);
        assert_eq!(
            call.to_string(),
            r#"__widgetArgs(out, widget.id, "0", ["change", "handleChange", "close", "handleClose"])"#
        );
    }

    #[test]
    fn test_extend_without_events_gets_null_placeholder() {
        let mut ctx = ctx();
        let mut args = WidgetArgs::new();
        args.set_extend(Expr::ident("__widgetType"), Some(Expr::raw("data.config")), None);

        let call = args.build_widget_args_call(&mut ctx);
        assert_eq!(
            call.to_string(),
            "__widgetArgs(out, null, null, null, __widgetType, data.config, null)"
        );
    }

    #[test]
    fn test_extend_with_events_has_no_placeholder() {
        let mut ctx = ctx();
        let mut args = WidgetArgs::new();
        args.add_custom_event("select", Expr::str("handleSelect"));
        args.set_extend(Expr::ident("T"), None, Some(Expr::raw("data.state")));

        let call = args.build_widget_args_call(&mut ctx);
        assert_eq!(
            call.to_string(),
            r#"__widgetArgs(out, widget.id, null, ["select", "handleSelect"], T, null, data.state)"#
        );
    }

    #[test]
    fn test_helper_vars_declared() {
        let mut ctx = ctx();
        let mut node = RecordingNode::default();
        let mut args = WidgetArgs::new();
        args.set_id(Expr::str("a"));
        args.compile(&mut node, &mut ctx);

        let names: Vec<&str> = ctx.static_vars().iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["__widgetArgs", "_cleanupWidgetArgs"]);
    }
}
