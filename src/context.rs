use std::path::Path;

use crate::ast::SourceLocation;
use crate::error::CompileError;
use crate::id_allocator::IdAllocator;
use crate::js::{quote, Expr};
use crate::options::{CompileOptions, DEFAULT_WIDGETS_MODULE};
use crate::widget_stack::WidgetStack;

/// Module-level `var` emitted once at the top of the compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticVar {
    pub name: String,
    pub code: String,
}

/// State owned by one compile unit (one template processed end to end).
///
/// Every transform call for the unit receives the same context by `&mut`;
/// nothing here is shared between units.
#[derive(Debug)]
pub struct CompileContext {
    pub options: CompileOptions,
    pub widget_stack: WidgetStack,
    element_ids: IdAllocator,
    static_vars: Vec<StaticVar>,
    errors: Vec<CompileError>,
}

impl CompileContext {
    pub fn new(options: CompileOptions) -> Self {
        CompileContext {
            options,
            widget_stack: WidgetStack::new(),
            element_ids: IdAllocator::new(),
            static_vars: vec![],
            errors: vec![],
        }
    }

    pub fn file_path(&self) -> &str {
        &self.options.file_path
    }

    pub fn dirname(&self) -> Option<&Path> {
        self.options.dirname.as_deref()
    }

    /// Next compile-unit-unique element id suffix.
    pub fn next_unique_id(&mut self) -> u64 {
        self.element_ids.next_index()
    }

    /// Declare `var <name> = <code>` at module level. Declaring the same name
    /// twice keeps the first declaration.
    pub fn add_static_var(&mut self, name: &str, code: &str) -> Expr {
        if !self.static_vars.iter().any(|v| v.name == name) {
            self.static_vars.push(StaticVar {
                name: name.to_string(),
                code: code.to_string(),
            });
        }
        Expr::ident(name)
    }

    /// Like `add_static_var`, but picks a fresh name (`base`, `base2`, ...)
    /// unless a variable with identical code already exists.
    pub fn add_unique_static_var(&mut self, base: &str, code: &str) -> Expr {
        if let Some(existing) = self.static_vars.iter().find(|v| v.code == code) {
            return Expr::ident(&existing.name);
        }
        let mut name = base.to_string();
        let mut n = 1;
        while self.static_vars.iter().any(|v| v.name == name) {
            n += 1;
            name = format!("{}{}", base, n);
        }
        self.add_static_var(&name, code)
    }

    pub fn import_module(&mut self, var_name: &str, path: &str) -> Expr {
        self.add_static_var(var_name, &format!("require({})", quote(path)))
    }

    /// Require path for a module of the widgets runtime, honouring a renamed
    /// widgets package.
    pub fn widgets_require_path(&self, target: &str) -> String {
        match target.strip_prefix(DEFAULT_WIDGETS_MODULE) {
            Some(rest) => format!("{}{}", self.options.widgets_module, rest),
            None => target.to_string(),
        }
    }

    pub fn static_vars(&self) -> &[StaticVar] {
        &self.static_vars
    }

    pub fn add_error(&mut self, location: &SourceLocation, code: &str, message: &str) {
        tracing::debug!(file = %self.options.file_path, code, message, "widget compile error");
        let error = CompileError::new(code, message, &self.options.file_path, location);
        self.errors.push(error);
    }

    pub fn errors(&self) -> &[CompileError] {
        &self.errors
    }

    pub fn take_errors(&mut self) -> Vec<CompileError> {
        std::mem::take(&mut self.errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_vars_deduplicate_by_name() {
        let mut ctx = CompileContext::new(CompileOptions::default());
        let a = ctx.import_module("__widgetArgs", "marko-widgets/taglib/helpers/widgetArgs");
        let b = ctx.import_module("__widgetArgs", "something/else");
        assert_eq!(a, b);
        assert_eq!(ctx.static_vars().len(), 1);
        assert_eq!(
            ctx.static_vars()[0].code,
            r#"require("marko-widgets/taglib/helpers/widgetArgs")"#
        );
    }

    #[test]
    fn test_unique_static_vars() {
        let mut ctx = CompileContext::new(CompileOptions::default());
        let a = ctx.add_unique_static_var("__widgetType", "A");
        let b = ctx.add_unique_static_var("__widgetType", "B");
        let a_again = ctx.add_unique_static_var("__widgetType", "A");
        assert_eq!(a, Expr::ident("__widgetType"));
        assert_eq!(b, Expr::ident("__widgetType2"));
        assert_eq!(a_again, a);
    }

    #[test]
    fn test_widgets_require_path_follows_module_option() {
        let mut options = CompileOptions::default();
        options.widgets_module = "@acme/widgets".to_string();
        let ctx = CompileContext::new(options);
        assert_eq!(
            ctx.widgets_require_path("marko-widgets/taglib/helpers/widgetBody"),
            "@acme/widgets/taglib/helpers/widgetBody"
        );
        assert_eq!(ctx.widgets_require_path("raptor-util"), "raptor-util");
    }

    #[test]
    fn test_unique_ids_are_per_context() {
        let mut a = CompileContext::new(CompileOptions::default());
        let mut b = CompileContext::new(CompileOptions::default());
        assert_eq!(a.next_unique_id(), 0);
        assert_eq!(a.next_unique_id(), 1);
        assert_eq!(b.next_unique_id(), 0);
    }
}
