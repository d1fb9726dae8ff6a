//! Codegen module
//!
//! Prints a transformed template tree as a CommonJS render module:
//!
//! ```text
//! "use strict";
//! var __widgetArgs = require("marko-widgets/taglib/helpers/widgetArgs");
//! module.exports = function render(data, out) {
//!   ...
//! };
//! ```
//!
//! Statements inserted before/after an element by the transform are printed
//! around the element's output in the order the element holds them, so the
//! init/cleanup brackets of nested elements stay nested.

use crate::ast::{ElementNode, LoopNode, TemplateNode};
use crate::context::CompileContext;
use crate::js::{quote, Expr, Stmt};
use crate::parse::is_void_element;

const MARKO_HELPERS_MODULE: &str = "marko/runtime/html/helpers";

struct ModuleWriter<'a> {
    ctx: &'a mut CompileContext,
    code: String,
    indent: usize,
    /// Static markup not yet flushed into an `out.w(...)` call.
    pending_html: String,
}

impl<'a> ModuleWriter<'a> {
    fn new(ctx: &'a mut CompileContext) -> Self {
        ModuleWriter {
            ctx,
            code: String::new(),
            indent: 1,
            pending_html: String::new(),
        }
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.code.push_str("  ");
        }
        self.code.push_str(text);
        self.code.push('\n');
    }

    fn stmt(&mut self, stmt: &Stmt) {
        self.flush();
        self.line(&stmt.to_string());
    }

    fn html(&mut self, markup: &str) {
        self.pending_html.push_str(markup);
    }

    fn flush(&mut self) {
        if self.pending_html.is_empty() {
            return;
        }
        let markup = std::mem::take(&mut self.pending_html);
        self.line(&format!("out.w({});", quote(&markup)));
    }

    fn helpers(&mut self) -> Expr {
        self.ctx.import_module("__markoHelpers", MARKO_HELPERS_MODULE)
    }

    fn write_nodes(&mut self, nodes: &[TemplateNode]) {
        for node in nodes {
            self.write_node(node);
        }
    }

    fn write_node(&mut self, node: &TemplateNode) {
        match node {
            TemplateNode::Element(el) => self.write_element(el),
            TemplateNode::Text(text) => self.html(&escape_xml(&text.value)),
            TemplateNode::Expression(e) => {
                let escaped = self.helpers().member("x").call(vec![e.expression.clone()]);
                self.stmt(&Stmt::expr(Expr::out().member("w").call(vec![escaped])));
            }
            TemplateNode::Loop(lp) => self.write_loop(lp),
            TemplateNode::Code(code) => self.stmt(&code.code),
        }
    }

    fn write_element(&mut self, el: &ElementNode) {
        for stmt in &el.before {
            self.stmt(stmt);
        }

        if let Some(binding) = &el.widget {
            self.flush();
            self.line(&format!(
                "{}(out, {}, function (widget) {{",
                binding.helper, binding.widget_type
            ));
            self.indent += 1;
        }

        self.html(&format!("<{}", el.tag));
        for attr in &el.attributes {
            match &attr.value {
                None => self.html(&format!(" {}", attr.name)),
                Some(Expr::Str(value)) => {
                    self.html(&format!(" {}=\"{}\"", attr.name, escape_xml_attr(value)))
                }
                Some(value) => {
                    let call = self
                        .helpers()
                        .member("a")
                        .call(vec![Expr::str(&attr.name), value.clone()]);
                    self.stmt(&Stmt::expr(Expr::out().member("w").call(vec![call])));
                }
            }
        }
        self.html(">");

        if !is_void_element(&el.tag) {
            self.write_nodes(&el.children);
            self.html(&format!("</{}>", el.tag));
        }

        if el.widget.is_some() {
            self.flush();
            self.indent -= 1;
            self.line("});");
        }

        for stmt in &el.after {
            self.stmt(stmt);
        }
    }

    fn write_loop(&mut self, lp: &LoopNode) {
        self.flush();
        let source = match &lp.source {
            Expr::Raw(code) => format!("({})", code),
            other => other.to_string(),
        };
        self.line(&format!("({} || []).forEach(function ({}) {{", source, lp.item));
        self.indent += 1;
        self.write_nodes(&lp.body);
        self.flush();
        self.indent -= 1;
        self.line("});");
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_xml_attr(s: &str) -> String {
    escape_xml(s).replace('"', "&#34;")
}

/// Generate the render module for a transformed template.
///
/// The body is printed first because printing may still declare static
/// variables (the markup helpers) on the context.
pub fn generate_module(nodes: &[TemplateNode], ctx: &mut CompileContext) -> String {
    let body = {
        let mut writer = ModuleWriter::new(ctx);
        writer.write_nodes(nodes);
        writer.flush();
        writer.code
    };

    let mut module = String::from("\"use strict\";\n");
    for var in ctx.static_vars() {
        module.push_str(&format!("var {} = {};\n", var.name, var.code));
    }
    module.push_str("module.exports = function render(data, out) {\n");
    module.push_str(&body);
    module.push_str("};\n");
    module
}
