//! Template parser.
//!
//! Turns template source (HTML with `${expr}` placeholders, `<for each>` loops
//! and custom tags) into the node tree the widgets transform walks. Parsing is
//! done by html5ever after expressions have been swapped for placeholders.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use lazy_static::lazy_static;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use oxc_allocator::Allocator;
use oxc_parser::Parser;
use oxc_span::SourceType;
use regex::Regex;

use crate::ast::{Attribute, ElementNode, ExpressionNode, LoopNode, SourceLocation, TemplateNode, TextNode};
use crate::error::{CompileError, Error, Result, ERR_EXPR_SYNTAX, ERR_PARSE};
use crate::js::Expr;
use crate::options::CompileOptions;

lazy_static! {
    /// Expression placeholder pattern for normalization
    static ref EXPR_PLACEHOLDER_RE: Regex = Regex::new(r"__W_EXPR_(\d+)__").unwrap();

    static ref SELF_CLOSING_RE: Regex =
        Regex::new(r"<([A-Za-z][A-Za-z0-9-]*)((?:\s[^<>]*?)?)\s*/>").unwrap();

    static ref LOOP_OPEN_RE: Regex = Regex::new(r"<for(\s|>)").unwrap();
    static ref LOOP_CLOSE_RE: Regex = Regex::new(r"</for\s*>").unwrap();

    /// `item in items`
    static ref LOOP_EACH_RE: Regex =
        Regex::new(r"^\s*([A-Za-z_$][A-Za-z0-9_$]*)\s+in\s+(.+?)\s*$").unwrap();
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Result of parsing one template.
#[derive(Debug, Clone)]
pub struct ParsedTemplate {
    pub nodes: Vec<TemplateNode>,
    /// Recoverable problems (bad expressions, malformed loops).
    pub errors: Vec<CompileError>,
}

/// An expression lifted out of the source before HTML parsing.
#[derive(Debug, Clone)]
struct SourceExpression {
    code: String,
    location: SourceLocation,
}

// ═══════════════════════════════════════════════════════════════════════════════
// EXPRESSION NORMALIZATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Find the end of a balanced brace expression, handling strings and template literals.
/// Returns the index after the closing brace, or None if unbalanced.
fn find_balanced_brace_end(chars: &[char], start_index: usize) -> Option<usize> {
    let mut depth = 0;
    let mut i = start_index;
    let mut in_string: Option<char> = None;
    let mut in_template_literal = false;
    let mut template_brace_depth = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\\' && i + 1 < chars.len() {
            i += 2;
            continue;
        }

        if in_string.is_some() {
            if Some(c) == in_string {
                in_string = None;
            }
            i += 1;
            continue;
        }

        if in_template_literal {
            if c == '`' && template_brace_depth == 0 {
                in_template_literal = false;
            } else if c == '$' && i + 1 < chars.len() && chars[i + 1] == '{' {
                template_brace_depth += 1;
                i += 2;
                continue;
            } else if c == '}' && template_brace_depth > 0 {
                template_brace_depth -= 1;
            }
            i += 1;
            continue;
        }

        if c == '"' || c == '\'' {
            in_string = Some(c);
            i += 1;
            continue;
        }

        if c == '`' {
            in_template_literal = true;
            i += 1;
            continue;
        }

        if c == '{' {
            depth += 1;
        } else if c == '}' {
            depth -= 1;
            if depth == 0 {
                return Some(i + 1);
            }
        }

        i += 1;
    }

    None
}

/// Replace every `${...}` with a `__W_EXPR_n__` placeholder so html5ever sees
/// plain text. Unbalanced placeholders are left untouched.
fn normalize_expressions(source: &str) -> (String, Vec<SourceExpression>) {
    let chars: Vec<char> = source.chars().collect();
    let mut normalized = String::with_capacity(source.len());
    let mut expressions = Vec::new();
    let mut line = 1;
    let mut column = 1;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '$' && chars.get(i + 1) == Some(&'{') {
            if let Some(end) = find_balanced_brace_end(&chars, i + 1) {
                let code: String = chars[i + 2..end - 1].iter().collect();
                normalized.push_str(&format!("__W_EXPR_{}__", expressions.len()));
                expressions.push(SourceExpression {
                    code: code.trim().to_string(),
                    location: SourceLocation { line, column },
                });
                for skipped in &chars[i..end] {
                    advance(*skipped, &mut line, &mut column);
                }
                i = end;
                continue;
            }
        }

        normalized.push(c);
        advance(c, &mut line, &mut column);
        i += 1;
    }

    (normalized, expressions)
}

fn advance(c: char, line: &mut u32, column: &mut u32) {
    if c == '\n' {
        *line += 1;
        *column = 1;
    } else {
        *column += 1;
    }
}

/// html5ever treats `<app-button />` as an open tag, which would swallow the
/// following siblings. Expand self-closing non-void tags to open/close pairs.
fn convert_self_closing_tags(html: &str) -> String {
    SELF_CLOSING_RE
        .replace_all(html, |caps: &regex::Captures| {
            let tag = &caps[1];
            if is_void_element(&tag.to_lowercase()) {
                caps[0].to_string()
            } else {
                format!("<{}{}></{}>", tag, &caps[2], tag)
            }
        })
        .to_string()
}

/// html5ever moves unknown elements out of table contexts. `<template>` is
/// kept wherever it appears, so loops are parsed as marked templates.
const LOOP_MARKER: &str = "data-w-loop";

fn convert_loop_tags(html: &str) -> String {
    let opened = LOOP_OPEN_RE.replace_all(html, format!("<template {}${{1}}", LOOP_MARKER).as_str());
    LOOP_CLOSE_RE.replace_all(&opened, "</template>").to_string()
}

// ═══════════════════════════════════════════════════════════════════════════════
// NODE CONVERSION
// ═══════════════════════════════════════════════════════════════════════════════

struct TemplateParser<'a> {
    options: &'a CompileOptions,
    expressions: Vec<SourceExpression>,
    errors: Vec<CompileError>,
}

impl<'a> TemplateParser<'a> {
    fn expression(&self, index: usize) -> Option<&SourceExpression> {
        self.expressions.get(index)
    }

    /// Split text around placeholders. `None` entries in the result are
    /// literal text, `Some` entries are expression indices.
    fn split_placeholders(text: &str) -> Vec<(Option<usize>, String)> {
        let mut parts = Vec::new();
        let mut last_end = 0;

        for caps in EXPR_PLACEHOLDER_RE.captures_iter(text) {
            let (whole, index) = match (caps.get(0), caps[1].parse::<usize>()) {
                (Some(whole), Ok(index)) => (whole, index),
                _ => continue,
            };
            if whole.start() > last_end {
                parts.push((None, text[last_end..whole.start()].to_string()));
            }
            parts.push((Some(index), whole.as_str().to_string()));
            last_end = whole.end();
        }

        if last_end < text.len() {
            parts.push((None, text[last_end..].to_string()));
        }

        parts
    }

    /// Put the original source back in place of every placeholder.
    fn restore(&self, text: &str) -> String {
        EXPR_PLACEHOLDER_RE
            .replace_all(text, |caps: &regex::Captures| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| self.expression(i))
                    .map(|e| format!("${{{}}}", e.code))
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .to_string()
    }

    fn attribute_value(&self, value: &str) -> Option<Expr> {
        if value.is_empty() {
            return None;
        }

        let mut parts: Vec<Expr> = Self::split_placeholders(value)
            .into_iter()
            .map(|(index, text)| match index.and_then(|i| self.expression(i)) {
                Some(expression) => Expr::raw(&expression.code),
                None => Expr::Str(text),
            })
            .collect();

        if parts.len() == 1 {
            parts.pop()
        } else {
            Some(Expr::Concat(parts))
        }
    }

    fn convert_text(&self, text: &str) -> Vec<TemplateNode> {
        let mut nodes = Vec::new();
        for (index, part) in Self::split_placeholders(text) {
            match index.and_then(|i| self.expression(i)) {
                Some(expression) => nodes.push(TemplateNode::Expression(ExpressionNode {
                    expression: Expr::raw(&expression.code),
                    location: expression.location,
                })),
                None if !part.trim().is_empty() => nodes.push(TemplateNode::Text(TextNode {
                    value: part,
                    location: SourceLocation::default(),
                })),
                None => {}
            }
        }
        nodes
    }

    fn convert_children(&mut self, handle: &Handle) -> Vec<TemplateNode> {
        let mut nodes = Vec::new();
        for child in handle.children.borrow().iter() {
            nodes.extend(self.convert_node(child));
        }
        nodes
    }

    fn convert_node(&mut self, handle: &Handle) -> Vec<TemplateNode> {
        match &handle.data {
            NodeData::Text { contents } => {
                let text = contents.borrow().to_string();
                self.convert_text(&text)
            }

            NodeData::Element {
                name,
                attrs,
                template_contents,
                ..
            } => {
                let tag = name.local.to_string();
                let attributes: Vec<(String, String)> = attrs
                    .borrow()
                    .iter()
                    .map(|a| (a.name.local.to_string(), a.value.to_string()))
                    .collect();

                // Template children live in a separate fragment.
                let content = template_contents
                    .borrow()
                    .as_ref()
                    .cloned()
                    .unwrap_or_else(|| handle.clone());

                if tag == "template" && attributes.iter().any(|(name, _)| name == LOOP_MARKER) {
                    return self.convert_loop(&content, &attributes).into_iter().collect();
                }

                let mut element = ElementNode::new(&tag);
                element.custom_tag = self.options.is_custom_tag(&tag);
                for (name, value) in &attributes {
                    element.attributes.push(Attribute {
                        name: name.clone(),
                        value: self.attribute_value(value),
                    });
                }
                element.children = self.convert_children(&content);

                vec![TemplateNode::Element(element)]
            }

            NodeData::Document => self.convert_children(handle),

            NodeData::Comment { .. }
            | NodeData::Doctype { .. }
            | NodeData::ProcessingInstruction { .. } => vec![],
        }
    }

    fn convert_loop(&mut self, handle: &Handle, attributes: &[(String, String)]) -> Option<TemplateNode> {
        let each = attributes
            .iter()
            .find(|(name, _)| name == "each")
            .map(|(_, value)| self.restore(value))
            .unwrap_or_default();

        let Some(caps) = LOOP_EACH_RE.captures(&each) else {
            self.errors.push(CompileError::new(
                ERR_PARSE,
                &format!("Invalid <for> loop: expected each=\"item in items\", found \"{}\"", each),
                &self.options.file_path,
                &SourceLocation::default(),
            ));
            return None;
        };

        let item = caps[1].to_string();
        let mut source = caps[2].trim().to_string();
        // `each="item in ${data.items}"`
        if let Some(inner) = source.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
            source = inner.trim().to_string();
        }
        self.check_expression(&source, SourceLocation::default());

        Some(TemplateNode::Loop(LoopNode {
            item,
            source: Expr::raw(&source),
            body: self.convert_children(handle),
            location: SourceLocation::default(),
        }))
    }

    fn check_expression(&mut self, code: &str, location: SourceLocation) {
        if let Err(message) = validate_expression(code) {
            self.errors.push(CompileError::new(
                ERR_EXPR_SYNTAX,
                &message,
                &self.options.file_path,
                &location,
            ));
        }
    }

    /// Collect the nodes under the document, flattening the html/head/body
    /// wrappers html5ever adds when the source had none.
    fn collect_body_content(&mut self, handle: &Handle, keep_wrappers: bool, nodes: &mut Vec<TemplateNode>) {
        match &handle.data {
            NodeData::Document => {
                for child in handle.children.borrow().iter() {
                    self.collect_body_content(child, keep_wrappers, nodes);
                }
            }
            NodeData::Element { name, .. } => {
                let tag = name.local.to_string();
                let is_wrapper = tag == "html" || tag == "head" || tag == "body";
                if (is_wrapper && !keep_wrappers) || tag == "html" {
                    for child in handle.children.borrow().iter() {
                        self.collect_body_content(child, keep_wrappers, nodes);
                    }
                } else {
                    nodes.extend(self.convert_node(handle));
                }
            }
            NodeData::Text { .. } => nodes.extend(self.convert_node(handle)),
            _ => {}
        }
    }
}

/// Syntax-check a template expression.
pub fn validate_expression(code: &str) -> std::result::Result<(), String> {
    let allocator = Allocator::default();
    let source_type = SourceType::default().with_module(true);

    match Parser::new(&allocator, code, source_type).parse_expression() {
        Ok(_) => Ok(()),
        Err(errors) => Err(format!("Invalid expression syntax `{}`: {:?}", code, errors)),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// MAIN PARSING FUNCTION
// ═══════════════════════════════════════════════════════════════════════════════

/// Parse template source into a node tree.
pub fn parse_template(source: &str, options: &CompileOptions) -> Result<ParsedTemplate> {
    let (normalized, expressions) = normalize_expressions(source);
    let html = convert_loop_tags(&convert_self_closing_tags(&normalized));

    let dom = parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut html.as_bytes())
        .map_err(|e| Error::Parse {
            file: options.file_path.clone(),
            message: e.to_string(),
        })?;

    let mut parser = TemplateParser {
        options,
        expressions,
        errors: vec![],
    };

    let checks: Vec<(String, SourceLocation)> = parser
        .expressions
        .iter()
        .map(|e| (e.code.clone(), e.location))
        .collect();
    for (code, location) in checks {
        parser.check_expression(&code, location);
    }

    let keep_wrappers = source.to_lowercase().contains("<html");
    let mut nodes = Vec::new();
    parser.collect_body_content(&dom.document, keep_wrappers, &mut nodes);

    tracing::debug!(
        file = %options.file_path,
        nodes = nodes.len(),
        expressions = parser.expressions.len(),
        "parsed template"
    );

    Ok(ParsedTemplate {
        nodes,
        errors: parser.errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> ParsedTemplate {
        parse_template(source, &CompileOptions::for_file("/app/components/x/template.marko")).unwrap()
    }

    fn element(node: &TemplateNode) -> &ElementNode {
        match node {
            TemplateNode::Element(el) => el,
            other => panic!("expected element, found {:?}", other),
        }
    }

    #[test]
    fn test_find_balanced_brace() {
        let chars: Vec<char> = "{a + b}".chars().collect();
        assert_eq!(find_balanced_brace_end(&chars, 0), Some(7));
        let chars: Vec<char> = "{'string with { brace'}".chars().collect();
        assert_eq!(find_balanced_brace_end(&chars, 0), Some(23));
        let chars: Vec<char> = "{ {a: 1} }".chars().collect();
        assert_eq!(find_balanced_brace_end(&chars, 0), Some(10));
    }

    #[test]
    fn test_normalize_expressions_tracks_locations() {
        let (normalized, exprs) = normalize_expressions("<p>\n  ${data.name}</p>");
        assert_eq!(normalized, "<p>\n  __W_EXPR_0__</p>");
        assert_eq!(exprs[0].code, "data.name");
        assert_eq!(exprs[0].location, SourceLocation { line: 2, column: 3 });
    }

    #[test]
    fn test_convert_self_closing() {
        assert_eq!(
            convert_self_closing_tags(r#"<app-button label="x"/>"#),
            r#"<app-button label="x"></app-button>"#
        );
        assert_eq!(convert_self_closing_tags("<br/>"), "<br/>");
    }

    #[test]
    fn test_parse_attributes() {
        let parsed = parse(r#"<div w-bind class="a ${data.b}" title="${data.t}" w-body></div>"#);
        assert!(parsed.errors.is_empty());
        let div = element(&parsed.nodes[0]);
        assert_eq!(div.tag, "div");
        assert!(!div.custom_tag);

        let values: Vec<Option<String>> = div
            .attributes
            .iter()
            .map(|a| a.value.as_ref().map(|v| v.to_string()))
            .collect();
        assert_eq!(
            values,
            vec![
                None,
                Some(r#""a " + (data.b)"#.to_string()),
                Some("data.t".to_string()),
                None,
            ]
        );
    }

    #[test]
    fn test_parse_text_and_expressions() {
        let parsed = parse("<p>Hello ${data.name}!</p>");
        let p = element(&parsed.nodes[0]);
        assert_eq!(p.children.len(), 3);
        assert!(matches!(&p.children[0], TemplateNode::Text(t) if t.value == "Hello "));
        assert!(
            matches!(&p.children[1], TemplateNode::Expression(e) if e.expression == Expr::raw("data.name"))
        );
    }

    #[test]
    fn test_parse_loop() {
        let parsed = parse(r#"<ul><for each="item in data.items"><li>${item}</li></for></ul>"#);
        let ul = element(&parsed.nodes[0]);
        match &ul.children[0] {
            TemplateNode::Loop(lp) => {
                assert_eq!(lp.item, "item");
                assert_eq!(lp.source, Expr::raw("data.items"));
                assert_eq!(lp.body.len(), 1);
            }
            other => panic!("expected loop, found {:?}", other),
        }
    }

    #[test]
    fn test_loop_inside_table_keeps_rows() {
        let parsed = parse(r#"<table><for each="r in data.rows"><tr><td>${r}</td></tr></for></table>"#);
        assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
        assert_eq!(parsed.nodes.len(), 1);
        let table = element(&parsed.nodes[0]);
        assert_eq!(table.tag, "table");
        match &table.children[0] {
            TemplateNode::Loop(lp) => {
                assert_eq!(lp.item, "r");
                assert_eq!(element(&lp.body[0]).tag, "tr");
            }
            other => panic!("expected loop, found {:?}", other),
        }
    }

    #[test]
    fn test_loop_tags_leave_form_alone() {
        assert_eq!(
            convert_loop_tags(r#"<form><for each="x in y"></for ></form>"#),
            r#"<form><template data-w-loop each="x in y"></template></form>"#
        );
    }

    #[test]
    fn test_self_closing_tag_with_comparison_expression() {
        let parsed = parse(r#"<div><app-x label="${a > b}"/><p>next</p></div>"#);
        assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
        let div = element(&parsed.nodes[0]);
        let tags: Vec<&str> = div.children.iter().map(|n| element(n).tag.as_str()).collect();
        assert_eq!(tags, vec!["app-x", "p"]);
        assert!(element(&div.children[0]).children.is_empty());
    }

    #[test]
    fn test_malformed_loop_is_reported() {
        let parsed = parse(r#"<for each="items"><li></li></for>"#);
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].code, ERR_PARSE);
    }

    #[test]
    fn test_custom_tags() {
        let options = CompileOptions {
            custom_tags: vec!["include".to_string()],
            ..Default::default()
        };
        let parsed = parse_template("<app-button/><include/><span></span>", &options).unwrap();
        let tags: Vec<(String, bool)> = parsed
            .nodes
            .iter()
            .map(|n| {
                let el = element(n);
                (el.tag.clone(), el.custom_tag)
            })
            .collect();
        assert_eq!(
            tags,
            vec![
                ("app-button".to_string(), true),
                ("include".to_string(), true),
                ("span".to_string(), false),
            ]
        );
    }

    #[test]
    fn test_invalid_expression_is_reported() {
        let parsed = parse("<p>${data.}</p>");
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].code, ERR_EXPR_SYNTAX);
        assert_eq!(parsed.errors[0].line, 1);
        assert_eq!(parsed.errors[0].column, 4);
    }

    #[test]
    fn test_top_level_text_is_kept() {
        let parsed = parse("Hello ${data.name}");
        assert_eq!(parsed.nodes.len(), 2);
        assert!(matches!(&parsed.nodes[0], TemplateNode::Text(t) if t.value == "Hello "));
    }

    #[test]
    fn test_wrappers_flattened_unless_in_source() {
        let parsed = parse("<div></div>");
        assert_eq!(parsed.nodes.len(), 1);
        assert_eq!(element(&parsed.nodes[0]).tag, "div");

        let parsed = parse("<html><body><div></div></body></html>");
        let tags: Vec<&str> = parsed.nodes.iter().map(|n| element(n).tag.as_str()).collect();
        assert_eq!(tags, vec!["head", "body"]);
    }
}
