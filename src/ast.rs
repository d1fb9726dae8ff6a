use serde::{Deserialize, Serialize};

use crate::host::HostNode;
use crate::js::{Expr, Stmt};

// ═══════════════════════════════════════════════════════════════════════════════
// TEMPLATE TREE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

impl Default for SourceLocation {
    fn default() -> Self {
        SourceLocation { line: 1, column: 1 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    pub name: String,
    pub value: Option<Expr>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TemplateNode {
    Element(ElementNode),
    Text(TextNode),
    Expression(ExpressionNode),
    Loop(LoopNode),
    /// Generated code placed among the children of an element.
    Code(CodeNode),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementNode {
    pub tag: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<TemplateNode>,
    #[serde(default)]
    pub location: SourceLocation,
    #[serde(default)]
    pub custom_tag: bool,
    #[serde(default)]
    pub before: Vec<Stmt>,
    #[serde(default)]
    pub after: Vec<Stmt>,
    #[serde(default)]
    pub widget: Option<WidgetBinding>,
}

impl ElementNode {
    pub fn new(tag: &str) -> Self {
        ElementNode {
            tag: tag.to_string(),
            attributes: vec![],
            children: vec![],
            location: SourceLocation::default(),
            custom_tag: tag.contains('-'),
            before: vec![],
            after: vec![],
            widget: None,
        }
    }

    pub fn with_attribute(mut self, name: &str, value: Option<Expr>) -> Self {
        self.attributes.push(Attribute {
            name: name.to_string(),
            value,
        });
        self
    }

    pub fn with_child(mut self, child: TemplateNode) -> Self {
        self.children.push(child);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextNode {
    pub value: String,
    #[serde(default)]
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpressionNode {
    pub expression: Expr,
    #[serde(default)]
    pub location: SourceLocation,
}

/// `<for each="item in items">`: children render once per item, so any widget
/// id assigned below a loop must be computed at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoopNode {
    pub item: String,
    pub source: Expr,
    pub body: Vec<TemplateNode>,
    #[serde(default)]
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeNode {
    pub code: Stmt,
}

/// Wraps an element's output in a widget instance at render time:
/// `helper(out, type, function (widget) { ... })`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetBinding {
    pub helper: Expr,
    pub widget_type: Expr,
}

// ═══════════════════════════════════════════════════════════════════════════════
// HOST NODE IMPLEMENTATION
// ═══════════════════════════════════════════════════════════════════════════════

impl HostNode for ElementNode {
    fn tag_name(&self) -> &str {
        &self.tag
    }

    fn location(&self) -> &SourceLocation {
        &self.location
    }

    fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.name == name)
    }

    fn attribute_value(&self, name: &str) -> Option<&Expr> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .and_then(|a| a.value.as_ref())
    }

    fn set_attribute_value(&mut self, name: &str, value: Expr) {
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(attr) => attr.value = Some(value),
            None => self.attributes.push(Attribute {
                name: name.to_string(),
                value: Some(value),
            }),
        }
    }

    fn remove_attribute(&mut self, name: &str) -> Option<Attribute> {
        let index = self.attributes.iter().position(|a| a.name == name)?;
        Some(self.attributes.remove(index))
    }

    fn attribute_names(&self) -> Vec<String> {
        self.attributes.iter().map(|a| a.name.clone()).collect()
    }

    fn insert_before(&mut self, code: Stmt) {
        self.before.push(code);
    }

    fn insert_after(&mut self, code: Stmt) {
        self.after.insert(0, code);
    }

    fn append_child(&mut self, code: Stmt) {
        self.children.push(TemplateNode::Code(CodeNode { code }));
    }

    fn bind_widget(&mut self, binding: WidgetBinding) {
        self.widget = Some(binding);
    }

    fn is_custom_tag(&self) -> bool {
        self.custom_tag
    }
}
