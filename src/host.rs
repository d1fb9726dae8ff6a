//! Capabilities the widget transforms need from a template AST node.
//!
//! The transforms only ever talk to nodes through this trait so that any host
//! tree can be rewritten; `ElementNode` is the implementation used by this crate.

use crate::ast::{Attribute, SourceLocation, WidgetBinding};
use crate::js::{Expr, Stmt};

pub trait HostNode {
    fn tag_name(&self) -> &str;

    fn location(&self) -> &SourceLocation;

    fn has_attribute(&self, name: &str) -> bool;

    /// Value of an attribute. `None` both when the attribute is missing and when
    /// it is present without a value; use `has_attribute` to tell them apart.
    fn attribute_value(&self, name: &str) -> Option<&Expr>;

    fn set_attribute_value(&mut self, name: &str, value: Expr);

    fn remove_attribute(&mut self, name: &str) -> Option<Attribute>;

    fn attribute_names(&self) -> Vec<String>;

    /// Emit `code` before this node. Successive calls land closer to the node.
    fn insert_before(&mut self, code: Stmt);

    /// Emit `code` after this node. Successive calls land closer to the node,
    /// so a before/after pair inserted later nests inside an earlier pair.
    fn insert_after(&mut self, code: Stmt);

    /// Emit `code` after the node's existing children.
    fn append_child(&mut self, code: Stmt);

    /// Render this node inside a widget instance.
    fn bind_widget(&mut self, binding: WidgetBinding);

    /// Custom tags render another template; widget ids reach them through the
    /// widget args instead of an `id` attribute.
    fn is_custom_tag(&self) -> bool {
        self.tag_name().contains('-')
    }
}
