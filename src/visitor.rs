use crate::ast::{ElementNode, ExpressionNode, LoopNode, TemplateNode, TextNode};

/// The single traversal mechanism for template trees.
///
/// Rules:
/// 1. Traversal order is depth-first, children in document order.
/// 2. Implementers override `visit_*` methods to add behavior.
/// 3. Implementers MUST call the matching `walk_*` function to continue
///    traversal unless pruning is intended. Code placed after the `walk_*`
///    call runs once the whole subtree has been visited.
pub trait TemplateVisitor {
    fn visit_children(&mut self, children: &mut Vec<TemplateNode>) {
        walk_children(self, children);
    }

    fn visit_node(&mut self, node: &mut TemplateNode) {
        walk_node(self, node);
    }

    fn visit_element(&mut self, element: &mut ElementNode) {
        walk_element(self, element);
    }

    fn visit_loop(&mut self, node: &mut LoopNode) {
        walk_loop(self, node);
    }

    fn visit_text(&mut self, _text: &mut TextNode) {
        // Leaf node, nothing to walk by default
    }

    fn visit_expression(&mut self, _expression: &mut ExpressionNode) {
        // Leaf node, nothing to walk by default
    }
}

pub fn walk_children<V: TemplateVisitor + ?Sized>(
    visitor: &mut V,
    children: &mut Vec<TemplateNode>,
) {
    for node in children {
        visitor.visit_node(node);
    }
}

pub fn walk_node<V: TemplateVisitor + ?Sized>(visitor: &mut V, node: &mut TemplateNode) {
    match node {
        TemplateNode::Element(el) => visitor.visit_element(el),
        TemplateNode::Loop(lp) => visitor.visit_loop(lp),
        TemplateNode::Text(t) => visitor.visit_text(t),
        TemplateNode::Expression(e) => visitor.visit_expression(e),
        TemplateNode::Code(_) => {} // Generated code is never revisited
    }
}

pub fn walk_element<V: TemplateVisitor + ?Sized>(visitor: &mut V, element: &mut ElementNode) {
    visitor.visit_children(&mut element.children);
}

pub fn walk_loop<V: TemplateVisitor + ?Sized>(visitor: &mut V, node: &mut LoopNode) {
    visitor.visit_children(&mut node.body);
}
