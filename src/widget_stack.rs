use crate::ast::SourceLocation;
use crate::js::Expr;

/// One widget-bound element enclosing the nodes currently being transformed.
///
/// Descendants cannot mutate the bound element directly while the walk is
/// inside it, so attribute writes land on the frame and are applied to the
/// element when the frame is popped.
#[derive(Debug, Clone)]
pub struct WidgetFrame {
    pub tag: String,
    pub location: SourceLocation,
    pub widget_type: Expr,
    pub has_dom_events: bool,
    attributes: Vec<(String, Expr)>,
}

impl WidgetFrame {
    pub fn new(tag: &str, location: SourceLocation, widget_type: Expr) -> Self {
        WidgetFrame {
            tag: tag.to_string(),
            location,
            widget_type,
            has_dom_events: false,
            attributes: vec![],
        }
    }

    pub fn set_attribute_value(&mut self, name: &str, value: Expr) {
        match self.attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    pub fn attribute_value(&self, name: &str) -> Option<&Expr> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn into_attributes(self) -> Vec<(String, Expr)> {
        self.attributes
    }
}

/// Containing-widget stack for one compile unit.
///
/// Push on entering a bound element, pop on leaving it. Every push must be
/// paired with exactly one pop; the top frame is the nearest enclosing widget.
#[derive(Debug, Default)]
pub struct WidgetStack {
    frames: Vec<WidgetFrame>,
}

impl WidgetStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: WidgetFrame) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<WidgetFrame> {
        debug_assert!(!self.frames.is_empty(), "widget stack pop without push");
        self.frames.pop()
    }

    pub fn current(&self) -> Option<&WidgetFrame> {
        self.frames.last()
    }

    pub fn current_mut(&mut self) -> Option<&mut WidgetFrame> {
        self.frames.last_mut()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
