//! Render-time widget registry.
//!
//! While a page renders, every widget instance is recorded as a
//! [`RenderedWidget`]. Records form a tree: a widget begun while another is
//! open becomes that widget's child. The tree is later flattened by
//! [`collect_widgets`](crate::collect::collect_widgets).

use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::out::OutputStream;

/// One widget instance produced by a render pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedWidget {
    pub id: String,
    /// Client-side widget type name, written as `data-widget`.
    pub widget_type: Option<String>,
    pub children: Vec<RenderedWidget>,
    pub state: Option<Map<String, Value>>,
    pub config: Option<Map<String, Value>>,
    /// Id of the widget that receives this widget's custom events.
    pub scope: Option<String>,
    /// `(event type, target method)` pairs.
    pub custom_events: Vec<(String, String)>,
    pub extend: Vec<String>,
    /// `Some("")` marks the widget root itself as the body element.
    pub body_el_id: Option<String>,
    pub dom_events: Vec<String>,
    pub has_dom_events: bool,
    repeated: HashMap<String, u64>,
}

impl RenderedWidget {
    pub fn new(id: &str) -> Self {
        RenderedWidget {
            id: id.to_string(),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, widget_type: &str) -> Self {
        self.widget_type = Some(widget_type.to_string());
        self
    }

    pub fn with_state(mut self, state: Map<String, Value>) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_config(mut self, config: Map<String, Value>) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_child(mut self, child: RenderedWidget) -> Self {
        self.children.push(child);
        self
    }

    /// Id of an element nested in this widget.
    ///
    /// A nested id ending in `[]` is repeated: every call yields the next
    /// index for that id, so loop iterations never collide.
    pub fn el_id(&mut self, nested_id: Option<&str>) -> String {
        let Some(nested_id) = nested_id else {
            return self.id.clone();
        };

        match nested_id.strip_suffix("[]") {
            Some(base) => {
                let counter = self.repeated.entry(base.to_string()).or_insert(0);
                let index = *counter;
                *counter += 1;
                format!("{}-{}[{}]", self.id, base, index)
            }
            None => format!("{}-{}", self.id, nested_id),
        }
    }

    /// Attributes written on the widget's root element. `None` values are
    /// boolean attributes. Returns `None` for widgets without a type.
    pub fn attrs(&self) -> Option<Vec<(String, Option<String>)>> {
        let widget_type = self.widget_type.as_ref()?;

        let mut attrs = vec![("data-widget".to_string(), Some(widget_type.clone()))];

        if self.has_dom_events {
            attrs.push(("data-w-on".to_string(), Some("1".to_string())));
        }

        if !self.custom_events.is_empty() {
            let mut parts = vec![self.scope.clone().unwrap_or_default()];
            for (event_type, target_method) in &self.custom_events {
                parts.push(event_type.clone());
                parts.push(target_method.clone());
            }
            attrs.push(("data-w-events".to_string(), Some(parts.join(","))));
        }

        if !self.extend.is_empty() {
            attrs.push(("data-w-extend".to_string(), Some(self.extend.join(","))));
        }

        match self.body_el_id.as_deref() {
            Some("") => attrs.push(("data-w-body".to_string(), None)),
            Some(body_el_id) => {
                attrs.push(("data-w-body".to_string(), Some(body_el_id.to_string())))
            }
            None => {}
        }

        Some(attrs)
    }

    /// Write the hidden element that carries delegated DOM events for the
    /// widget, if it has any.
    pub fn write_dom_events_el<O: OutputStream + ?Sized>(&mut self, out: &mut O) {
        if self.dom_events.is_empty() {
            return;
        }
        let el_id = self.el_id(Some("$on"));
        out.write(&format!(
            "<span id=\"{}\" data-on=\"{}\"></span>",
            el_id,
            self.dom_events.join(",")
        ));
    }
}

/// Widgets rendered during one render pass.
#[derive(Debug, Clone, Default)]
pub struct WidgetsContext {
    roots: Vec<RenderedWidget>,
    open: Vec<RenderedWidget>,
    /// Roots before this index were already written to the page.
    flushed: usize,
}

impl WidgetsContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start rendering a widget. Widgets begun before the matching
    /// `end_widget` become its children.
    pub fn begin_widget(&mut self, widget: RenderedWidget) {
        self.open.push(widget);
    }

    pub fn end_widget(&mut self) {
        let widget = self.open.pop();
        debug_assert!(widget.is_some(), "end_widget without begin_widget");
        if let Some(widget) = widget {
            self.add_widget(widget);
        }
    }

    /// Record a fully built widget under the currently open widget, or as a
    /// root when none is open.
    pub fn add_widget(&mut self, widget: RenderedWidget) {
        match self.open.last_mut() {
            Some(parent) => parent.children.push(widget),
            None => self.roots.push(widget),
        }
    }

    pub fn current_widget(&mut self) -> Option<&mut RenderedWidget> {
        self.open.last_mut()
    }

    pub fn roots(&self) -> &[RenderedWidget] {
        &self.roots
    }

    /// Roots not yet written to the page.
    pub fn pending_roots(&self) -> &[RenderedWidget] {
        &self.roots[self.flushed..]
    }

    pub fn mark_flushed(&mut self) {
        self.flushed = self.roots.len();
    }
}

/// The widgets context of a render pass, created on first use.
pub fn get_widgets_context<O: OutputStream + ?Sized>(out: &mut O) -> &mut WidgetsContext {
    out.global_mut().widgets.get_or_insert_with(WidgetsContext::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::out::RenderOutput;

    #[test]
    fn test_el_id_nested_and_repeated() {
        let mut widget = RenderedWidget::new("w0");
        assert_eq!(widget.el_id(None), "w0");
        assert_eq!(widget.el_id(Some("title")), "w0-title");
        assert_eq!(widget.el_id(Some("3[]")), "w0-3[0]");
        assert_eq!(widget.el_id(Some("3[]")), "w0-3[1]");
        assert_eq!(widget.el_id(Some("4[]")), "w0-4[0]");
    }

    #[test]
    fn test_attrs() {
        assert!(RenderedWidget::new("w0").attrs().is_none());

        let mut widget = RenderedWidget::new("w1").with_type("/app/button");
        widget.has_dom_events = true;
        widget.scope = Some("w0".to_string());
        widget.custom_events = vec![("click".to_string(), "handleButtonClick".to_string())];
        widget.extend = vec!["w2".to_string()];
        widget.body_el_id = Some(String::new());

        assert_eq!(
            widget.attrs().unwrap(),
            vec![
                ("data-widget".to_string(), Some("/app/button".to_string())),
                ("data-w-on".to_string(), Some("1".to_string())),
                ("data-w-events".to_string(), Some("w0,click,handleButtonClick".to_string())),
                ("data-w-extend".to_string(), Some("w2".to_string())),
                ("data-w-body".to_string(), None),
            ]
        );
    }

    #[test]
    fn test_write_dom_events_el() {
        let mut out = RenderOutput::new();
        let mut widget = RenderedWidget::new("w0");
        widget.write_dom_events_el(&mut out);
        assert_eq!(out.as_str(), "");

        widget.dom_events = vec!["click".to_string(), "handleClick".to_string()];
        widget.write_dom_events_el(&mut out);
        assert_eq!(
            out.as_str(),
            r#"<span id="w0-$on" data-on="click,handleClick"></span>"#
        );
    }

    #[test]
    fn test_begin_end_builds_tree() {
        let mut ctx = WidgetsContext::new();
        ctx.begin_widget(RenderedWidget::new("A"));
        ctx.begin_widget(RenderedWidget::new("B"));
        ctx.end_widget();
        ctx.add_widget(RenderedWidget::new("C"));
        ctx.end_widget();
        ctx.add_widget(RenderedWidget::new("D"));

        let roots = ctx.roots();
        assert_eq!(roots.len(), 2);
        let children: Vec<&str> = roots[0].children.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(children, vec!["B", "C"]);
        assert_eq!(roots[1].id, "D");
    }

    #[test]
    fn test_flushed_roots_are_not_pending() {
        let mut ctx = WidgetsContext::new();
        ctx.add_widget(RenderedWidget::new("A"));
        ctx.mark_flushed();
        ctx.add_widget(RenderedWidget::new("B"));
        let pending: Vec<&str> = ctx.pending_roots().iter().map(|w| w.id.as_str()).collect();
        assert_eq!(pending, vec!["B"]);
        assert_eq!(ctx.roots().len(), 2);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "end_widget without begin_widget")]
    fn test_unbalanced_end_widget() {
        WidgetsContext::new().end_widget();
    }
}
