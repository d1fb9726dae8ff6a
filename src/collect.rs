//! Render tree collection.
//!
//! Flattens the rendered widget tree into the comma-separated id list the
//! client bootstraps from, children before parents, and gathers state and
//! config keyed by widget id.

use serde_json::{Map, Value};

use crate::widgets_context::RenderedWidget;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectedWidgets {
    pub ids: String,
    pub state: Map<String, Value>,
    pub config: Map<String, Value>,
}

impl CollectedWidgets {
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

struct Collector {
    ids: Vec<String>,
    state: Map<String, Value>,
    config: Map<String, Value>,
}

impl Collector {
    fn add_widgets(&mut self, widgets: &[RenderedWidget]) {
        for widget in widgets {
            self.add_widget(widget);
        }
    }

    fn add_widget(&mut self, widget: &RenderedWidget) {
        // Children initialize before their parent on the client.
        self.add_widgets(&widget.children);

        if let Some(config) = &widget.config {
            self.config.insert(widget.id.clone(), Value::Object(config.clone()));
        }
        if let Some(state) = &widget.state {
            self.state.insert(widget.id.clone(), Value::Object(state.clone()));
        }
        self.ids.push(widget.id.clone());
    }
}

/// Collect ids, state and config from `roots`. The tree is left untouched.
pub fn collect_widgets(roots: &[RenderedWidget]) -> CollectedWidgets {
    let mut collector = Collector {
        ids: vec![],
        state: Map::new(),
        config: Map::new(),
    };
    collector.add_widgets(roots);

    tracing::trace!(
        widgets = collector.ids.len(),
        with_state = collector.state.len(),
        with_config = collector.config.len(),
        "collected rendered widgets"
    );

    CollectedWidgets {
        ids: collector.ids.join(","),
        state: collector.state,
        config: collector.config,
    }
}
