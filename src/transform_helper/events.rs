use crate::error::ERR_BIND_SCOPE;
use crate::host::HostNode;
use crate::js::Expr;

use super::TransformHelper;

const EVENT_ATTR_PREFIX: &str = "w-on";

impl<'a, N: HostNode + ?Sized> TransformHelper<'a, N> {
    /// `w-on<event>="handlerMethod"`.
    ///
    /// On custom tags these become custom events of the nested widget; on
    /// plain elements they become delegated DOM events of the containing widget.
    pub fn handle_widget_events(&mut self) {
        let event_attrs: Vec<String> = self
            .el
            .attribute_names()
            .into_iter()
            .filter(|name| name.len() > EVENT_ATTR_PREFIX.len() && name.starts_with(EVENT_ATTR_PREFIX))
            .collect();

        if event_attrs.is_empty() {
            return;
        }

        if self.containing_widget().is_none() {
            self.add_error(
                ERR_BIND_SCOPE,
                &format!("{} can only be used within the scope of w-bind", event_attrs[0]),
            );
            return;
        }

        let is_custom_tag = self.el.is_custom_tag();
        let mut has_custom_events = false;

        for attr_name in event_attrs {
            let event_type = attr_name[EVENT_ATTR_PREFIX.len()..]
                .trim_start_matches('-')
                .to_lowercase();
            let target_method = match self.el.remove_attribute(&attr_name).and_then(|a| a.value) {
                Some(method) => method,
                None => continue,
            };

            if is_custom_tag {
                self.widget_args().add_custom_event(&event_type, target_method);
                has_custom_events = true;
            } else {
                let value = Expr::Concat(vec![
                    target_method,
                    Expr::str("|"),
                    Expr::ident("widget").member("id"),
                ]);
                self.el
                    .set_attribute_value(&format!("data-w-on{}", event_type), value);
                if let Some(frame) = self.containing_widget_mut() {
                    frame.has_dom_events = true;
                }
            }
        }

        if has_custom_events {
            // The nested widget needs a scoped id so the events can be routed back.
            let nested = self.nested_id_expression();
            self.widget_args().set_id(nested);
        }
    }
}
