#[cfg(test)]
mod tests {
    use crate::init_code::{
        get_init_widgets_code, get_rendered_widgets, write_init_widgets_code, WidgetSource,
    };
    use crate::options::InitWidgetsOptions;
    use crate::out::{unique_id, OutputStream, RenderGlobal, RenderOutput};
    use crate::widgets_context::{get_widgets_context, RenderedWidget, WidgetsContext};
    use rstest::rstest;
    use serde_json::{json, Map, Value};

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    /// `A[B, C]` with state on A and config on B.
    fn render_page(out: &mut RenderOutput) {
        let widgets = get_widgets_context(out);
        widgets.begin_widget(RenderedWidget::new("A").with_state(map(json!({"open": true}))));
        widgets.add_widget(RenderedWidget::new("B").with_config(map(json!({"size": 2}))));
        widgets.add_widget(RenderedWidget::new("C"));
        widgets.end_widget();
    }

    fn options(scan_dom: bool, immediate: bool) -> InitWidgetsOptions {
        InitWidgetsOptions {
            scan_dom,
            immediate,
            ..Default::default()
        }
    }

    const STATE: &str = r#"(function(t,s){for(var k in s)t[k]=s[k]})(window.$markoWidgetsState||(window.$markoWidgetsState={}),{"A":{"open":true}});
"#;
    const CONFIG: &str = r#"(function(t,s){for(var k in s)t[k]=s[k]})(window.$markoWidgetsConfig||(window.$markoWidgetsConfig={}),{"B":{"size":2}});
"#;

    #[test]
    fn test_marker_mode() {
        let mut out = RenderOutput::new();
        render_page(&mut out);
        write_init_widgets_code(&mut out, &options(false, false), WidgetSource::Global).unwrap();

        assert_eq!(
            out.as_str(),
            format!(
                "<script>{}{}</script><noscript id=\"markoWidgets\" data-ids=\"B,C,A\"></noscript>",
                STATE, CONFIG
            )
        );
    }

    #[test]
    fn test_immediate_mode_has_single_bootstrap_call() {
        let mut out = RenderOutput::new();
        render_page(&mut out);
        write_init_widgets_code(&mut out, &options(false, true), WidgetSource::Global).unwrap();

        let html = out.as_str();
        assert_eq!(
            html,
            format!("<script>{}{}$markoWidgets(\"B,C,A\")</script>", STATE, CONFIG)
        );
        assert_eq!(html.matches("$markoWidgets(").count(), 1);
        assert!(!html.contains("<noscript"));
    }

    #[rstest]
    #[case(false)]
    #[case(true)]
    fn test_scan_dom_ignores_widgets(#[case] immediate: bool) {
        let mut out = RenderOutput::new();
        render_page(&mut out);
        write_init_widgets_code(&mut out, &options(true, immediate), WidgetSource::Global).unwrap();
        assert_eq!(
            out.as_str(),
            r#"<noscript id="markoWidgets" data-ids="*"></noscript>"#
        );
    }

    #[rstest]
    #[case(false)]
    #[case(true)]
    fn test_no_widgets_writes_nothing(#[case] immediate: bool) {
        let mut out = RenderOutput::new();
        write_init_widgets_code(&mut out, &options(false, immediate), WidgetSource::Global).unwrap();
        assert_eq!(out.as_str(), "");

        get_widgets_context(&mut out);
        write_init_widgets_code(&mut out, &options(false, immediate), WidgetSource::Global).unwrap();
        assert_eq!(out.as_str(), "");
    }

    #[test]
    fn test_stateless_widgets_keep_script_block() {
        let mut out = RenderOutput::with_global(RenderGlobal::new().with_csp_nonce("n1"));
        get_widgets_context(&mut out).add_widget(RenderedWidget::new("w0"));
        write_init_widgets_code(&mut out, &options(false, false), WidgetSource::Global).unwrap();
        assert_eq!(
            out.as_str(),
            r#"<script nonce="n1"></script><noscript id="markoWidgets" data-ids="w0"></noscript>"#
        );
    }

    #[test]
    fn test_csp_nonce_is_quoted() {
        let mut out = RenderOutput::with_global(RenderGlobal::new().with_csp_nonce("r4nd\"om"));
        get_widgets_context(&mut out).add_widget(RenderedWidget::new("w0"));
        write_init_widgets_code(&mut out, &options(false, true), WidgetSource::Global).unwrap();
        assert_eq!(
            out.as_str(),
            r#"<script nonce="r4nd\"om">$markoWidgets("w0")</script>"#
        );
    }

    #[test]
    fn test_explicit_context_source() {
        let mut context = WidgetsContext::new();
        context.add_widget(RenderedWidget::new("x").with_child(RenderedWidget::new("y")));

        let mut out = RenderOutput::new();
        write_init_widgets_code(
            &mut out,
            &options(false, false),
            WidgetSource::Context(&mut context),
        )
        .unwrap();
        assert_eq!(
            out.as_str(),
            r#"<script></script><noscript id="markoWidgets" data-ids="y,x"></noscript>"#
        );
        assert!(context.pending_roots().is_empty());
        assert!(out.global().widgets.is_none());
    }

    #[test]
    fn test_widgets_are_written_once() {
        let mut out = RenderOutput::new();
        render_page(&mut out);
        write_init_widgets_code(&mut out, &options(false, true), WidgetSource::Global).unwrap();
        let first_len = out.as_str().len();

        write_init_widgets_code(&mut out, &options(false, true), WidgetSource::Global).unwrap();
        assert_eq!(out.as_str().len(), first_len);

        get_widgets_context(&mut out).add_widget(RenderedWidget::new("D"));
        write_init_widgets_code(&mut out, &options(false, true), WidgetSource::Global).unwrap();
        assert!(out.as_str().ends_with(r#"<script>$markoWidgets("D")</script>"#));
    }

    #[test]
    fn test_get_init_widgets_code() {
        let mut out = RenderOutput::new();
        render_page(&mut out);
        let code = get_init_widgets_code(&mut out).unwrap();
        assert_eq!(code, format!("{}{}$markoWidgets(\"B,C,A\");", STATE, CONFIG));
    }

    #[test]
    fn test_get_rendered_widgets_snapshot() {
        let mut out = RenderOutput::new();
        render_page(&mut out);
        let rendered = get_rendered_widgets(&mut out).unwrap();

        assert_eq!(
            serde_json::to_value(&rendered).unwrap(),
            json!({
                "ids": "B,C,A",
                "state": {"A": {"open": true}},
                "config": {"B": {"size": 2}}
            })
        );

        let empty = get_rendered_widgets(&mut RenderOutput::new()).unwrap();
        assert_eq!(serde_json::to_string(&empty).unwrap(), r#"{"ids":""}"#);
    }

    #[test]
    #[allow(deprecated)]
    fn test_deprecated_ids_alias() {
        let mut out = RenderOutput::new();
        render_page(&mut out);
        let rendered = crate::get_rendered_widget_ids(&mut out).unwrap();
        assert_eq!(rendered.ids, "B,C,A");
    }

    #[test]
    fn test_render_time_ids_feed_widgets() {
        let mut out = RenderOutput::new();
        let outer = unique_id(&mut out);
        let inner = unique_id(&mut out);
        {
            let widgets = get_widgets_context(&mut out);
            widgets.begin_widget(RenderedWidget::new(&outer));
            widgets.add_widget(RenderedWidget::new(&inner));
            widgets.end_widget();
        }
        let rendered = get_rendered_widgets(&mut out).unwrap();
        assert_eq!(rendered.ids, "w1,w0");
    }
}
