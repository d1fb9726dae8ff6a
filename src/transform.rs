//! Widgets transform over template trees.
//!
//! Walks a parsed template once, depth first, and rewrites every element that
//! carries widget attributes (`w-bind`, `w-id`, `w-on*`, `w-extend`, `w-for`,
//! `w-body`). Widget roots push a frame on the compile unit's widget stack for
//! the duration of their subtree, so descendants can find their containing
//! widget.

use crate::ast::{ElementNode, LoopNode, TemplateNode};
use crate::context::CompileContext;
use crate::transform_helper::{finish_widget_bind, TransformHelper};
use crate::visitor::{walk_element, walk_loop, TemplateVisitor};

pub struct WidgetsTransformer<'a> {
    ctx: &'a mut CompileContext,
    loop_depth: usize,
}

impl<'a> WidgetsTransformer<'a> {
    pub fn new(ctx: &'a mut CompileContext) -> Self {
        WidgetsTransformer { ctx, loop_depth: 0 }
    }
}

impl<'a> TemplateVisitor for WidgetsTransformer<'a> {
    fn visit_element(&mut self, element: &mut ElementNode) {
        let in_loop = self.loop_depth > 0;

        let (bound, widget_args) = {
            let mut helper = TransformHelper::new(&mut *element, &mut *self.ctx, in_loop);
            let bound = helper.handle_widget_bind();
            if !bound {
                helper.handle_widget_id();
            }
            helper.handle_widget_events();
            helper.handle_widget_extend();
            helper.handle_widget_for();
            helper.handle_widget_body();
            (bound, helper.into_widget_args())
        };

        walk_element(self, element);

        if let Some(args) = widget_args {
            args.compile(&mut *element, &mut *self.ctx);
        }

        if bound {
            if let Some(frame) = self.ctx.widget_stack.pop() {
                finish_widget_bind(&mut *element, &mut *self.ctx, frame);
            }
        }
    }

    fn visit_loop(&mut self, node: &mut LoopNode) {
        self.loop_depth += 1;
        walk_loop(self, node);
        self.loop_depth -= 1;
    }
}

/// Run the widgets transform over a whole template.
pub fn transform_template(nodes: &mut Vec<TemplateNode>, ctx: &mut CompileContext) {
    let mut transformer = WidgetsTransformer::new(ctx);
    transformer.visit_children(nodes);
    debug_assert!(
        transformer.ctx.widget_stack.is_empty(),
        "widget stack not empty after transform"
    );
}
