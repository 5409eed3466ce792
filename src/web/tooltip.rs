//! Hover tooltip rendering
//!
//! One renderer per page. Its two closures are created once and attached
//! to every annotation span, so spans never accumulate duplicate handlers.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, MouseEvent};

use crate::config::VocabConfig;
use crate::dom::DEFINITION_ATTRIBUTE;
use crate::ui::{HoverTooltip, Point, TooltipView};
use crate::web::current_viewport;

/// Shared `mouseenter` / `mouseleave` listeners
pub struct HoverHandlers {
    pub enter: Closure<dyn FnMut(MouseEvent)>,
    pub leave: Closure<dyn FnMut(MouseEvent)>,
}

pub struct TooltipRenderer {
    document: Document,
    class: String,
    model: RefCell<HoverTooltip>,
    element: RefCell<Option<Element>>,
}

impl TooltipRenderer {
    pub fn new(document: Document, config: &VocabConfig) -> Rc<Self> {
        Rc::new(Self {
            document,
            class: config.markers.definition_tooltip_class.clone(),
            model: RefCell::new(HoverTooltip::new(config.geometry)),
            element: RefCell::new(None),
        })
    }

    /// Listeners that read the span's definition and show/hide the tooltip
    pub fn handlers(self: &Rc<Self>) -> HoverHandlers {
        let renderer = Rc::clone(self);
        let enter = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            let definition = event
                .current_target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .and_then(|span| span.get_attribute(DEFINITION_ATTRIBUTE))
                .unwrap_or_default();
            let pointer = Point::new(f64::from(event.client_x()), f64::from(event.client_y()));
            if let Err(e) = renderer.show(&definition, pointer) {
                log::warn!("[TooltipRenderer] could not show tooltip: {:?}", e);
            }
        });

        let renderer = Rc::clone(self);
        let leave = Closure::<dyn FnMut(MouseEvent)>::new(move |_event: MouseEvent| {
            renderer.hide();
        });

        HoverHandlers { enter, leave }
    }

    pub fn show(&self, definition: &str, pointer: Point) -> Result<(), JsValue> {
        self.remove_element();
        let view: TooltipView = self
            .model
            .borrow_mut()
            .show(definition, pointer, current_viewport())
            .clone();

        let element = self.document.create_element("div")?;
        element.set_class_name(&self.class);
        element.set_text_content(Some(&view.definition));
        if let Some(html) = element.dyn_ref::<HtmlElement>() {
            let style = html.style();
            style.set_property("left", &format!("{}px", view.position.x))?;
            style.set_property("top", &format!("{}px", view.position.y))?;
        }

        let body = self
            .document
            .body()
            .ok_or_else(|| JsValue::from_str("document has no body"))?;
        body.append_child(&element)?;
        self.element.replace(Some(element));
        Ok(())
    }

    pub fn hide(&self) {
        self.model.borrow_mut().hide();
        self.remove_element();
    }

    fn remove_element(&self) {
        if let Some(element) = self.element.borrow_mut().take() {
            element.remove();
        }
    }
}
