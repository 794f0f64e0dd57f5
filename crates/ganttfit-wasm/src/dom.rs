//! DOM geometry harvesting and layout application.
//!
//! Everything here is best-effort: the widget owns the markup, so any
//! selector can come back empty on a widget version bump. Missing pieces
//! degrade to a no-op that leaves the widget's default rendering intact.

use ganttfit_layout::{ApproxMeasure, Anchor, ChartGeometry, LabelPlacement, Rect, ViewportWindow};
use tracing::debug;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, SvgGraphicsElement, SvgTextContentElement};

use crate::FitError;

/// Class the widget puts on each task's popup content wrapper.
pub const POPUP_WRAPPER_CLASS: &str = "popup-wrapper";

// ===== Access =====

pub fn window() -> Result<web_sys::Window, FitError> {
    web_sys::window().ok_or(FitError::NoDocument)
}

pub fn document() -> Result<Document, FitError> {
    window()?.document().ok_or(FitError::NoDocument)
}

pub fn container(id: &str) -> Result<Element, FitError> {
    document()?
        .get_element_by_id(id)
        .ok_or_else(|| FitError::MissingContainer(id.to_owned()))
}

/// True once the widget has produced at least one task bar.
pub fn bars_present(container_id: &str) -> bool {
    container(container_id)
        .ok()
        .and_then(|c| c.query_selector(".bar-wrapper").ok().flatten())
        .is_some()
}

// ===== Harvesting =====

/// One bar label as found in the rendered SVG.
pub struct BarLabel {
    pub key: String,
    pub text: String,
    pub x: f64,
    pub bar: Rect,
    pub element: SvgTextContentElement,
}

/// Everything a fit pass needs, measured in one sweep.
pub struct Harvest {
    pub geometry: ChartGeometry,
    pub labels: Vec<BarLabel>,
    pub svg: Element,
}

fn bbox(element: &Element) -> Option<Rect> {
    let graphics: &SvgGraphicsElement = element.dyn_ref()?;
    let b = graphics.get_b_box().ok()?;
    Some(Rect::new(
        f64::from(b.x()),
        f64::from(b.y()),
        f64::from(b.width()),
        f64::from(b.height()),
    ))
}

/// Measure the rendered chart inside `container_id`.
///
/// Returns `None` when the svg or the bars are not there, which happens
/// before the first render and after the container is torn down.
pub fn harvest(container_id: &str, column_width: f64) -> Option<Harvest> {
    let root = container(container_id).ok()?;
    let svg = root.query_selector("svg").ok().flatten()?;

    let wrappers = root.query_selector_all(".bar-wrapper").ok()?;
    let mut bars = Vec::with_capacity(wrappers.length() as usize);
    let mut labels = Vec::new();
    let mut label_boxes = Vec::new();
    for i in 0..wrappers.length() {
        let Some(wrapper) = wrappers.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };
        let Some(bar) = wrapper
            .query_selector(".bar")
            .ok()
            .flatten()
            .and_then(|e| bbox(&e))
        else {
            continue;
        };
        bars.push(bar);

        let Some(key) = wrapper.get_attribute("data-id") else {
            continue;
        };
        if let Some(text_el) = wrapper
            .query_selector(".bar-label")
            .ok()
            .flatten()
            .and_then(|e| e.dyn_into::<SvgTextContentElement>().ok())
        {
            let text_box = bbox(&text_el);
            let x = text_el
                .get_attribute("x")
                .and_then(|v| v.parse::<f64>().ok())
                .or_else(|| text_box.map(|r| r.x))
                .unwrap_or(bar.right());
            if let Some(b) = text_box {
                label_boxes.push(b);
            }
            let text = text_el.text_content().unwrap_or_default();
            labels.push(BarLabel {
                key,
                text,
                x,
                bar,
                element: text_el,
            });
        }
    }
    if bars.is_empty() {
        debug!("no bars rendered yet");
        return None;
    }

    let ticks = root.query_selector_all(".lower-text").ok()?;
    let mut tick_xs = Vec::with_capacity(ticks.length() as usize);
    for i in 0..ticks.length() {
        if let Some(r) = ticks
            .item(i)
            .and_then(|n| n.dyn_into::<Element>().ok())
            .and_then(|e| bbox(&e))
        {
            tick_xs.push(r.x);
        }
    }
    tick_xs.sort_by(|a, b| a.total_cmp(b));

    let header_height = root
        .query_selector(".grid-header")
        .ok()
        .flatten()
        .and_then(|e| bbox(&e))
        .map_or(60.0, |r| r.height);
    let content = bbox(&svg).unwrap_or_default();

    Some(Harvest {
        geometry: ChartGeometry {
            bars,
            labels: label_boxes,
            tick_xs,
            content,
            header_height,
            column_width,
        },
        labels,
        svg,
    })
}

// ===== Application =====

/// Crop the svg to `window`. On narrow devices the svg is given a fixed
/// pixel width and an auto height, and the container scrolls horizontally.
pub fn apply_viewport(root: &Element, svg: &Element, window: &ViewportWindow, narrow: bool) {
    if svg.set_attribute("viewBox", &window.view_box()).is_err() {
        debug!("could not set viewBox");
        return;
    }
    if narrow {
        let _ = svg.set_attribute("width", &format!("{:.0}", window.pixel_width));
        let _ = svg.remove_attribute("height");
        if let Some(host) = root.dyn_ref::<HtmlElement>() {
            let style = host.style();
            let _ = style.set_property("overflow-x", "auto");
            let _ = style.set_property("overflow-y", "hidden");
        }
    } else {
        let _ = svg.set_attribute("width", &format!("{:.0}", window.width));
        let _ = svg.set_attribute("height", &format!("{:.0}", window.height));
    }
}

/// Per-label measure scaled from the live text length, falling back to the
/// stock estimate when the element reports nothing.
pub fn label_measure(label: &BarLabel) -> ApproxMeasure {
    let rendered = f64::from(label.element.get_computed_text_length());
    let chars = label.text.chars().count();
    if rendered > 0.0 && chars > 0 {
        ApproxMeasure {
            px_per_char: rendered / chars as f64,
        }
    } else {
        ApproxMeasure::default()
    }
}

pub fn apply_label(label: &BarLabel, placement: &LabelPlacement) {
    label.element.set_text_content(Some(&placement.text));
    let _ = label
        .element
        .set_attribute("x", &format!("{:.2}", placement.x));
    let anchor = match placement.anchor {
        Anchor::Start => "start",
        Anchor::End => "end",
    };
    let _ = label.element.set_attribute("text-anchor", anchor);
}

// ===== Popup wrapper =====

/// Find the widget's popup wrapper, creating one when the widget has not
/// made it yet, so the controller always has an element to move.
pub fn ensure_popup_wrapper(root: &Element, document: &Document) -> Option<HtmlElement> {
    if let Ok(Some(existing)) = root.query_selector(&format!(".{POPUP_WRAPPER_CLASS}")) {
        return existing.dyn_into::<HtmlElement>().ok();
    }
    let wrapper = document.create_element("div").ok()?;
    wrapper.set_class_name(POPUP_WRAPPER_CLASS);
    root.append_child(&wrapper).ok()?;
    let wrapper = wrapper.dyn_into::<HtmlElement>().ok()?;
    let style = wrapper.style();
    let _ = style.set_property("position", "absolute");
    park_popup(&wrapper);
    Some(wrapper)
}

/// Hide the wrapper without destroying its contents.
pub fn park_popup(wrapper: &HtmlElement) {
    let style = wrapper.style();
    let _ = style.set_property("display", "none");
    let _ = style.remove_property("visibility");
}

/// Fill the wrapper and lay it out invisibly so its box can be measured
/// before it is placed.
pub fn stage_popup(wrapper: &HtmlElement, html: &str) {
    wrapper.set_inner_html(html);
    let style = wrapper.style();
    let _ = style.set_property("visibility", "hidden");
    let _ = style.set_property("display", "block");
}

/// Move a staged wrapper into place and make it visible.
pub fn reveal_popup(wrapper: &HtmlElement, x: f64, y: f64) {
    let style = wrapper.style();
    let _ = style.set_property("left", &format!("{x:.0}px"));
    let _ = style.set_property("top", &format!("{y:.0}px"));
    let _ = style.remove_property("visibility");
}

/// `element`'s border box translated into `root`'s coordinate space.
pub fn rect_in(root: &Element, element: &Element) -> Rect {
    let base = root.get_bounding_client_rect();
    let r = element.get_bounding_client_rect();
    Rect::new(
        r.left() - base.left(),
        r.top() - base.top(),
        r.width(),
        r.height(),
    )
}

/// The container's own box in its local space, origin at zero.
pub fn local_rect(root: &Element) -> Rect {
    let r = root.get_bounding_client_rect();
    Rect::new(0.0, 0.0, r.width(), r.height())
}

/// The bar wrapper element for a task, if the widget rendered one.
pub fn bar_for_task(root: &Element, task_id: &str) -> Option<Element> {
    root.query_selector(&format!(".bar-wrapper[data-id=\"{task_id}\"]"))
        .ok()
        .flatten()
}
