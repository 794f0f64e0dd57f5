//! Browser adapter for ganttfit schedules.
//!
//! Builds the dated timeline, hands it to the page's pre-loaded
//! frappe-gantt style widget in locked read-only form, then post-processes
//! the rendered SVG: the viewport is cropped to the bars, labels spilling
//! past the cropped edge are clamped, and a custom hover/tap popup takes
//! over from the widget's own.

mod dom;

use std::cell::RefCell;
use std::rc::Rc;

use chrono::NaiveDate;
use ganttfit_core::{
    build_timeline, widget_tasks, ChartOptions, ScheduledTask, TaskDef, Timeline,
};
use ganttfit_layout::{
    fit_viewport, place_popup, FitConfig, LabelFitter, LabelInput, PointerClass, PopupAction,
    PopupController, PopupLayout, ViewportWindow,
};
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Id of the element the chart mounts into.
pub const CONTAINER_ID: &str = "gantt-target";

/// Frames to wait for the widget's first render before giving up.
const RENDER_FRAME_BUDGET: u32 = 30;

// ===== Errors =====

#[derive(Debug, thiserror::Error)]
pub enum FitError {
    #[error("no window or document available")]
    NoDocument,
    #[error("container #{0} not found")]
    MissingContainer(String),
    #[error("chart did not render within the frame budget")]
    RenderTimeout,
    #[error("invalid task payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error(transparent)]
    Schedule(#[from] ganttfit_core::ScheduleError),
}

impl From<FitError> for JsValue {
    fn from(err: FitError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

// ===== Widget bindings =====

#[wasm_bindgen]
extern "C" {
    /// The page-global chart widget class.
    pub type Gantt;

    #[wasm_bindgen(constructor)]
    fn new(selector: &str, tasks: &JsValue, options: &JsValue) -> Gantt;

    #[wasm_bindgen(method)]
    fn get_task(this: &Gantt, task_id: &str) -> JsValue;

    #[wasm_bindgen(method)]
    fn hide_popup(this: &Gantt);
}

#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

// ===== Entry point =====

/// Mount the chart into `#gantt-target`.
///
/// `tasks_json` is a JSON array of task definitions; an empty string uses
/// the built-in fundraising plan. Scheduling starts from today's date.
#[wasm_bindgen]
pub fn mount(tasks_json: &str) -> Result<(), JsValue> {
    let defs: Vec<TaskDef> = if tasks_json.trim().is_empty() {
        default_plan()
    } else {
        serde_json::from_str(tasks_json).map_err(FitError::from)?
    };
    let timeline = build_timeline(&defs, today()).map_err(FitError::from)?;

    let win = dom::window()?;
    let document = dom::document()?;
    let root = dom::container(CONTAINER_ID)?;

    let coarse = win
        .match_media("(pointer: coarse)")
        .ok()
        .flatten()
        .is_some_and(|mq| mq.matches());
    let viewport_width = win
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(1024.0);
    let pointer = PointerClass::classify(coarse, viewport_width);
    let narrow = pointer == PointerClass::Coarse;

    let options = ChartOptions::locked(&timeline, narrow);
    let column_width = f64::from(options.column_width);
    let tasks = serde_wasm_bindgen::to_value(&widget_tasks(&timeline)).map_err(JsValue::from)?;
    let opts = serde_wasm_bindgen::to_value(&options).map_err(JsValue::from)?;
    let gantt = Gantt::new(&format!("#{CONTAINER_ID}"), &tasks, &opts);
    neuter_widget_callbacks(&gantt);

    // The wrapper has to exist before the first popup action lands.
    if dom::ensure_popup_wrapper(&root, &document).is_none() {
        debug!("popup wrapper unavailable, popups disabled");
    }

    let adapter = Rc::new(Adapter {
        gantt,
        timeline,
        config: FitConfig::default(),
        layout: PopupLayout::default(),
        pointer,
        narrow,
        column_width,
        labels: RefCell::new(LabelFitter::new()),
        window: RefCell::new(None),
        popup: RefCell::new(PopupController::new(pointer)),
        touch_origin: RefCell::new(None),
    });
    wire_page_events(&adapter);
    poll_until_rendered(adapter, RENDER_FRAME_BUDGET);
    Ok(())
}

/// The stock fundraising plan the page ships with.
fn default_plan() -> Vec<TaskDef> {
    vec![
        TaskDef::new("prep")
            .name("Deck & Data Room Prep")
            .days(14)
            .info("Finalize internal assessment, narrative and data pack"),
        TaskDef::new("io")
            .name("Investor Outreach")
            .days(10)
            .info("Warm Intros, Data Room Access and Management Calls"),
        TaskDef::new("qna")
            .name("Investor Analysis & Q&A")
            .days(25)
            .parallel_with("io")
            .info("Investor Assessment & Q&A"),
        TaskDef::new("ts")
            .name("Term-Sheet Negotiation")
            .days(10)
            .info("Amount, Pricing, Covenants and Securities"),
        TaskDef::new("approv")
            .name("Final Approvals")
            .days(5)
            .info("Board and Shareholder approvals"),
        TaskDef::new("dd")
            .name("Legal & Financial Due Diligence")
            .days(40)
            .info("KYC/KYB, Legal docs, Financial assessment, etc."),
        TaskDef::new("close")
            .name("Closing & Signing")
            .days(5)
            .info("Signing of legal docs and capital call"),
        TaskDef::new("capital")
            .name("Capital Call")
            .days(5)
            .info("Funds wired within few days"),
    ]
}

/// Overwrite the widget's mutation callbacks with no-ops. The read-only
/// flags stop the drag interactions, but some widget builds still invoke
/// these hooks on plain clicks.
fn neuter_widget_callbacks(gantt: &Gantt) {
    let Ok(options) = js_sys::Reflect::get(gantt.as_ref(), &JsValue::from_str("options")) else {
        return;
    };
    let noop = Closure::<dyn FnMut()>::new(|| {});
    for name in ["on_click", "on_date_change", "on_progress_change", "on_view_change"] {
        if js_sys::Reflect::set(&options, &JsValue::from_str(name), noop.as_ref()).is_err() {
            debug!(name, "could not overwrite widget callback");
        }
    }
    noop.forget();
}

fn today() -> NaiveDate {
    let now = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(now.get_full_year() as i32, now.get_month() + 1, now.get_date())
        .unwrap_or_default()
}

// ===== Adapter =====

struct Adapter {
    gantt: Gantt,
    timeline: Timeline,
    config: FitConfig,
    layout: PopupLayout,
    pointer: PointerClass,
    narrow: bool,
    column_width: f64,
    labels: RefCell<LabelFitter>,
    window: RefCell<Option<ViewportWindow>>,
    popup: RefCell<PopupController>,
    touch_origin: RefCell<Option<(i32, i32)>>,
}

impl Adapter {
    /// One full recomputation: harvest, crop, refit labels. Safe to run on
    /// every resize; the epsilon guard skips redundant viewBox writes.
    fn fit_pass(&self) -> Result<(), FitError> {
        let Some(harvest) = dom::harvest(CONTAINER_ID, self.column_width) else {
            debug!("nothing to fit yet");
            return Ok(());
        };
        let Some(window) = fit_viewport(&harvest.geometry, &self.config) else {
            return Ok(());
        };

        let root = dom::container(CONTAINER_ID)?;
        {
            let mut previous = self.window.borrow_mut();
            if window.differs_from(previous.as_ref(), self.config.epsilon) {
                dom::apply_viewport(&root, &harvest.svg, &window, self.narrow);
            }
            *previous = Some(window);
        }

        let left = window.x;
        let right = window.x + window.width;
        let mut fitter = self.labels.borrow_mut();
        for label in &harvest.labels {
            let measure = dom::label_measure(label);
            let placement = fitter.place(
                &LabelInput {
                    key: &label.key,
                    text: &label.text,
                    x: label.x,
                    bar: label.bar,
                },
                left,
                right,
                &measure,
            );
            dom::apply_label(label, &placement);
        }
        Ok(())
    }

    fn apply_popup(&self, action: &PopupAction) {
        match action {
            PopupAction::None => {}
            PopupAction::Show(id) => self.show_popup_for(id),
            PopupAction::Hide => self.hide_popup(),
            PopupAction::Replace(id) => {
                self.hide_popup();
                self.show_popup_for(id);
            }
        }
    }

    fn hide_popup(&self) {
        // Mirror the widget's own hide so its internal state agrees.
        self.gantt.hide_popup();
        let (Ok(root), Ok(document)) = (dom::container(CONTAINER_ID), dom::document()) else {
            return;
        };
        if let Some(wrapper) = dom::ensure_popup_wrapper(&root, &document) {
            dom::park_popup(&wrapper);
        }
    }

    fn show_popup_for(&self, task_id: &str) {
        // The widget raises its own popup on bar clicks; suppress it so the
        // controller's wrapper is the only one visible.
        self.gantt.hide_popup();
        // A bar whose id the widget no longer knows is stale markup.
        if self.gantt.get_task(task_id).is_undefined() {
            debug!(task_id, "widget does not know this task");
            return;
        }
        let Some(task) = self.timeline.get(task_id) else {
            return;
        };
        let (Ok(root), Ok(document)) = (dom::container(CONTAINER_ID), dom::document()) else {
            return;
        };
        let Some(bar) = dom::bar_for_task(&root, task_id) else {
            return;
        };
        let Some(wrapper) = dom::ensure_popup_wrapper(&root, &document) else {
            return;
        };

        dom::stage_popup(&wrapper, &popup_html(task));
        let bar_rect = dom::rect_in(&root, &bar);
        let popup_rect = dom::rect_in(&root, &wrapper);
        let container_rect = dom::local_rect(&root);
        let (x, y) = place_popup(bar_rect, popup_rect, container_rect, self.pointer, &self.layout);
        dom::reveal_popup(&wrapper, x, y);
    }
}

/// Detail card markup shown for one task.
fn popup_html(task: &ScheduledTask) -> String {
    let start = task.start.format("%b %-d, %Y");
    let end = task.end.format("%b %-d, %Y");
    let days = task.duration_days();
    let info = if task.info.is_empty() {
        String::new()
    } else {
        format!("<p class=\"info\">{}</p>", task.info)
    };
    format!(
        "<div class=\"details-container\"><h5>{name}</h5>\
         <p>{start} to {end}</p><p>{days} days</p>{info}</div>",
        name = task.name,
    )
}

// ===== Readiness =====

fn request_frame(f: impl FnOnce() + 'static) {
    let Ok(win) = dom::window() else {
        return;
    };
    let cb = Closure::once_into_js(f);
    if win.request_animation_frame(cb.unchecked_ref()).is_err() {
        warn!("could not schedule an animation frame");
    }
}

/// Poll one frame at a time until the widget has drawn its bars, then give
/// it one more settling frame and run the first fit.
fn poll_until_rendered(adapter: Rc<Adapter>, frames_left: u32) {
    request_frame(move || {
        if dom::bars_present(CONTAINER_ID) {
            request_frame(move || {
                wire_bar_events(&adapter);
                if let Err(err) = adapter.fit_pass() {
                    warn!(error = %err, "initial fit failed");
                }
            });
        } else if frames_left == 0 {
            warn!(error = %FitError::RenderTimeout, "giving up on initial fit");
        } else {
            poll_until_rendered(adapter, frames_left - 1);
        }
    });
}

// ===== Event wiring =====

fn attach(target: &web_sys::EventTarget, event: &str, cb: &js_sys::Function) {
    if target.add_event_listener_with_callback(event, cb).is_err() {
        debug!(event, "could not attach listener");
    }
}

/// Listeners that exist for the page lifetime: refits, tap-outside and
/// horizontal pan suppression. Bar listeners come later, once bars exist.
fn wire_page_events(adapter: &Rc<Adapter>) {
    let (Ok(win), Ok(document), Ok(root)) = (
        dom::window(),
        dom::document(),
        dom::container(CONTAINER_ID),
    ) else {
        return;
    };

    for event in ["resize", "orientationchange"] {
        let a = Rc::clone(adapter);
        let cb = Closure::<dyn FnMut()>::new(move || {
            if let Err(err) = a.fit_pass() {
                warn!(error = %err, "refit failed");
            }
        });
        attach(&win, event, cb.as_ref().unchecked_ref());
        cb.forget();
    }

    // A tap that lands outside every bar closes the popup.
    {
        let a = Rc::clone(adapter);
        let cb = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            let on_bar = event
                .target()
                .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
                .and_then(|el| el.closest(".bar-wrapper").ok().flatten())
                .is_some();
            if !on_bar {
                let action = a.popup.borrow_mut().tap_outside();
                a.apply_popup(&action);
            }
        });
        attach(&document, "click", cb.as_ref().unchecked_ref());
        cb.forget();
    }

    // The chart pans itself when wheeled or swiped sideways, which fights
    // page scroll. Kill the horizontal component; vertical passes through.
    let opts = web_sys::AddEventListenerOptions::new();
    opts.set_passive(false);
    {
        let cb = Closure::<dyn FnMut(web_sys::WheelEvent)>::new(
            move |event: web_sys::WheelEvent| {
                if event.delta_x().abs() > event.delta_y().abs() {
                    event.prevent_default();
                }
            },
        );
        if root
            .add_event_listener_with_callback_and_add_event_listener_options(
                "wheel",
                cb.as_ref().unchecked_ref(),
                &opts,
            )
            .is_err()
        {
            debug!("could not attach wheel listener");
        }
        cb.forget();
    }
    {
        let a = Rc::clone(adapter);
        let cb = Closure::<dyn FnMut(web_sys::TouchEvent)>::new(
            move |event: web_sys::TouchEvent| {
                let touches = event.touches();
                if touches.length() == 1 {
                    if let Some(touch) = touches.item(0) {
                        *a.touch_origin.borrow_mut() =
                            Some((touch.client_x(), touch.client_y()));
                    }
                }
            },
        );
        attach(&root, "touchstart", cb.as_ref().unchecked_ref());
        cb.forget();
    }
    {
        let a = Rc::clone(adapter);
        let cb = Closure::<dyn FnMut(web_sys::TouchEvent)>::new(
            move |event: web_sys::TouchEvent| {
                let touches = event.touches();
                if touches.length() != 1 {
                    return;
                }
                let Some(touch) = touches.item(0) else {
                    return;
                };
                let Some((ox, oy)) = *a.touch_origin.borrow() else {
                    return;
                };
                let dx = (touch.client_x() - ox).abs();
                let dy = (touch.client_y() - oy).abs();
                if dx > dy {
                    event.prevent_default();
                }
            },
        );
        if root
            .add_event_listener_with_callback_and_add_event_listener_options(
                "touchmove",
                cb.as_ref().unchecked_ref(),
                &opts,
            )
            .is_err()
        {
            debug!("could not attach touchmove listener");
        }
        cb.forget();
    }
}

/// Hover and tap handlers on each rendered bar.
fn wire_bar_events(adapter: &Rc<Adapter>) {
    let Ok(root) = dom::container(CONTAINER_ID) else {
        return;
    };
    let Ok(wrappers) = root.query_selector_all(".bar-wrapper") else {
        return;
    };
    for i in 0..wrappers.length() {
        let Some(bar) = wrappers
            .item(i)
            .and_then(|n| n.dyn_into::<web_sys::Element>().ok())
        else {
            continue;
        };
        let Some(task_id) = bar.get_attribute("data-id") else {
            continue;
        };

        {
            let a = Rc::clone(adapter);
            let id = task_id.clone();
            let cb = Closure::<dyn FnMut()>::new(move || {
                let action = a.popup.borrow_mut().pointer_enter(&id);
                a.apply_popup(&action);
            });
            attach(&bar, "mouseenter", cb.as_ref().unchecked_ref());
            cb.forget();
        }
        {
            let a = Rc::clone(adapter);
            let cb = Closure::<dyn FnMut()>::new(move || {
                let action = a.popup.borrow_mut().pointer_leave();
                a.apply_popup(&action);
            });
            attach(&bar, "mouseleave", cb.as_ref().unchecked_ref());
            cb.forget();
        }
        {
            let a = Rc::clone(adapter);
            let id = task_id;
            let cb = Closure::<dyn FnMut()>::new(move || {
                let action = a.popup.borrow_mut().tap(&id);
                a.apply_popup(&action);
            });
            attach(&bar, "click", cb.as_ref().unchecked_ref());
            cb.forget();
        }
    }
}
