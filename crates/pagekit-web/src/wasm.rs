#![forbid(unsafe_code)]

//! Browser host for [`PageCore`].
//!
//! Installs one `gloo` listener per [`Binding`] the page declares, turns
//! native events into [`PageEvent`]s, and drives the page's timers and
//! animation frames with `setTimeout` and `requestAnimationFrame`. Only
//! compiled on `wasm32` targets.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

use gloo::events::{EventListener, EventListenerOptions};
use gloo::render::{AnimationFrame, request_animation_frame};
use gloo::timers::callback::Timeout;
use js_sys::{Array, Reflect};
use pagekit_core::{
    Binding, Dispatch, EventKind, Key, NodeId, PageConfig, PageError, PageEvent, PointerSource,
    Target,
};
use tracing_subscriber::fmt::MakeWriter;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, Event, EventTarget, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, KeyboardEvent, MouseEvent, TouchEvent, Window,
};
use web_time::{Duration, Instant};

use crate::page_core::PageCore;
use crate::web_dom::WebDom;

type IntersectionCallback = Closure<dyn FnMut(Array, IntersectionObserver)>;

thread_local! {
    static HOST: RefCell<Option<Rc<Host>>> = const { RefCell::new(None) };
}

fn console_call(method: &str, msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(function) = Reflect::get(&console, &method.into()) else {
        return;
    };
    let Ok(function) = function.dyn_into::<js_sys::Function>() else {
        return;
    };
    let _ = function.call1(&console, &JsValue::from_str(msg));
}

fn console_error(msg: &str) {
    console_call("error", msg);
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!(
                    "panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                )
            } else {
                format!("panic: {info}")
            };
            console_error(&msg);
        }));
    });
}

/// Buffers one formatted record and hands it to `console.log` on flush.
#[derive(Default)]
struct ConsoleWriter {
    line: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.line.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.line.is_empty() {
            console_call("log", String::from_utf8_lossy(&self.line).trim_end());
            self.line.clear();
        }
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let _ = io::Write::flush(self);
    }
}

struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter::default()
    }
}

fn install_console_logging() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        let level = if cfg!(debug_assertions) {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        };
        let _ = tracing_subscriber::fmt()
            .with_writer(ConsoleMakeWriter)
            .without_time()
            .with_ansi(false)
            .with_target(false)
            .with_max_level(level)
            .try_init();
    });
}

fn page_error_to_js(err: &PageError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn mouse_x(event: &Event) -> Option<f64> {
    Some(f64::from(event.dyn_ref::<MouseEvent>()?.client_x()))
}

/// Client-x of the first touch point; `None` for a touch event without any.
fn touch_x(event: &Event) -> Option<f64> {
    let touch = event.dyn_ref::<TouchEvent>()?.touches().item(0)?;
    Some(f64::from(touch.client_x()))
}

struct Host {
    window: Window,
    document: Document,
    core: RefCell<PageCore<WebDom>>,
    epoch: Instant,
    deferred: RefCell<VecDeque<PageEvent>>,
    listeners: RefCell<Vec<EventListener>>,
    timeout: RefCell<Option<(Duration, Timeout)>>,
    frame: RefCell<Option<AnimationFrame>>,
    observers: RefCell<Vec<IntersectionObserver>>,
    observed: RefCell<Vec<(NodeId, Element)>>,
    intersection_callback: RefCell<Option<IntersectionCallback>>,
}

impl Host {
    fn elapsed(&self) -> Duration {
        self.epoch.elapsed()
    }

    fn event_target(&self, target: Target) -> Option<EventTarget> {
        match target {
            Target::Window => Some(self.window.clone().into()),
            Target::Document => Some(self.document.clone().into()),
            Target::Node(node) => self.core.borrow().dom().element(node).map(Into::into),
        }
    }

    fn translate(&self, binding: Binding, event: &Event) -> Option<PageEvent> {
        let node = match binding.target {
            Target::Node(node) => Some(node),
            Target::Window | Target::Document => None,
        };
        let page_event = match binding.kind {
            EventKind::Click => PageEvent::Click { target: node? },
            EventKind::KeyDown => PageEvent::KeyDown {
                target: binding.target,
                key: Key::from_dom(&event.dyn_ref::<KeyboardEvent>()?.key()),
            },
            EventKind::MouseDown => PageEvent::PointerDown {
                target: node?,
                client_x: mouse_x(event)?,
                source: PointerSource::Mouse,
            },
            EventKind::TouchStart => PageEvent::PointerDown {
                target: node?,
                client_x: touch_x(event)?,
                source: PointerSource::Touch,
            },
            EventKind::MouseMove => PageEvent::PointerMove {
                client_x: mouse_x(event)?,
                source: PointerSource::Mouse,
            },
            EventKind::TouchMove => PageEvent::PointerMove {
                client_x: touch_x(event)?,
                source: PointerSource::Touch,
            },
            EventKind::MouseUp => PageEvent::PointerUp {
                source: PointerSource::Mouse,
            },
            EventKind::TouchEnd => PageEvent::PointerUp {
                source: PointerSource::Touch,
            },
            EventKind::MouseEnter => PageEvent::PointerEnter { target: node? },
            EventKind::MouseLeave => PageEvent::PointerLeave { target: node? },
            EventKind::Blur => PageEvent::Blur { target: node? },
            EventKind::Input => PageEvent::Input { target: node? },
            EventKind::Submit => PageEvent::Submit { target: node? },
            EventKind::Resize => PageEvent::Resize {
                width: self.window.inner_width().ok()?.as_f64()?,
            },
            EventKind::VisibilityChange => PageEvent::VisibilityChange {
                hidden: self.document.hidden(),
            },
        };
        Some(page_event)
    }

    fn install_listeners(self: &Rc<Self>) {
        let bindings = self.core.borrow().bindings();
        let mut listeners = Vec::with_capacity(bindings.len());
        for binding in bindings {
            let Some(target) = self.event_target(binding.target) else {
                continue;
            };
            let host = Rc::clone(self);
            listeners.push(EventListener::new_with_options(
                &target,
                binding.kind.dom_name(),
                EventListenerOptions::enable_prevent_default(),
                move |event: &Event| host.on_event(binding, event),
            ));
        }
        tracing::debug!(listeners = listeners.len(), "listeners installed");
        *self.listeners.borrow_mut() = listeners;
    }

    fn install_observers(self: &Rc<Self>) -> Result<(), JsValue> {
        let observations = self.core.borrow().observed();
        if observations.is_empty() {
            return Ok(());
        }

        let host = Rc::clone(self);
        let callback: IntersectionCallback = Closure::new(
            move |entries: Array, _observer: IntersectionObserver| {
                for entry in entries.iter() {
                    let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                        continue;
                    };
                    if let Some(target) = host.observed_id(&entry.target()) {
                        host.deferred.borrow_mut().push_back(PageEvent::Intersection {
                            target,
                            is_intersecting: entry.is_intersecting(),
                        });
                    }
                }
                host.drain_deferred();
                host.schedule();
            },
        );

        let mut thresholds: Vec<f64> = Vec::new();
        for observation in &observations {
            if !thresholds.iter().any(|t| t.to_bits() == observation.threshold.to_bits()) {
                thresholds.push(observation.threshold);
            }
        }

        let mut observers = Vec::with_capacity(thresholds.len());
        let mut observed = Vec::with_capacity(observations.len());
        for threshold in thresholds {
            let init = IntersectionObserverInit::new();
            init.set_threshold(&JsValue::from_f64(threshold));
            init.set_root_margin("0px");
            let observer =
                IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
            for observation in observations
                .iter()
                .filter(|o| o.threshold.to_bits() == threshold.to_bits())
            {
                if let Some(element) = self.core.borrow().dom().element(observation.target) {
                    observer.observe(&element);
                    observed.push((observation.target, element));
                }
            }
            observers.push(observer);
        }

        *self.observers.borrow_mut() = observers;
        *self.observed.borrow_mut() = observed;
        *self.intersection_callback.borrow_mut() = Some(callback);
        Ok(())
    }

    fn observed_id(&self, element: &Element) -> Option<NodeId> {
        self.observed
            .borrow()
            .iter()
            .find(|(_, known)| known == element)
            .map(|(node, _)| *node)
    }

    fn unobserve(&self, nodes: &[NodeId]) {
        if nodes.is_empty() {
            return;
        }
        let mut observed = self.observed.borrow_mut();
        observed.retain(|(node, element)| {
            if !nodes.contains(node) {
                return true;
            }
            for observer in self.observers.borrow().iter() {
                observer.unobserve(element);
            }
            false
        });
    }

    fn on_event(self: &Rc<Self>, binding: Binding, event: &Event) {
        let Some(page_event) = self.translate(binding, event) else {
            return;
        };
        // Focus changes made while dispatching fire nested DOM events
        // synchronously; those wait until the current dispatch returns.
        let Ok(mut core) = self.core.try_borrow_mut() else {
            self.deferred.borrow_mut().push_back(page_event);
            return;
        };
        core.advance_to(self.elapsed());
        let dispatch = core.dispatch(page_event);
        drop(core);

        if dispatch.prevent_default {
            event.prevent_default();
        }
        self.settle(&dispatch);
        self.drain_deferred();
        self.schedule();
    }

    fn settle(&self, dispatch: &Dispatch) {
        self.unobserve(&dispatch.unobserve);
    }

    fn drain_deferred(&self) {
        loop {
            let Ok(mut core) = self.core.try_borrow_mut() else {
                return;
            };
            let Some(page_event) = self.deferred.borrow_mut().pop_front() else {
                return;
            };
            core.advance_to(self.elapsed());
            let dispatch = core.dispatch(page_event);
            drop(core);
            self.settle(&dispatch);
        }
    }

    fn tick(self: &Rc<Self>) {
        if let Ok(mut core) = self.core.try_borrow_mut() {
            core.advance_to(self.elapsed());
        }
        self.drain_deferred();
        self.schedule();
    }

    /// Arm the next animation frame and timeout the page asked for.
    fn schedule(self: &Rc<Self>) {
        let Ok(core) = self.core.try_borrow() else {
            return;
        };
        let wants_frame = core.wants_animation_frame();
        let deadline = core.next_deadline();
        drop(core);

        if wants_frame && self.frame.borrow().is_none() {
            let host = Rc::clone(self);
            let handle = request_animation_frame(move |_| {
                host.frame.borrow_mut().take();
                if let Ok(mut core) = host.core.try_borrow_mut() {
                    core.animation_frame();
                }
                host.drain_deferred();
                host.schedule();
            });
            *self.frame.borrow_mut() = Some(handle);
        }

        let mut slot = self.timeout.borrow_mut();
        if slot.as_ref().map(|(due, _)| *due) == deadline {
            return;
        }
        *slot = None;
        let Some(due) = deadline else {
            return;
        };
        let delay = due.saturating_sub(self.elapsed());
        let millis = u32::try_from(delay.as_micros().div_ceil(1000)).unwrap_or(u32::MAX);
        let host = Rc::clone(self);
        let timeout = Timeout::new(millis, move || {
            host.timeout.borrow_mut().take();
            host.tick();
        });
        *slot = Some((due, timeout));
    }

    fn shutdown(&self) {
        self.listeners.borrow_mut().clear();
        for observer in self.observers.borrow_mut().drain(..) {
            observer.disconnect();
        }
        self.observed.borrow_mut().clear();
        self.intersection_callback.borrow_mut().take();
        self.timeout.borrow_mut().take();
        self.frame.borrow_mut().take();
        self.deferred.borrow_mut().clear();
        if let Ok(mut core) = self.core.try_borrow_mut() {
            core.teardown();
        }
    }
}

fn start(config: PageConfig) -> Result<(), JsValue> {
    if HOST.with(|slot| slot.borrow().is_some()) {
        return Err(JsValue::from_str("pagekit is already booted"));
    }
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let dom = WebDom::new(document.clone()).map_err(|err| page_error_to_js(&err))?;
    let year = js_sys::Date::new_0().get_full_year() as i32;

    let host = Rc::new(Host {
        window,
        document,
        core: RefCell::new(PageCore::boot(dom, config, year)),
        epoch: Instant::now(),
        deferred: RefCell::new(VecDeque::new()),
        listeners: RefCell::new(Vec::new()),
        timeout: RefCell::new(None),
        frame: RefCell::new(None),
        observers: RefCell::new(Vec::new()),
        observed: RefCell::new(Vec::new()),
        intersection_callback: RefCell::new(None),
    });
    host.install_listeners();
    host.install_observers()?;
    host.schedule();
    HOST.with(|slot| *slot.borrow_mut() = Some(host));
    Ok(())
}

/// Start now, or once `DOMContentLoaded` fires if the document is still
/// loading.
fn boot_when_ready(config: PageConfig) -> Result<(), JsValue> {
    install_panic_hook();
    install_console_logging();
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    if document.ready_state() != "loading" {
        return start(config);
    }
    EventListener::once(&document, "DOMContentLoaded", move |_event| {
        if let Err(err) = start(config) {
            console_error(&format!("pagekit boot failed: {}", describe(&err)));
        }
    })
    .forget();
    Ok(())
}

#[wasm_bindgen(start)]
pub fn wasm_start() {
    install_panic_hook();
}

/// Mount every page behaviour with the default configuration.
#[wasm_bindgen]
pub fn boot() -> Result<(), JsValue> {
    boot_when_ready(PageConfig::default())
}

/// Mount every page behaviour with a JSON configuration override.
#[wasm_bindgen(js_name = bootWithConfig)]
pub fn boot_with_config(json: &str) -> Result<(), JsValue> {
    let config = PageConfig::from_json(json).map_err(|err| page_error_to_js(&err))?;
    boot_when_ready(config)
}

/// Remove every listener, observer and pending timer.
#[wasm_bindgen]
pub fn teardown() {
    let Some(host) = HOST.with(|slot| slot.borrow_mut().take()) else {
        return;
    };
    host.shutdown();
    tracing::info!("page torn down");
}
