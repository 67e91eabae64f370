//! Browser binding over `web-sys`.
//!
//! [`start`] resolves the endpoint from the embedding script tag, registers
//! one listener per [`Trigger`], and hands every signal to a shared
//! [`Lifecycle`]. Listener and timer closures are leaked on purpose: they
//! live as long as the page does and there is no teardown hook.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use js_sys::{Array, Intl, Object, Reflect};
use picolytics_core::{DoNotTrack, Endpoint, NavigationTiming, ScreenInfo, VisibilityState};
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, EventTarget, HtmlScriptElement, Navigator, Window};

use crate::context::BeaconContext;
use crate::host::BeaconHost;
use crate::lifecycle::Lifecycle;
use crate::trigger::{ListenerTarget, Signal, Trigger};

/// [`BeaconHost`] backed by the page's globals.
pub struct WebHost {
    window: Window,
    document: Document,
    navigator: Navigator,
}

impl WebHost {
    pub fn from_global() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        let navigator = window.navigator();
        Some(Self {
            window,
            document,
            navigator,
        })
    }

    /// Absolute source URL of the currently executing script tag.
    pub fn current_script_src(&self) -> Option<String> {
        let script = self
            .document
            .current_script()?
            .dyn_into::<HtmlScriptElement>()
            .ok()?;
        Some(script.src())
    }

    fn load_completed(&self) -> bool {
        self.document.ready_state() == "complete"
    }

    fn listener_target(&self, target: ListenerTarget) -> &EventTarget {
        match target {
            ListenerTarget::Document => self.document.as_ref(),
            ListenerTarget::Window => self.window.as_ref(),
        }
    }
}

impl BeaconHost for WebHost {
    fn visibility_state(&self) -> VisibilityState {
        match self.document.visibility_state() {
            web_sys::VisibilityState::Visible => VisibilityState::Visible,
            _ => VisibilityState::Hidden,
        }
    }

    fn do_not_track(&self) -> DoNotTrack {
        DoNotTrack::from_signal(Some(&self.navigator.do_not_track()))
    }

    fn navigation_timing(&self) -> NavigationTiming {
        let Some(performance) = self.window.performance() else {
            return NavigationTiming::default();
        };
        let timing = performance.timing();
        NavigationTiming {
            navigation_start: timing.navigation_start(),
            response_start: timing.response_start(),
            load_event_end: timing.load_event_end(),
        }
    }

    fn location_href(&self) -> String {
        self.window.location().href().unwrap_or_default()
    }

    fn referrer(&self) -> String {
        self.document.referrer()
    }

    fn screen(&self) -> ScreenInfo {
        let pixel_ratio = Some(self.window.device_pixel_ratio());
        let Ok(screen) = self.window.screen() else {
            return ScreenInfo {
                pixel_ratio,
                ..Default::default()
            };
        };
        let dimension = |value: Result<i32, JsValue>| value.ok().and_then(|v| u32::try_from(v).ok());
        ScreenInfo {
            width: dimension(screen.width()),
            height: dimension(screen.height()),
            pixel_ratio,
            pixel_depth: dimension(screen.pixel_depth()),
        }
    }

    fn timezone(&self) -> Option<String> {
        let options = Intl::DateTimeFormat::new(&Array::new(), &Object::new()).resolved_options();
        Reflect::get(&options, &JsValue::from_str("timeZone"))
            .ok()
            .and_then(|tz| tz.as_string())
    }

    fn send_beacon(&self, endpoint: &Endpoint, body: String) -> bool {
        self.navigator
            .send_beacon_with_opt_str(endpoint.as_str(), Some(&body))
            .unwrap_or(false)
    }
}

struct WebBeacon {
    host: WebHost,
    lifecycle: RefCell<Lifecycle>,
}

impl WebBeacon {
    fn handle(self: &Rc<Self>, signal: Signal) {
        let dispatch = self.lifecycle.borrow_mut().dispatch(&self.host, signal);
        if let Some(period) = dispatch.arm_ping {
            self.arm(period);
        }
    }

    /// Start the page-lifetime ping timer. Never cancelled.
    fn arm(self: &Rc<Self>, period: Duration) {
        let beacon = Rc::clone(self);
        let tick = Closure::<dyn FnMut()>::new(move || beacon.handle(Signal::Ping));
        let millis = i32::try_from(period.as_millis()).unwrap_or(i32::MAX);
        if let Err(e) = self
            .host
            .window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                tick.as_ref().unchecked_ref(),
                millis,
            )
        {
            warn!(error = ?e, "failed to start ping timer");
        }
        tick.forget();
    }

    fn listen(self: &Rc<Self>) {
        for trigger in Trigger::ALL {
            let beacon = Rc::clone(self);
            let listener = Closure::<dyn FnMut()>::new(move || {
                let signal = trigger.signal(beacon.host.visibility_state());
                beacon.handle(signal);
            });
            let target = self.host.listener_target(trigger.target());
            if let Err(e) = target
                .add_event_listener_with_callback(trigger.dom_event(), listener.as_ref().unchecked_ref())
            {
                warn!(event = trigger.dom_event(), error = ?e, "failed to register listener");
            }
            listener.forget();
        }
    }
}

thread_local! {
    static ACTIVE: RefCell<Option<Rc<WebBeacon>>> = const { RefCell::new(None) };
}

/// Start the beacon. `script_src` overrides the executing script's URL, for
/// loaders where `document.currentScript` is not the tag that served the
/// beacon. Calling it again is a no-op.
#[wasm_bindgen]
pub fn start(script_src: Option<String>) {
    let already_started = ACTIVE.with(|active| active.borrow().is_some());
    if already_started {
        debug!("beacon already started");
        return;
    }
    let Some(host) = WebHost::from_global() else {
        return;
    };

    let src = script_src
        .or_else(|| host.current_script_src())
        .unwrap_or_default();
    let context = BeaconContext::initialize(&src);
    let lifecycle = Lifecycle::new(context, host.visibility_state());
    let beacon = Rc::new(WebBeacon {
        host,
        lifecycle: RefCell::new(lifecycle),
    });

    beacon.listen();
    ACTIVE.with(|active| *active.borrow_mut() = Some(Rc::clone(&beacon)));

    // Loaded asynchronously after the page finished loading: the load
    // listener will never fire.
    if beacon.host.load_completed() {
        beacon.handle(Signal::Load);
    }
}

/// Send a custom event through the running beacon. Ignored before [`start`].
#[wasm_bindgen]
pub fn pico(event_name: String) {
    let beacon = ACTIVE.with(|active| active.borrow().clone());
    if let Some(beacon) = beacon {
        beacon.handle(Signal::Manual(event_name));
    }
}
