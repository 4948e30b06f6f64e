//! Browser tilt sources
//!
//! `devicemotion` feeds the gyroscope reading through
//! [`rotation_rate_sample`]. Arrow keys stand in for a gyroscope on desktops.

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, DeviceMotionEvent, Event, KeyboardEvent, Window};

use crate::tilt::{HeldKeys, SensorError, TiltCell, TiltSensor, rotation_rate_sample};

type Listener<E> = Closure<dyn FnMut(E)>;

fn listener_error(e: JsValue) -> SensorError {
    SensorError::Listener(format!("{:?}", e))
}

/// Gyroscope via the `devicemotion` event
pub struct DeviceMotionSensor {
    window: Window,
    listener: Option<Listener<DeviceMotionEvent>>,
    permission_prompt: Option<Listener<Event>>,
}

impl DeviceMotionSensor {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            listener: None,
            permission_prompt: None,
        }
    }

    fn supported(&self) -> bool {
        js_sys::Reflect::has(&self.window, &JsValue::from_str("DeviceMotionEvent")).unwrap_or(false)
    }

    /// `DeviceMotionEvent.requestPermission`, present on iOS Safari where
    /// motion events stay silent until a user gesture grants access
    fn permission_request(&self) -> Option<(JsValue, js_sys::Function)> {
        let ctor = js_sys::Reflect::get(&self.window, &JsValue::from_str("DeviceMotionEvent")).ok()?;
        let request = js_sys::Reflect::get(&ctor, &JsValue::from_str("requestPermission")).ok()?;
        request.dyn_into::<js_sys::Function>().ok().map(|f| (ctor, f))
    }

    /// Ask for motion access on the next tap
    fn prompt_on_first_tap(&mut self, ctor: JsValue, request: js_sys::Function) -> Result<(), SensorError> {
        log::info!("Motion sensor needs permission; tap the screen to enable tilt");

        let closure = Listener::<Event>::new(move |_event: Event| {
            let Ok(promise) = request.call0(&ctor) else {
                log::warn!("Motion permission request threw");
                return;
            };
            let Ok(promise) = promise.dyn_into::<js_sys::Promise>() else {
                return;
            };
            wasm_bindgen_futures::spawn_local(async move {
                match wasm_bindgen_futures::JsFuture::from(promise).await {
                    Ok(state) if state.as_string().as_deref() == Some("granted") => {
                        log::info!("Motion permission granted");
                    }
                    Ok(state) => {
                        log::warn!("Motion permission {:?}; tilt will stay at zero", state.as_string());
                    }
                    Err(e) => log::warn!("Motion permission request failed: {:?}", e),
                }
            });
        });

        let options = AddEventListenerOptions::new();
        options.set_once(true);
        self.window
            .add_event_listener_with_callback_and_add_event_listener_options(
                "touchend",
                closure.as_ref().unchecked_ref(),
                &options,
            )
            .map_err(listener_error)?;
        self.permission_prompt = Some(closure);
        Ok(())
    }
}

impl TiltSensor for DeviceMotionSensor {
    fn start(&mut self, sink: TiltCell) -> Result<(), SensorError> {
        if !self.supported() {
            return Err(SensorError::Unavailable);
        }

        let closure = Listener::<DeviceMotionEvent>::new(move |event: DeviceMotionEvent| {
            let sample = match event.rotation_rate() {
                Some(rate) => rotation_rate_sample(rate.alpha(), rate.beta(), rate.gamma()),
                None => rotation_rate_sample(None, None, None),
            };
            sink.store_sample(&sample);
        });

        self.window
            .add_event_listener_with_callback("devicemotion", closure.as_ref().unchecked_ref())
            .map_err(listener_error)?;
        self.listener = Some(closure);

        if let Some((ctor, request)) = self.permission_request() {
            self.prompt_on_first_tap(ctor, request)?;
        }
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(closure) = self.listener.take() {
            let _ = self
                .window
                .remove_event_listener_with_callback("devicemotion", closure.as_ref().unchecked_ref());
        }
        if let Some(closure) = self.permission_prompt.take() {
            let _ = self
                .window
                .remove_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
        }
    }
}

/// Arrow-key tilt for devices without a gyroscope
pub struct KeyboardTilt {
    window: Window,
    listeners: Vec<(&'static str, Listener<KeyboardEvent>)>,
}

impl KeyboardTilt {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            listeners: Vec::new(),
        }
    }
}

impl TiltSensor for KeyboardTilt {
    fn start(&mut self, sink: TiltCell) -> Result<(), SensorError> {
        let held = Rc::new(Cell::new(HeldKeys::default()));

        for (event_name, pressed) in [("keydown", true), ("keyup", false)] {
            let held = held.clone();
            let sink = sink.clone();
            let closure = Listener::<KeyboardEvent>::new(move |event: KeyboardEvent| {
                let key = event.key();
                if !HeldKeys::handles(&key) {
                    return;
                }
                event.prevent_default();
                let mut keys = held.get();
                if keys.set(&key, pressed) {
                    held.set(keys);
                    sink.store(keys.tilt());
                }
            });
            self.window
                .add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref())
                .map_err(listener_error)?;
            self.listeners.push((event_name, closure));
        }
        Ok(())
    }

    fn stop(&mut self) {
        for (event_name, closure) in self.listeners.drain(..) {
            let _ = self
                .window
                .remove_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
        }
    }
}
