//! Browser frame loop
//!
//! Owns the pending `requestAnimationFrame` handle. Dropping the loop (or
//! calling `stop`) cancels the pending frame, so no callback outlives it.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

type FrameCallback = Closure<dyn FnMut(f64)>;

pub struct FrameLoop {
    handle: Rc<Cell<Option<i32>>>,
    running: Rc<Cell<bool>>,
    callback: Rc<RefCell<Option<FrameCallback>>>,
}

impl FrameLoop {
    /// Call `on_frame(timestamp_ms)` once per animation frame until stopped
    pub fn start(mut on_frame: impl FnMut(f64) + 'static) -> Result<Self, JsValue> {
        let handle = Rc::new(Cell::new(None));
        let running = Rc::new(Cell::new(true));
        let callback: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));

        let next = callback.clone();
        let h = handle.clone();
        let r = running.clone();
        *callback.borrow_mut() = Some(Closure::new(move |time: f64| {
            h.set(None);
            if !r.get() {
                return;
            }
            on_frame(time);
            // on_frame may have stopped the loop
            if r.get() {
                if let Some(cb) = next.borrow().as_ref() {
                    h.set(request(cb));
                }
            }
        }));

        if let Some(cb) = callback.borrow().as_ref() {
            handle.set(request(cb));
        }
        if handle.get().is_none() {
            return Err(JsValue::from_str("requestAnimationFrame unavailable"));
        }
        log::info!("Frame loop started");

        Ok(Self {
            handle,
            running,
            callback,
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Cancel the pending frame; safe to call more than once
    pub fn stop(&self) {
        if !self.running.replace(false) {
            return;
        }
        if let (Some(id), Some(window)) = (self.handle.take(), web_sys::window()) {
            let _ = window.cancel_animation_frame(id);
        }
        log::info!("Frame loop stopped");
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stop();
        // Break the closure's self-reference so it can be freed
        self.callback.borrow_mut().take();
    }
}

fn request(cb: &FrameCallback) -> Option<i32> {
    web_sys::window()?
        .request_animation_frame(cb.as_ref().unchecked_ref())
        .ok()
}
