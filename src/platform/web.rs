//! Browser bindings
//!
//! The page owns the physics/rendering engine and talks to the game through
//! [`WebSession`]: plain numbers in, JSON strings out.

use glam::Vec2;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::arena::ShapeKind;
use crate::outline::Outline;
use crate::session::Session;
use crate::settings::Settings;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    super::init_logging();
    log::info!("Goal Drop wasm module loaded");
}

fn to_js<E: std::fmt::Display>(err: E) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn json<T: Serialize + ?Sized>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(to_js)
}

/// One game, driven by the page
#[wasm_bindgen]
pub struct WebSession {
    inner: Session,
}

#[wasm_bindgen]
impl WebSession {
    /// Start a game centered at (x, y); `settings_json` may be empty for defaults
    #[wasm_bindgen(constructor)]
    pub fn new(settings_json: &str, x: f32, y: f32) -> Result<WebSession, JsValue> {
        let settings = if settings_json.trim().is_empty() {
            Settings::default()
        } else {
            Settings::from_json(settings_json).map_err(to_js)?
        };
        let inner = Session::new(settings, super::random_seed(), Vec2::new(x, y)).map_err(to_js)?;
        Ok(Self { inner })
    }

    /// Switch shape ("polygon" / "rectangle") and side count
    pub fn reconfigure(&mut self, shape: &str, sides: u32) -> Result<f64, JsValue> {
        let shape = ShapeKind::from_str(shape)
            .ok_or_else(|| JsValue::from_str(&format!("unknown shape '{shape}'")))?;
        let snapshot = self.inner.reconfigure(shape, sides).map_err(to_js)?;
        Ok(snapshot.generation as f64)
    }

    /// Canvas resized or panned
    pub fn place(&mut self, x: f32, y: f32) -> Result<f64, JsValue> {
        let snapshot = self.inner.place(Vec2::new(x, y)).map_err(to_js)?;
        Ok(snapshot.generation as f64)
    }

    pub fn generation(&self) -> f64 {
        self.inner.generation() as f64
    }

    #[wasm_bindgen(js_name = beginDrag)]
    pub fn begin_drag(&mut self, id: u32) -> Result<(), JsValue> {
        self.inner.begin_drag(id).map_err(to_js)
    }

    #[wasm_bindgen(js_name = dragTo)]
    pub fn drag_to(&mut self, id: u32, x: f32, y: f32) -> Result<(), JsValue> {
        self.inner.drag_to(id, Vec2::new(x, y)).map_err(to_js)
    }

    /// Release a held ball; returns the drop outcome as JSON
    pub fn release(&mut self, id: u32, x: f32, y: f32, generation: f64) -> Result<String, JsValue> {
        let outcome = self
            .inner
            .release(id, Vec2::new(x, y), generation as u64)
            .map_err(to_js)?;
        json(&outcome)
    }

    /// Advance to the page clock; returns the events as a JSON array
    pub fn tick(&mut self) -> Result<String, JsValue> {
        let events = self.inner.advance(super::now_ms());
        json(&events)
    }

    /// Board snapshot (walls, sensors, play area) as JSON
    #[wasm_bindgen(js_name = boardJson)]
    pub fn board_json(&self) -> Result<String, JsValue> {
        json(&*self.inner.snapshot())
    }

    /// Border lines and dash pattern as JSON
    #[wasm_bindgen(js_name = outlineJson)]
    pub fn outline_json(&self) -> Result<String, JsValue> {
        let outline = Outline::from_snapshot(&self.inner.snapshot(), &self.inner.settings().goal);
        json(&outline)
    }

    #[wasm_bindgen(js_name = ballsJson)]
    pub fn balls_json(&self) -> Result<String, JsValue> {
        json(self.inner.balls())
    }

    #[wasm_bindgen(js_name = scoresJson)]
    pub fn scores_json(&self) -> Result<String, JsValue> {
        json(self.inner.scores())
    }

    #[wasm_bindgen(js_name = isGameOver)]
    pub fn is_game_over(&self) -> bool {
        self.inner.is_game_over()
    }
}
