//! JavaScript bindings.
//!
//! `JsTableEditor` wraps `TableEditor` for the browser. Cell keys, records,
//! events and geometry cross the boundary as plain JS objects through
//! `serde-wasm-bindgen`; the repair clock is `performance.now()`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::codec::TableRecord;
use crate::config::GridConfig;
use crate::editor::{MutationEvent, TableEditor};
use crate::ops::TableState;
use crate::selection::{MeasuredGeometry, Point};
use crate::types::CellKey;

#[cfg(target_arch = "wasm32")]
fn now_ms() -> f64 {
    if let Some(window) = web_sys::window() {
        if let Some(perf) = window.performance() {
            return perf.now();
        }
    }
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
fn now_ms() -> f64 {
    use std::time::Instant;
    thread_local! {
        static START: Instant = Instant::now();
    }
    START.with(|s| s.elapsed().as_secs_f64() * 1000.0)
}

fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsValue::from_str(&format!("Deserialization error: {e}")))
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}

/// Table editor exported to JavaScript.
#[wasm_bindgen]
pub struct JsTableEditor {
    inner: TableEditor,
    change_callback: Option<js_sys::Function>,
}

impl JsTableEditor {
    fn notify(&self) {
        if let Some(callback) = &self.change_callback {
            let _ = callback.call0(&JsValue::NULL);
        }
    }
}

#[wasm_bindgen]
impl JsTableEditor {
    /// Create an editor. `config` is a partial `GridConfig` object or
    /// `undefined`.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsTableEditor, JsValue> {
        console_error_panic_hook::set_once();
        let config: GridConfig = if config.is_undefined() || config.is_null() {
            GridConfig::default()
        } else {
            from_js(config)?
        };
        Ok(JsTableEditor {
            inner: TableEditor::new(config),
            change_callback: None,
        })
    }

    /// Register a callback invoked after every change to the model.
    #[wasm_bindgen]
    pub fn set_change_callback(&mut self, callback: Option<js_sys::Function>) {
        self.change_callback = callback;
    }

    /// Create a fresh table; returns its id.
    #[wasm_bindgen]
    pub fn create(&mut self, rows: usize, cols: usize, full: bool) -> Result<String, JsValue> {
        let id = self.inner.create(rows, cols, full)?;
        self.notify();
        Ok(id.to_string())
    }

    /// Load a table from its record array.
    #[wasm_bindgen]
    pub fn load(&mut self, records: JsValue) -> Result<(), JsValue> {
        let records: Vec<TableRecord> = from_js(records)?;
        self.inner.load_records(&records)?;
        self.notify();
        Ok(())
    }

    /// Current record array.
    #[wasm_bindgen]
    pub fn records(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.records())
    }

    /// Current record array as a JSON string.
    #[wasm_bindgen]
    pub fn records_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.inner.records()).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen]
    pub fn has_table(&self) -> bool {
        self.inner.table().is_some()
    }

    // ---- Repair scheduling ----

    /// Report a document mutation; returns whether a repair is scheduled.
    #[wasm_bindgen]
    pub fn observe(&mut self, event: JsValue) -> Result<bool, JsValue> {
        let event: MutationEvent = from_js(event)?;
        Ok(self.inner.observe(&event, now_ms()))
    }

    /// Run a due repair; returns whether one ran.
    #[wasm_bindgen]
    pub fn tick(&mut self) -> bool {
        let ran = self.inner.tick(now_ms()).is_some();
        if ran {
            self.notify();
        }
        ran
    }

    /// Run a scheduled repair now; returns whether one ran.
    #[wasm_bindgen]
    pub fn flush(&mut self) -> bool {
        let ran = self.inner.flush_repair().is_some();
        if ran {
            self.notify();
        }
        ran
    }

    /// Milliseconds the host should wait before calling `tick`.
    #[wasm_bindgen]
    pub fn repair_delay_ms(&self) -> f64 {
        self.inner.config().debounce_ms
    }

    // ---- Structural operations ----

    #[wasm_bindgen]
    pub fn insert_row_above(&mut self, cell: JsValue) -> Result<String, JsValue> {
        let cell: CellKey = from_js(cell)?;
        let id = self.inner.insert_row_above(&cell)?;
        self.notify();
        Ok(id.to_string())
    }

    #[wasm_bindgen]
    pub fn insert_row_below(&mut self, cell: JsValue) -> Result<String, JsValue> {
        let cell: CellKey = from_js(cell)?;
        let id = self.inner.insert_row_below(&cell)?;
        self.notify();
        Ok(id.to_string())
    }

    #[wasm_bindgen]
    pub fn insert_column_left(&mut self, cell: JsValue) -> Result<String, JsValue> {
        let cell: CellKey = from_js(cell)?;
        let id = self.inner.insert_column_left(&cell)?;
        self.notify();
        Ok(id.to_string())
    }

    #[wasm_bindgen]
    pub fn insert_column_right(&mut self, cell: JsValue) -> Result<String, JsValue> {
        let cell: CellKey = from_js(cell)?;
        let id = self.inner.insert_column_right(&cell)?;
        self.notify();
        Ok(id.to_string())
    }

    /// Remove the rows spanned by `cells`; returns false if the table is gone.
    #[wasm_bindgen]
    pub fn remove_rows(&mut self, cells: JsValue) -> Result<bool, JsValue> {
        let cells: Vec<CellKey> = from_js(cells)?;
        let state = self.inner.remove_rows(&cells)?;
        self.notify();
        Ok(state == TableState::Live)
    }

    /// Remove the columns spanned by `cells`; returns false if the table is gone.
    #[wasm_bindgen]
    pub fn remove_columns(&mut self, cells: JsValue) -> Result<bool, JsValue> {
        let cells: Vec<CellKey> = from_js(cells)?;
        let state = self.inner.remove_columns(&cells)?;
        self.notify();
        Ok(state == TableState::Live)
    }

    /// Merge `cells`; returns the key of the merged cell.
    #[wasm_bindgen]
    pub fn merge_cells(&mut self, cells: JsValue) -> Result<JsValue, JsValue> {
        let cells: Vec<CellKey> = from_js(cells)?;
        let origin = self.inner.merge_cells(&cells)?;
        self.notify();
        to_js(&origin)
    }

    /// Split a spanned cell; returns the keys of the created cells.
    #[wasm_bindgen]
    pub fn split_cell(&mut self, cell: JsValue) -> Result<JsValue, JsValue> {
        let cell: CellKey = from_js(cell)?;
        let created = self.inner.split_cell(&cell)?;
        self.notify();
        to_js(&created)
    }

    #[wasm_bindgen]
    pub fn set_cell_text(&mut self, cell: JsValue, text: &str) -> Result<(), JsValue> {
        let cell: CellKey = from_js(cell)?;
        self.inner.set_cell_text(&cell, text)?;
        self.notify();
        Ok(())
    }

    #[wasm_bindgen]
    pub fn delete_table(&mut self) -> Result<(), JsValue> {
        self.inner.delete_table()?;
        self.notify();
        Ok(())
    }

    // ---- Selection ----

    /// Resolve a drag against geometry measured by the host
    /// (`{ cells: [{ key, rect }], table: rect }`).
    #[wasm_bindgen]
    pub fn select(
        &self,
        geometry: JsValue,
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
    ) -> Result<JsValue, JsValue> {
        let geometry: MeasuredGeometry = from_js(geometry)?;
        let picked = self
            .inner
            .select(&geometry, Point::new(x0, y0), Point::new(x1, y1));
        to_js(&picked)
    }

    /// Resolve a drag against the model's own layout at `width` pixels.
    #[wasm_bindgen]
    pub fn select_in_layout(
        &self,
        width: f32,
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
    ) -> Result<JsValue, JsValue> {
        let picked = match self.inner.layout(width) {
            Some(layout) => self
                .inner
                .select(&layout, Point::new(x0, y0), Point::new(x1, y1)),
            None => Vec::new(),
        };
        to_js(&picked)
    }

    // ---- History and dirty state ----

    #[wasm_bindgen]
    pub fn undo(&mut self) -> bool {
        let done = self.inner.undo(now_ms());
        if done {
            self.notify();
        }
        done
    }

    #[wasm_bindgen]
    pub fn redo(&mut self) -> bool {
        let done = self.inner.redo(now_ms());
        if done {
            self.notify();
        }
        done
    }

    #[wasm_bindgen]
    pub fn can_undo(&self) -> bool {
        self.inner.can_undo()
    }

    #[wasm_bindgen]
    pub fn can_redo(&self) -> bool {
        self.inner.can_redo()
    }

    #[wasm_bindgen]
    pub fn is_dirty(&self) -> bool {
        self.inner.is_dirty()
    }

    #[wasm_bindgen]
    pub fn mark_clean(&mut self) {
        self.inner.mark_clean();
    }
}

/// Browser console sink for the `log` facade.
struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format!("[{}] {}", record.level(), record.args()));
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&line),
            log::Level::Warn => web_sys::console::warn_1(&line),
            _ => web_sys::console::log_1(&line),
        }
    }

    fn flush(&self) {}
}

static CONSOLE_LOGGER: ConsoleLogger = ConsoleLogger;

/// Route crate logging to the browser console at `level`
/// (`error`, `warn`, `info`, `debug` or `trace`).
#[wasm_bindgen]
pub fn init_logging(level: &str) {
    let filter = level
        .parse::<log::LevelFilter>()
        .unwrap_or(log::LevelFilter::Warn);
    // A second call only changes the level.
    let _ = log::set_logger(&CONSOLE_LOGGER);
    log::set_max_level(filter);
}
