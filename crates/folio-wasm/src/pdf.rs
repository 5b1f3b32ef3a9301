//! PDF export through libraries the host loads on demand.
//!
//! The host passes an object with a `load()` function that makes the
//! rasterizer and assembler available and returns a backend object:
//!
//! ```js
//! {
//!   rasterize(markup, widthPx, scale) -> { width, height, image: Uint8Array },
//!   addPage(image, heightMm),
//!   finish() -> Uint8Array,
//! }
//! ```

use folio_export::{LoadError, PdfBackend, PdfLoader, Raster};
use js_sys::{Function, Reflect, Uint8Array};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

pub struct HostPdfLoader {
    host: JsValue,
    backend: Option<HostPdfBackend>,
}

impl HostPdfLoader {
    pub fn new(host: JsValue) -> Self {
        Self {
            host,
            backend: None,
        }
    }
}

impl PdfLoader for HostPdfLoader {
    fn ensure_loaded(&mut self) -> Result<&mut dyn PdfBackend, LoadError> {
        if self.backend.is_none() {
            let load = method(&self.host, "load").map_err(LoadError)?;
            let object = load
                .call0(&self.host)
                .map_err(|e| LoadError(format!("load() threw: {e:?}")))?;
            let backend = HostPdfBackend {
                rasterize: method(&object, "rasterize").map_err(LoadError)?,
                add_page: method(&object, "addPage").map_err(LoadError)?,
                finish: method(&object, "finish").map_err(LoadError)?,
                object,
            };
            log::debug!("PDF libraries loaded");
            self.backend = Some(backend);
        }
        match self.backend.as_mut() {
            Some(b) => Ok(b),
            None => Err(LoadError("PDF backend missing after load".into())),
        }
    }
}

struct HostPdfBackend {
    object: JsValue,
    rasterize: Function,
    add_page: Function,
    finish: Function,
}

impl PdfBackend for HostPdfBackend {
    fn rasterize(&mut self, markup: &str, width_px: f64, scale: f64) -> Result<Raster, String> {
        let out = self
            .rasterize
            .call3(
                &self.object,
                &JsValue::from_str(markup),
                &JsValue::from_f64(width_px),
                &JsValue::from_f64(scale),
            )
            .map_err(|e| format!("{e:?}"))?;
        let number = |key: &str| {
            Reflect::get(&out, &JsValue::from_str(key))
                .ok()
                .and_then(|v| v.as_f64())
                .ok_or_else(|| format!("raster has no {key}"))
        };
        let image = Reflect::get(&out, &JsValue::from_str("image"))
            .map_err(|e| format!("{e:?}"))?
            .dyn_into::<Uint8Array>()
            .map_err(|_| "raster image is not a Uint8Array".to_string())?;
        Ok(Raster {
            width_px: number("width")? as u32,
            height_px: number("height")? as u32,
            image: image.to_vec(),
        })
    }

    fn add_page(&mut self, raster: &Raster, height_mm: f64) -> Result<(), String> {
        let image = Uint8Array::from(raster.image.as_slice());
        self.add_page
            .call2(&self.object, &image, &JsValue::from_f64(height_mm))
            .map(|_| ())
            .map_err(|e| format!("{e:?}"))
    }

    fn finish(&mut self) -> Result<Vec<u8>, String> {
        let out = self
            .finish
            .call0(&self.object)
            .map_err(|e| format!("{e:?}"))?;
        out.dyn_into::<Uint8Array>()
            .map(|bytes| bytes.to_vec())
            .map_err(|_| "finish() did not return bytes".to_string())
    }
}

fn method(object: &JsValue, name: &str) -> Result<Function, String> {
    Reflect::get(object, &JsValue::from_str(name))
        .ok()
        .and_then(|v| v.dyn_into::<Function>().ok())
        .ok_or_else(|| format!("{name}() is not available"))
}
