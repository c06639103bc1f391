//! WebAssembly bindings for the Moa type checker.

use wasm_bindgen::prelude::*;

use crate::error::MoaError;
use crate::infer::convert;
use crate::parser::parse_source;
use crate::parser::pretty::print_program;

/// Result of type checking, read from JS through getters.
#[wasm_bindgen]
pub struct CheckResult {
    success: bool,
    output: String,
    program_type: String,
    errors: Vec<JsValue>,
}

#[wasm_bindgen]
impl CheckResult {
    #[wasm_bindgen(getter)]
    pub fn success(&self) -> bool {
        self.success
    }

    #[wasm_bindgen(getter)]
    pub fn output(&self) -> String {
        self.output.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn program_type(&self) -> String {
        self.program_type.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn errors(&self) -> Vec<JsValue> {
        self.errors.clone()
    }
}

impl CheckResult {
    fn failed(error: &MoaError) -> Self {
        CheckResult {
            success: false,
            output: String::new(),
            program_type: String::new(),
            errors: vec![format_error(error)],
        }
    }
}

/// Format an error into `{ message, start, end }` for JS.
fn format_error(error: &MoaError) -> JsValue {
    let span = error.span();
    let obj = js_sys::Object::new();
    // Setting a property on a fresh plain object cannot fail
    let _ = js_sys::Reflect::set(&obj, &"message".into(), &error.to_string().into());
    let _ = js_sys::Reflect::set(&obj, &"start".into(), &JsValue::from_f64(span.start as f64));
    let _ = js_sys::Reflect::set(&obj, &"end".into(), &JsValue::from_f64(span.end as f64));
    obj.into()
}

/// Initialize the WASM module (call once at startup).
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Type check Moa source code and return the result.
#[wasm_bindgen]
pub fn check_types(source: &str) -> CheckResult {
    let typed = match parse_source(source).and_then(|program| convert(&program)) {
        Ok(typed) => typed,
        Err(e) => return CheckResult::failed(&e),
    };

    CheckResult {
        success: true,
        output: print_program(&typed),
        program_type: typed.ty.clone().unwrap_or_default(),
        errors: Vec::new(),
    }
}
