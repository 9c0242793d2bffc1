//! TypeScript/JSX transpilation through an external [`Transpiler`].
//!
//! Widgets run as function bodies, not modules, so the default export of the
//! transpiled module is turned into a `return`.

use bosw_core::{Diagnostic, StageOutput, Transpiler, TranspilerOptions};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};

pub const STAGE_ID: &str = "transpile.typescript";

static HAS_DEFAULT_EXPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"export\s+default\s").expect("default export pattern is valid"));
static DEFAULT_EXPORT_IDENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"export\s+default\s+(\w+);").expect("named default export pattern is valid")
});
static DEFAULT_EXPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"export\s+default\s+").expect("default export prefix is valid"));

/// Strip types, keep JSX as written and leave module syntax alone.
pub fn default_transpiler_options() -> TranspilerOptions {
    match json!({
        "transforms": ["typescript", "jsx"],
        "jsxRuntime": "preserve",
        "enableLegacyBabel5ModuleInterop": true,
        "disableESTransforms": true,
    }) {
        Value::Object(options) => options,
        _ => TranspilerOptions::new(),
    }
}

/// Default options extended with `compilerOptions` from a tsconfig document.
pub fn transpiler_options(ts_config: Option<&Value>) -> TranspilerOptions {
    let mut options = default_transpiler_options();
    if let Some(Value::Object(compiler_options)) =
        ts_config.and_then(|config| config.get("compilerOptions"))
    {
        options.extend(compiler_options.clone());
    }
    options
}

pub async fn transpile_typescript(
    code: &str,
    transpiler: &dyn Transpiler,
    ts_config: Option<&Value>,
) -> StageOutput {
    let options = transpiler_options(ts_config);

    let mut logs = Vec::new();
    let transpiled = match transpiler.transform(code, &options).await {
        Ok(transpiled) => transpiled,
        Err(e) => {
            tracing::warn!(stage = STAGE_ID, error = %e, "transpiler failed");
            let message = if e.message.is_empty() {
                "Something went wrong while transpiling TypeScript".to_string()
            } else {
                e.message
            };
            logs.push(Diagnostic::error(message));
            code.to_string()
        }
    };

    // The untranspiled text still has to run as a function body.
    if !HAS_DEFAULT_EXPORT.is_match(&transpiled) {
        logs.push(Diagnostic::warn("No default export found"));
    }

    StageOutput {
        code: rewrite_default_export(&transpiled),
        logs,
    }
}

/// `export default App;` becomes `return App(props);`; any other default
/// export just loses its `export default` prefix in favour of `return`.
pub fn rewrite_default_export(code: &str) -> String {
    let code = DEFAULT_EXPORT_IDENT.replace(code, "return ${1}(props);");
    DEFAULT_EXPORT.replace(&code, "return ").into_owned()
}
