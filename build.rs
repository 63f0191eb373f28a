// build.rs

// Generates the `t!` macro from `locales/<lang>.toml`. Keys missing from the selected
// language fall back to `locales/en.toml`; unknown keys are a compile error.

use std::collections::BTreeMap;
use std::env;
use std::error::Error;
use std::fs;
use std::path::Path;

const FALLBACK_LANG: &str = "en";

/// A `lang_*` feature wins over `TARGETCFG_LANG`. English otherwise.
fn selected_lang() -> String {
    let mut features: Vec<String> = env::vars()
        .filter_map(|(key, _)| {
            key.strip_prefix("CARGO_FEATURE_LANG_")
                .map(str::to_lowercase)
        })
        .collect();
    features.sort();

    match features.first() {
        Some(first) => {
            if features.len() > 1 {
                println!(
                    "cargo:warning=Multiple language features enabled ({:?}). Using '{}'.",
                    features, first
                );
            }
            first.clone()
        }
        None => env::var("TARGETCFG_LANG").unwrap_or_else(|_| FALLBACK_LANG.to_string()),
    }
}

fn read_locale(path: &str) -> Result<BTreeMap<String, String>, Box<dyn Error>> {
    let content = fs::read_to_string(path).map_err(|e| format!("cannot read {path}: {e}"))?;
    Ok(toml::from_str(&content).map_err(|e| format!("cannot parse {path}: {e}"))?)
}

fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-env-changed=TARGETCFG_LANG");
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=locales/");

    let lang = selected_lang();
    let mut translations = read_locale(&format!("locales/{FALLBACK_LANG}.toml"))?;
    if lang != FALLBACK_LANG {
        let path = format!("locales/{lang}.toml");
        if Path::new(&path).exists() {
            translations.extend(read_locale(&path)?);
        } else {
            println!("cargo:warning=Language file '{path}' not found. Falling back to '{FALLBACK_LANG}'.");
        }
    }

    let mut macro_code = String::from("#[macro_export]\nmacro_rules! t {\n");
    for (key, value) in &translations {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        macro_code.push_str(&format!("    (\"{key}\") => {{ \"{escaped}\" }};\n"));
    }
    macro_code.push_str(
        "    ($key:expr) => {{ compile_error!(concat!(\"Missing translation key: \", $key)) }};\n}\n",
    );

    let out_dir = env::var("OUT_DIR")?;
    fs::write(Path::new(&out_dir).join("translations.rs"), macro_code)?;
    Ok(())
}
