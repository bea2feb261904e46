use std::collections::BTreeMap;
use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

const BASE_LOCALE: &str = "locales/en.toml";

fn main() {
    let lang = selected_language();
    println!("cargo:rustc-env=ALIASCTL_LANG_EFFECTIVE={}", lang);
    println!("cargo:rerun-if-env-changed=ALIASCTL_LANG");
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=locales/");

    let mut messages = read_locale(BASE_LOCALE)
        .unwrap_or_else(|| panic!("Base locale '{}' is missing", BASE_LOCALE));
    if lang != "en" {
        let path = format!("locales/{}.toml", lang);
        match read_locale(&path) {
            Some(overrides) => messages.extend(overrides),
            None => println!("cargo:warning=No '{}', messages stay in English.", path),
        }
    }

    let out_dir = env::var("OUT_DIR").expect("cargo sets OUT_DIR");
    fs::write(
        Path::new(&out_dir).join("translations.rs"),
        render_macro(&messages),
    )
    .expect("could not write translations.rs");
}

/// A `lang_*` feature wins over `ALIASCTL_LANG`; English is the default.
fn selected_language() -> String {
    let mut features: Vec<String> = env::vars()
        .filter_map(|(key, _)| {
            key.strip_prefix("CARGO_FEATURE_LANG_")
                .map(str::to_lowercase)
        })
        .collect();
    features.sort();

    match features.as_slice() {
        [] => env::var("ALIASCTL_LANG").unwrap_or_else(|_| "en".to_string()),
        [only] => only.clone(),
        [first, ..] => {
            println!(
                "cargo:warning=Several language features enabled ({:?}), using '{}'.",
                features, first
            );
            first.clone()
        }
    }
}

/// `None` when the file does not exist; a file that exists but does not parse aborts the build.
fn read_locale(path: &str) -> Option<BTreeMap<String, String>> {
    let content = fs::read_to_string(path).ok()?;
    Some(toml::from_str(&content).unwrap_or_else(|e| panic!("Invalid locale '{}': {}", path, e)))
}

/// One `t!` arm per key, each expanding to a string literal so it can be used as a format
/// string. Unknown keys fail to compile.
fn render_macro(messages: &BTreeMap<String, String>) -> String {
    let mut code = String::from("#[macro_export]\nmacro_rules! t {\n");
    for (key, value) in messages {
        let literal = value.replace('\\', "\\\\").replace('"', "\\\"");
        let _ = writeln!(code, "    (\"{}\") => {{ \"{}\" }};", key, literal);
    }
    code.push_str(
        "    ($key:expr) => {{ compile_error!(concat!(\"Missing translation key: \", $key)) }};\n",
    );
    code.push('}');
    code
}
