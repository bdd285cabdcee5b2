//! Configuration scan: asset paths named by keys of the inline loader config.
//!
//! Handles both literal values (`dataUrl: "Build/G.data.gz"`) and the
//! template idiom that concatenates a string variable
//! (`var buildUrl = "Build"; ... dataUrl: buildUrl + "/G.data.gz"`).

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use scraper::{Html, Selector};

use super::ASSET_ROOT_PREFIX;

fn key_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?x)
            \b(?:loaderUrl|frameworkUrl|dataUrl|codeUrl)["']?\s*[:=]\s*
            (?:
                "([^"\n]*)" | '([^'\n]*)'
              | ([A-Za-z_$][\w$]*)\s*\+\s*(?: "([^"\n]*)" | '([^'\n]*)' )
            )"#,
        )
        .expect("valid config key regex")
    })
}

fn string_var_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\b(?:var|let|const)\s+([A-Za-z_$][\w$]*)\s*=\s*(?:"([^"\n]*)"|'([^'\n]*)')"#)
            .expect("valid string variable regex")
    })
}

fn group<'t>(caps: &Captures<'t>, a: usize, b: usize) -> Option<&'t str> {
    caps.get(a).or_else(|| caps.get(b)).map(|m| m.as_str())
}

/// Text of every inline (`src`-less) script element, in document order.
fn inline_scripts(markup: &str) -> Vec<String> {
    let doc = Html::parse_document(markup);
    let Ok(selector) = Selector::parse("script") else {
        return Vec::new();
    };
    doc.select(&selector)
        .filter(|el| el.value().attr("src").is_none())
        .map(|el| el.text().collect::<String>())
        .filter(|text| !text.trim().is_empty())
        .collect()
}

/// Scans one script body. Only values under the asset root are returned.
pub(crate) fn scan_script_text(script: &str) -> Vec<String> {
    let vars: HashMap<&str, &str> = string_var_pattern()
        .captures_iter(script)
        .filter_map(|c| Some((c.get(1)?.as_str(), group(&c, 2, 3)?)))
        .collect();

    key_pattern()
        .captures_iter(script)
        .filter_map(|caps| {
            if let Some(literal) = group(&caps, 1, 2) {
                return Some(literal.trim().to_string());
            }
            let var = caps.get(3)?.as_str();
            let suffix = group(&caps, 4, 5)?;
            let prefix = vars.get(var)?;
            Some(format!("{}{}", prefix, suffix).trim().to_string())
        })
        .filter(|path| path.starts_with(ASSET_ROOT_PREFIX))
        .collect()
}

/// Returns asset paths found in the inline loader configuration, in document order.
pub fn scan_inline_config(markup: &str) -> Vec<String> {
    inline_scripts(markup)
        .iter()
        .flat_map(|script| scan_script_text(script))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_values_with_either_quote() {
        let script = r#"
            var config = {
              dataUrl: "Build/G.data.gz",
              frameworkUrl: 'Build/G.framework.js.gz',
              "codeUrl": "Build/G.wasm.gz",
              streamingAssetsUrl: "StreamingAssets",
            };
        "#;
        assert_eq!(
            scan_script_text(script),
            vec!["Build/G.data.gz", "Build/G.framework.js.gz", "Build/G.wasm.gz"]
        );
    }

    #[test]
    fn values_outside_asset_root_are_rejected() {
        let script = r#"{ dataUrl: "https://cdn.example/G.data", codeUrl: "other/G.wasm" }"#;
        assert!(scan_script_text(script).is_empty());
    }

    #[test]
    fn build_url_concatenation_is_expanded() {
        let script = r#"
            var buildUrl = "Build";
            var loaderUrl = buildUrl + "/My Game.loader.js";
            var config = {
              dataUrl: buildUrl + "/My Game.data.gz",
              frameworkUrl: buildUrl + "/My Game.framework.js.gz",
              codeUrl: unknownVar + "/x.wasm",
            };
        "#;
        assert_eq!(
            scan_script_text(script),
            vec![
                "Build/My Game.loader.js",
                "Build/My Game.data.gz",
                "Build/My Game.framework.js.gz"
            ]
        );
    }

    #[test]
    fn only_inline_scripts_are_scanned() {
        let markup = r#"
            <script src="Build/G.loader.js">dataUrl: "Build/ignored.data"</script>
            <p>dataUrl: "Build/text.data"</p>
            <script>var c = { codeUrl: "Build/G.wasm" };</script>
        "#;
        assert_eq!(scan_inline_config(markup), vec!["Build/G.wasm"]);
    }
}
