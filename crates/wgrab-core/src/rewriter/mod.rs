//! Bundle Rewriter: turns the embed markup into a host-independent page.
//!
//! Two textual passes over the original markup:
//!
//! 1. drop `<script>` elements whose opening tag names a host marker
//!    (`itch.io`, `htmlgame.js`); those scripts only work on the host site;
//! 2. replace every build asset reference with its canonical name, so the
//!    page loads `Build/loader.js` instead of `Build/MyGame.loader.js`.
//!
//! Substitution is pattern-based and does not consult the manifest.

mod launcher;

pub use launcher::launcher_html;

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::canonical::{classify, CanonicalAliases, CanonicalName};
use crate::manifest::ASSET_ROOT_PREFIX;

/// Standalone page produced by [`rewrite_standalone`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandalonePage {
    pub markup: String,
    /// Number of host scripts removed.
    pub stripped_scripts: usize,
    /// Number of asset references replaced.
    pub rewritten_refs: usize,
    /// Canonical names referenced by the page that were never materialized.
    pub unmaterialized: BTreeSet<CanonicalName>,
}

/// `Build/<anything>.<role marker><.gz and/or query>` inside attribute values or string literals.
fn asset_ref_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?i)Build/[^"'<>`\r\n]*?\.(?:loader\.js|framework\.js|data|wasm)[^"'<>`\s]*"#,
        )
        .expect("valid asset reference regex")
    })
}

/// `+ "/<anything>.<role marker>..."`: the file half of `buildUrl + "/MyGame.data.gz"`.
fn concat_ref_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?i)\+\s*(["'])/([^"'<>`/\r\n]*?\.(?:loader\.js|framework\.js|data|wasm)[^"'<>`\s/]*)(["'])"#,
        )
        .expect("valid concatenated reference regex")
    })
}

/// Matches a whole `<script ...>...</script>` element whose opening tag contains one of `markers`.
fn strip_regex(markers: &[String]) -> Option<Regex> {
    let alternatives: Vec<String> = markers
        .iter()
        .filter(|m| !m.is_empty())
        .map(|m| regex::escape(m))
        .collect();
    if alternatives.is_empty() {
        return None;
    }
    let pattern = format!(
        r"(?is)<script[^>]*(?:{})[^>]*>.*?</script>",
        alternatives.join("|")
    );
    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!("invalid script strip markers: {}", e);
            None
        }
    }
}

/// Removes host scripts. Returns the new markup and the number of removed elements.
pub fn strip_host_scripts(markup: &str, markers: &[String]) -> (String, usize) {
    let Some(re) = strip_regex(markers) else {
        return (markup.to_string(), 0);
    };
    let count = re.find_iter(markup).count();
    (re.replace_all(markup, "").into_owned(), count)
}

/// Replaces build asset references with canonical names.
/// Returns the new markup and the canonical names that were substituted, one per reference.
pub fn rewrite_asset_refs(markup: &str) -> (String, Vec<CanonicalName>) {
    let mut used = Vec::new();
    let direct = asset_ref_regex().replace_all(markup, |caps: &Captures| {
        let matched = &caps[0];
        match classify(matched) {
            Some(slot) => {
                used.push(slot);
                format!("{}{}", ASSET_ROOT_PREFIX, slot.file_name())
            }
            None => matched.to_string(),
        }
    });
    let rewritten = concat_ref_regex().replace_all(&direct, |caps: &Captures| match classify(&caps[2]) {
        Some(slot) => {
            used.push(slot);
            format!("+ {}/{}{}", &caps[1], slot.file_name(), &caps[3])
        }
        None => caps[0].to_string(),
    });
    (rewritten.into_owned(), used)
}

/// Builds the standalone page from the original embed markup.
///
/// `aliases` is only consulted to warn about references to canonical files
/// that do not exist in the bundle (the asset failed or was never listed).
pub fn rewrite_standalone(
    markup: &str,
    aliases: &CanonicalAliases,
    strip_markers: &[String],
) -> StandalonePage {
    let (stripped, stripped_scripts) = strip_host_scripts(markup, strip_markers);
    let (markup, used) = rewrite_asset_refs(&stripped);

    let unmaterialized: BTreeSet<CanonicalName> = used
        .iter()
        .filter(|slot| aliases.get(slot).is_none())
        .copied()
        .collect();
    for slot in &unmaterialized {
        tracing::warn!(
            "standalone page references {}{} but no {} file was materialized",
            ASSET_ROOT_PREFIX,
            slot.file_name(),
            slot.role
        );
    }
    tracing::debug!(
        stripped = stripped_scripts,
        rewritten = used.len(),
        "standalone page rewritten"
    );

    StandalonePage {
        markup,
        stripped_scripts,
        rewritten_refs: used.len(),
        unmaterialized,
    }
}
