//! Pipeline Orchestrator: runs the six stages in order for one host page.
//!
//! Resolve → Extract → Fetch → Canonicalize → Rewrite → Describe, then the
//! staging directory is moved to `<out>/<name>`. Each stage starts only after
//! the previous one produced its full output; the cancel token is checked at
//! every boundary.

mod staging;

use std::fs;
use std::path::{Path, PathBuf};

use crate::canonical::{canonicalize, CanonicalAliases, Role};
use crate::config::WgrabConfig;
use crate::control::CancelToken;
use crate::descriptor::{
    write_descriptor, BundleDescriptor, LAUNCHER_FILE, ORIGINAL_FILE, STANDALONE_FILE,
};
use crate::error::{PipelineError, Stage};
use crate::fetcher::{fetch_all, fetched_paths, FetchResult};
use crate::http::Transport;
use crate::manifest::{extract_manifest, AssetManifest};
use crate::resolver::resolve_embed;
use crate::retry::RetryPolicy;
use crate::rewriter::{launcher_html, rewrite_standalone};
use crate::url_model::{bundle_name_from_url, sanitize_dir_name};

/// What to grab and where to put it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleRequest {
    /// Absolute host page URL.
    pub source_url: String,
    /// Directory the bundle directory is created in.
    pub out_root: PathBuf,
    /// Bundle directory name; derived from `source_url` when `None`.
    pub name: Option<String>,
}

impl BundleRequest {
    pub fn new(source_url: impl Into<String>, out_root: impl Into<PathBuf>) -> Self {
        Self {
            source_url: source_url.into(),
            out_root: out_root.into(),
            name: None,
        }
    }

    /// Directory-safe bundle name.
    pub fn bundle_name(&self) -> String {
        self.name
            .as_deref()
            .map(sanitize_dir_name)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| bundle_name_from_url(&self.source_url))
    }
}

/// Tunables for a run, usually taken from [`WgrabConfig`].
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub max_concurrent_fetches: usize,
    pub retry: RetryPolicy,
    pub embed_host_fragments: Vec<String>,
    pub strip_script_markers: Vec<String>,
}

impl PipelineOptions {
    pub fn from_config(cfg: &WgrabConfig) -> Self {
        Self {
            max_concurrent_fetches: cfg.max_concurrent_fetches,
            retry: RetryPolicy::from_config(&cfg.retry_config()),
            embed_host_fragments: cfg.embed_host_fragments(),
            strip_script_markers: cfg.strip_script_markers(),
        }
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::from_config(&WgrabConfig::default())
    }
}

/// Outcome of a successful run.
#[derive(Debug)]
pub struct BundleReport {
    pub name: String,
    pub bundle_dir: PathBuf,
    pub embed_url: String,
    /// One entry per manifest reference, in manifest order.
    pub fetch_results: Vec<FetchResult>,
    pub aliases: CanonicalAliases,
    /// Non-fatal problems (unmaterialized references, descriptor failure).
    pub warnings: Vec<String>,
}

impl BundleReport {
    pub fn fetched(&self) -> usize {
        self.fetch_results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.fetch_results.len() - self.fetched()
    }

    pub fn roles(&self) -> Vec<Role> {
        self.aliases.roles().into_iter().collect()
    }
}

/// Embed page and its asset list, without downloading anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestPreview {
    pub embed_url: String,
    pub manifest: AssetManifest,
}

pub struct Pipeline<T: Transport> {
    transport: T,
    options: PipelineOptions,
}

impl<T: Transport> Pipeline<T> {
    pub fn new(transport: T, options: PipelineOptions) -> Self {
        Self { transport, options }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Resolve and Extract only.
    pub fn preview(&self, source_url: &str) -> Result<ManifestPreview, PipelineError> {
        let embed = resolve_embed(
            &self.transport,
            &self.options.retry,
            source_url,
            &self.options.embed_host_fragments,
        )?;
        let manifest = extract_manifest(&embed.url, &embed.markup)?;
        Ok(ManifestPreview {
            embed_url: embed.url,
            manifest,
        })
    }

    /// Runs every stage for `req`.
    ///
    /// On `MissingRequiredRole` the partial bundle is still moved to
    /// `<out>/<name>` for inspection; on any other error nothing is left behind.
    pub fn run(&self, req: &BundleRequest, cancel: &CancelToken) -> Result<BundleReport, PipelineError> {
        let name = req.bundle_name();
        let dest = req.out_root.join(&name);
        tracing::info!(url = %req.source_url, bundle = %name, "grabbing game");

        cancel.check(Stage::Resolve)?;
        let embed = resolve_embed(
            &self.transport,
            &self.options.retry,
            &req.source_url,
            &self.options.embed_host_fragments,
        )?;

        cancel.check(Stage::Extract)?;
        let manifest = extract_manifest(&embed.url, &embed.markup)?;

        cancel.check(Stage::Fetch)?;
        let staging = staging::create(&req.out_root)?;
        let bundle_dir = staging.path();
        write_page(bundle_dir, ORIGINAL_FILE, &embed.markup, Stage::Fetch)?;
        let fetch_results = fetch_all(
            &self.transport,
            &self.options.retry,
            &manifest,
            bundle_dir,
            self.options.max_concurrent_fetches,
            cancel,
        );
        let failed = fetch_results.iter().filter(|r| !r.is_success()).count();
        tracing::info!(
            "downloaded {}/{} assets",
            fetch_results.len() - failed,
            fetch_results.len()
        );

        cancel.check(Stage::Canonicalize)?;
        let aliases = canonicalize(bundle_dir, &fetched_paths(&fetch_results))?;
        // Missing required roles fail the run after pages and descriptor are written.
        let missing = aliases.missing_required();

        cancel.check(Stage::Rewrite)?;
        let mut warnings = Vec::new();
        let page = rewrite_standalone(&embed.markup, &aliases, &self.options.strip_script_markers);
        for slot in &page.unmaterialized {
            warnings.push(format!(
                "{} references Build/{} which was not downloaded",
                STANDALONE_FILE,
                slot.file_name()
            ));
        }
        write_page(bundle_dir, STANDALONE_FILE, &page.markup, Stage::Rewrite)?;
        write_page(bundle_dir, LAUNCHER_FILE, &launcher_html(STANDALONE_FILE), Stage::Rewrite)?;

        cancel.check(Stage::Describe)?;
        let described = BundleDescriptor::collect(bundle_dir, &name, &req.source_url, &embed.url, &aliases)
            .and_then(|d| write_descriptor(bundle_dir, &d));
        if let Err(e) = described {
            tracing::warn!("could not write bundle descriptor: {:#}", e);
            warnings.push(format!("descriptor not written: {:#}", e));
        }

        cancel.check(Stage::Finalize)?;
        let bundle_dir = staging::finalize(staging, &dest)?;
        if !missing.is_empty() {
            tracing::warn!("partial bundle kept at {}", bundle_dir.display());
            return Err(PipelineError::MissingRequiredRole {
                url: req.source_url.clone(),
                missing,
            });
        }
        tracing::info!("game bundle ready at {}", bundle_dir.display());

        Ok(BundleReport {
            name,
            bundle_dir,
            embed_url: embed.url,
            fetch_results,
            aliases,
            warnings,
        })
    }
}

fn write_page(bundle_dir: &Path, file: &str, contents: &str, stage: Stage) -> Result<(), PipelineError> {
    let path = bundle_dir.join(file);
    fs::write(&path, contents).map_err(|e| PipelineError::write(stage, &path, e))?;
    tracing::debug!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::read_descriptor;
    use crate::http::testing::MapTransport;

    const HOST: &str = "https://dev.itch.io/my-game";
    const EMBED: &str = "https://html-classic.itch.zone/html/42/index.html";

    fn host_page() -> String {
        format!(r#"<html><body><div class="game_frame"><iframe src="{EMBED}"></iframe></div></body></html>"#)
    }

    const EMBED_PAGE: &str = r#"<html><head>
<script src="https://static.itch.io/htmlgame.js"></script>
</head><body>
<script src="Build/MyGame.loader.js"></script>
<script>
  var config = {
    dataUrl: "Build/MyGame.data.gz",
    frameworkUrl: "Build/MyGame.framework.js.gz",
    codeUrl: "Build/MyGame.wasm.gz",
  };
  createUnityInstance(canvas, config);
</script>
</body></html>"#;

    fn site() -> MapTransport {
        MapTransport::default()
            .with(HOST, &host_page())
            .with(EMBED, EMBED_PAGE)
            .with("https://html-classic.itch.zone/html/42/Build/MyGame.loader.js", "loader")
            .with("https://html-classic.itch.zone/html/42/Build/MyGame.data.gz", "data")
            .with("https://html-classic.itch.zone/html/42/Build/MyGame.framework.js.gz", "fw")
            .with("https://html-classic.itch.zone/html/42/Build/MyGame.wasm.gz", "wasm")
    }

    fn options() -> PipelineOptions {
        PipelineOptions {
            retry: RetryPolicy::none(),
            ..PipelineOptions::default()
        }
    }

    #[test]
    fn bundle_name_prefers_explicit_name() {
        let mut req = BundleRequest::new(HOST, "/tmp");
        assert_eq!(req.bundle_name(), "my-game");
        req.name = Some("Other Game/2".to_string());
        assert_eq!(req.bundle_name(), "Other_Game_2");
        req.name = Some(String::new());
        assert_eq!(req.bundle_name(), "my-game");
    }

    #[test]
    fn full_run_produces_bundle() {
        let out = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(site(), options());
        let report = pipeline
            .run(&BundleRequest::new(HOST, out.path()), &CancelToken::new())
            .unwrap();

        let dir = out.path().join("my-game");
        assert_eq!(report.bundle_dir, dir);
        assert_eq!(report.embed_url, EMBED);
        assert_eq!(report.fetched(), 4);
        assert_eq!(report.failed(), 0);
        assert_eq!(report.roles(), Role::ALL.to_vec());
        assert!(report.warnings.is_empty());

        for f in ["loader.js", "framework.js.gz", "data.gz", "wasm.gz", "MyGame.loader.js"] {
            assert!(dir.join("Build").join(f).is_file(), "missing {f}");
        }
        assert_eq!(fs::read_to_string(dir.join("index.html")).unwrap(), EMBED_PAGE);
        let standalone = fs::read_to_string(dir.join("standalone.html")).unwrap();
        assert!(standalone.contains(r#"src="Build/loader.js""#));
        assert!(standalone.contains(r#""Build/wasm.gz""#));
        assert!(!standalone.contains("MyGame"));
        assert!(!standalone.contains("htmlgame.js"));
        assert!(fs::read_to_string(dir.join("launcher.html"))
            .unwrap()
            .contains("standalone.html"));

        let d = read_descriptor(&dir).unwrap();
        assert_eq!(d.name, "my-game");
        assert_eq!(d.source_url, HOST);
        assert_eq!(d.embed_url, EMBED);
        assert_eq!(d.checksums.len(), 4);

        // Only the bundle directory is left in the output root.
        let entries: Vec<_> = fs::read_dir(out.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn missing_data_is_a_warning_not_a_failure() {
        let out = tempfile::tempdir().unwrap();
        let mut transport = site();
        transport
            .bodies
            .remove("https://html-classic.itch.zone/html/42/Build/MyGame.data.gz");
        let report = Pipeline::new(transport, options())
            .run(&BundleRequest::new(HOST, out.path()), &CancelToken::new())
            .unwrap();
        assert_eq!(report.fetch_results.len(), 4);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("Build/data.gz"));
    }

    #[test]
    fn missing_loader_keeps_partial_bundle() {
        let out = tempfile::tempdir().unwrap();
        let mut transport = site();
        transport
            .bodies
            .remove("https://html-classic.itch.zone/html/42/Build/MyGame.loader.js");
        let err = Pipeline::new(transport, options())
            .run(&BundleRequest::new(HOST, out.path()), &CancelToken::new())
            .unwrap_err();
        match err {
            PipelineError::MissingRequiredRole { url, missing } => {
                assert_eq!(url, HOST);
                assert_eq!(missing, vec![Role::Loader]);
            }
            other => panic!("unexpected error: {other}"),
        }
        let dir = out.path().join("my-game");
        assert!(dir.join("Build/wasm.gz").is_file());
        assert!(!dir.join("Build/loader.js").exists());
        let standalone = fs::read_to_string(dir.join("standalone.html")).unwrap();
        assert!(standalone.contains(r#"src="Build/loader.js""#));
        assert!(!standalone.contains("MyGame"));
        assert!(dir.join("launcher.html").is_file());
        let d = read_descriptor(&dir).unwrap();
        assert!(!d.roles.contains(&Role::Loader));
        assert_eq!(d.checksums.len(), 3);
    }

    #[test]
    fn embed_not_found_leaves_nothing() {
        let out = tempfile::tempdir().unwrap();
        let transport = MapTransport::default().with(HOST, "<html><body>no game</body></html>");
        let err = Pipeline::new(transport, options())
            .run(&BundleRequest::new(HOST, out.path()), &CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, PipelineError::EmbedNotFound { .. }));
        assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
    }

    #[test]
    fn cancelled_before_start() {
        let out = tempfile::tempdir().unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();
        let transport = site();
        let pipeline = Pipeline::new(transport, options());
        let err = pipeline
            .run(&BundleRequest::new(HOST, out.path()), &cancel)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Cancelled { stage: Stage::Resolve }));
        assert!(pipeline.transport.requested().is_empty());
    }

    #[test]
    fn preview_lists_manifest_without_downloading() {
        let pipeline = Pipeline::new(site(), options());
        let preview = pipeline.preview(HOST).unwrap();
        assert_eq!(preview.embed_url, EMBED);
        let paths: Vec<&str> = preview
            .manifest
            .references()
            .iter()
            .map(|r| r.relative_path.as_str())
            .collect();
        assert_eq!(
            paths,
            vec![
                "Build/MyGame.loader.js",
                "Build/MyGame.data.gz",
                "Build/MyGame.framework.js.gz",
                "Build/MyGame.wasm.gz",
            ]
        );
        assert_eq!(pipeline.transport.requested().len(), 2);
    }
}
