//! # Golden Path
//!
//! Renders a small sample wiki under several configurations and replays
//! hovers through the client runtime, checking what ends up on screen.
//!
//! ```text
//! MemoryWiki ─► render_page ─► annotations + export JSON
//!                                   │
//!                                   ▼
//!           TooltipRuntime ◄─► InProcessTransport ─► TooltipQueryHandler
//!                 │
//!                 ▼
//!          RecordingDisplay  ◄── checked here
//! ```

use std::sync::Arc;
use std::time::Instant;

use linktip_client::{DisplayEvent, RecordingDisplay, TooltipPhase, TooltipRuntime};
use linktip_core::{Configuration, CoreResult, MemoryWiki};
use linktip_shared::{ClientExport, ElementId, Namespace, PageTitle};

use crate::page::{render_page, RenderedPage};
use crate::transport::InProcessTransport;

type Runtime = TooltipRuntime<InProcessTransport<MemoryWiki>, RecordingDisplay>;

/// Result of one golden path scenario.
#[derive(Clone, Debug)]
pub struct GoldenPathResult {
    /// Scenario name.
    pub name: &'static str,
    /// Whether every check passed.
    pub passed: bool,
    /// Wall time for render plus hovers, in microseconds.
    pub elapsed_us: u128,
    /// Failed checks, or a summary when everything passed.
    pub details: String,
}

/// Sample wiki shared by every scenario.
#[must_use]
pub fn sample_wiki() -> MemoryWiki {
    let mut wiki = MemoryWiki::new();
    wiki.add_page("MediaWiki:To-loading-tooltip", "Loading $1...");
    wiki.add_page("MediaWiki:To-missing-page-tooltip", "No tooltip for $1");
    wiki.add_page("Tooltip:Foo", "Foo is a [[Bar]]-like thing.");
    wiki.add_page("Tooltip:Bar", "About bar");
    wiki.add_page("Bar", "");
    wiki.categorize("Foo", "Tooltipped");
    wiki.add_redirect("Old foo", "Foo");
    wiki.add_page("Article", "See [[Foo]], [[Old foo]], [[Bar]] and [[Ghost]].");
    wiki
}

struct Scenario {
    runtime: Runtime,
    page: RenderedPage,
    checks: Vec<String>,
}

impl Scenario {
    fn start(config: Configuration) -> CoreResult<Self> {
        let wiki = Arc::new(sample_wiki());
        let title = PageTitle::new(Namespace::MAIN, "Article");
        let page = render_page(config.clone(), wiki.as_ref(), &title)?;
        let mut checks = Vec::new();
        let export = match page.export() {
            Ok(Some(export)) => export,
            Ok(None) => {
                checks.push("tooltips inactive on the article".into());
                ClientExport::default()
            }
            Err(error) => {
                checks.push(format!("export does not decode: {error}"));
                ClientExport::default()
            }
        };
        let transport = InProcessTransport::new(Arc::new(config), wiki);
        let runtime = TooltipRuntime::new(export, transport, RecordingDisplay::new());
        runtime.register_all(&page.annotations);
        Ok(Self { runtime, page, checks })
    }

    fn id(name: &str) -> ElementId {
        ElementId::from_title(&PageTitle::new(Namespace::MAIN, name))
    }

    async fn hover(&self, name: &str) {
        let id = Self::id(name);
        self.runtime.pointer_enter(&id).await;
        self.runtime.pointer_leave(&id);
    }

    fn expect(&mut self, ok: bool, what: impl Into<String>) {
        if !ok {
            self.checks.push(what.into());
        }
    }

    fn expect_phase(&mut self, name: &str, phase: TooltipPhase) {
        let actual = self.runtime.phase(&Self::id(name));
        self.expect(actual == Some(phase), format!("{name}: expected {phase:?}, got {actual:?}"));
    }

    fn expect_html(&mut self, name: &str, html: &str) {
        let id = Self::id(name);
        let actual = self.runtime.with_display(|d| d.html(&id).map(str::to_string));
        self.expect(actual.as_deref() == Some(html), format!("{name}: expected {html:?}, got {actual:?}"));
    }

    fn finish(self, name: &'static str, started: Instant) -> GoldenPathResult {
        let passed = self.checks.is_empty();
        let details = if passed {
            format!(
                "{} links, {} requests",
                self.page.annotations.len(),
                self.runtime.transport().requests()
            )
        } else {
            self.checks.join("; ")
        };
        GoldenPathResult {
            name,
            passed,
            elapsed_us: started.elapsed().as_micros(),
            details,
        }
    }
}

fn config(toml: &str) -> CoreResult<Configuration> {
    Configuration::from_toml_str(toml)
}

/// Golden path runner.
#[derive(Debug, Default)]
pub struct GoldenPath {
    results: Vec<GoldenPathResult>,
}

impl GoldenPath {
    /// Creates a runner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs every scenario on a current-thread runtime.
    pub fn run_all(&mut self) {
        let runtime = match tokio::runtime::Builder::new_current_thread().enable_time().build() {
            Ok(runtime) => runtime,
            Err(error) => {
                self.results.push(GoldenPathResult {
                    name: "runtime",
                    passed: false,
                    elapsed_us: 0,
                    details: error.to_string(),
                });
                return;
            }
        };
        runtime.block_on(async {
            self.record("early everything", Self::early_everything()).await;
            self.record("late title, two requests", Self::late_two_request()).await;
            self.record("late category filter", Self::late_category_filter()).await;
            self.record("redirects share a tooltip", Self::shared_redirect()).await;
        });
    }

    async fn record(
        &mut self,
        name: &'static str,
        scenario: impl std::future::Future<Output = CoreResult<(Scenario, Instant)>>,
    ) {
        let result = match scenario.await {
            Ok((scenario, started)) => scenario.finish(name, started),
            Err(error) => GoldenPathResult {
                name,
                passed: false,
                elapsed_us: 0,
                details: error.to_string(),
            },
        };
        self.results.push(result);
    }

    async fn early_everything() -> CoreResult<(Scenario, Instant)> {
        let started = Instant::now();
        let mut s = Scenario::start(Configuration::default())?;
        s.expect_phase("Ghost", TooltipPhase::Loaded);
        s.expect_html("Ghost", "No tooltip for Ghost");

        s.hover("Foo").await;
        s.expect_phase("Foo", TooltipPhase::Loaded);
        s.expect_html("Foo", "Foo is a <a href=\"Bar\">Bar</a>-like thing.");
        let requests = s.runtime.transport().requests();
        s.expect(requests == 1, format!("expected 1 request, saw {requests}"));
        Ok((s, started))
    }

    async fn late_two_request() -> CoreResult<(Scenario, Instant)> {
        let started = Instant::now();
        let mut s = Scenario::start(config(
            "early_page_title_parse = false\nlate_page_title_parse = true\nlate_exists_check = true\nmissing_page_tooltip = \"\"\n",
        )?)?;
        s.hover("Ghost").await;
        s.expect_phase("Ghost", TooltipPhase::Removed);
        let ghost = Scenario::id("Ghost");
        let flashed = s.runtime.with_display(|d| {
            d.events()
                .iter()
                .any(|e| matches!(e, DisplayEvent::Show(id) if *id == ghost))
        });
        s.expect(!flashed, "Ghost showed a loading tooltip before being removed");

        s.hover("Foo").await;
        s.expect_phase("Foo", TooltipPhase::Loaded);
        s.expect_html("Foo", "Foo is a <a href=\"Bar\">Bar</a>-like thing.");
        let requests = s.runtime.transport().requests();
        s.expect(requests == 3, format!("expected 3 requests, saw {requests}"));
        Ok((s, started))
    }

    async fn late_category_filter() -> CoreResult<(Scenario, Instant)> {
        let started = Instant::now();
        let mut s = Scenario::start(config("late_category_filtering = true\nenabling_category = \"Tooltipped\"\n")?)?;
        s.hover("Bar").await;
        s.expect_phase("Bar", TooltipPhase::Removed);
        s.hover("Foo").await;
        s.expect_phase("Foo", TooltipPhase::Loaded);
        Ok((s, started))
    }

    async fn shared_redirect() -> CoreResult<(Scenario, Instant)> {
        let started = Instant::now();
        let mut s = Scenario::start(Configuration::default())?;
        let foo = s.page.annotations.iter().filter(|a| a.element_id == Scenario::id("Foo")).count();
        s.expect(foo == 2, format!("expected [[Foo]] and [[Old foo]] to share id Foo, found {foo}"));
        s.expect(
            s.runtime.phase(&Scenario::id("Old foo")).is_none(),
            "redirect got its own tooltip",
        );
        Ok((s, started))
    }

    /// Prints the results.
    pub fn print_results(&self) {
        println!();
        println!("╔══════════════════════════════════════════════════════════════════╗");
        println!("║                 LINKTIP GOLDEN PATH                              ║");
        println!("╚══════════════════════════════════════════════════════════════════╝");
        for result in &self.results {
            let status = if result.passed { "✓ PASS" } else { "✗ FAIL" };
            println!("┌─ {}", result.name);
            println!("│ Status:  {status}");
            println!("│ Time:    {}μs", result.elapsed_us);
            println!("│ Details: {}", result.details);
            println!("└──────────────────────────────────────────────────────────────────");
        }
        if self.all_passed() {
            println!("✓ ALL SCENARIOS PASSED");
        } else {
            println!("✗ SOME SCENARIOS FAILED");
        }
    }

    /// Results so far.
    #[must_use]
    pub fn results(&self) -> &[GoldenPathResult] {
        &self.results
    }

    /// True if every scenario passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        !self.results.is_empty() && self.results.iter().all(|r| r.passed)
    }
}
