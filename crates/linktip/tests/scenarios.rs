//! Cross-crate scenarios for render-time resolution.

use linktip_core::{
    needs_two_requests, CategoryIndex, Configuration, MemoryWiki, OnDemandIndex, PrecomputedIndex, RenderSession,
    TooltipQueryHandler,
};
use linktip_shared::{encode_element_id, Namespace, PageTitle, QueryOptions, TooltipQuery};
use std::collections::BTreeSet;

fn title(text: &str) -> PageTitle {
    PageTitle::parse(text).unwrap()
}

fn early_everything() -> Configuration {
    Configuration::from_toml_str(
        "early_target_redirect_follow = true\nearly_page_title_parse = true\nearly_exists_check = true\n",
    )
    .unwrap()
}

fn late_only() -> Configuration {
    Configuration::from_toml_str(
        "early_target_redirect_follow = false\nlate_target_redirect_follow = true\n\
         early_page_title_parse = false\nlate_page_title_parse = true\n\
         early_exists_check = false\nlate_exists_check = true\n",
    )
    .unwrap()
}

#[test]
fn test_scenario_a_early_everything() {
    let mut wiki = MemoryWiki::new();
    wiki.add_page("Tooltip:Foo", "About foo");
    let cfg = early_everything();
    assert!(cfg.category_filter().is_none());

    let session = RenderSession::new(cfg, &wiki, &title("Article"));
    let result = session.pipeline().resolve(&title("Foo")).unwrap();
    assert_eq!(result.tooltip_title.as_deref(), Some("Tooltip:Foo"));
    assert!(!result.is_image);
    assert!(!result.missing_page);
}

#[test]
fn test_scenario_b_empty_title_without_fallback() {
    let wiki = MemoryWiki::new().with_title_template("");
    let session = RenderSession::new(early_everything(), &wiki, &title("Article"));
    assert!(session.fallbacks().empty_title.is_none());
    assert!(session.pipeline().resolve(&title("Foo")).is_none());
}

#[test]
fn test_scenario_c_late_only_needs_two_requests() {
    let cfg = late_only();
    assert!(needs_two_requests(&cfg, true, false, true));

    let mut wiki = MemoryWiki::new();
    wiki.add_page("MediaWiki:To-loading-tooltip", "Loading...");
    let cfg = Configuration {
        missing_page_tooltip: None,
        ..late_only()
    };
    let session = RenderSession::new(cfg, &wiki, &title("Article"));
    assert!(session.negotiation().use_two_request_process);
    assert!(session.client_export().unwrap().loading.is_some());
}

#[test]
fn test_scenario_d_cyclic_tree_counts_once() {
    let mut wiki = MemoryWiki::new();
    wiki.categorize("Category:Level one", "Root");
    wiki.categorize("Category:Level two a", "Level one");
    wiki.categorize("Category:Level two b", "Level one");
    wiki.categorize("Category:Level three", "Level two a");
    // Cycle between two subcategories.
    wiki.categorize("Category:Level two a", "Level two b");
    wiki.categorize("Category:Level two b", "Level two a");
    for (page, category) in [
        ("Top page", "Root"),
        ("Shared page", "Level two a"),
        ("Shared page", "Level two b"),
        ("Deep page", "Level three"),
    ] {
        wiki.categorize(page, category);
    }
    wiki.add_page("Outsider", "");

    let eligible: BTreeSet<_> = [Namespace::MAIN, Namespace::USER].into_iter().collect();
    let index = PrecomputedIndex::build(&wiki, "Root", &eligible).unwrap();
    assert_eq!(index.len(), 3, "Top, Shared and Deep, each once");

    let precomputed = CategoryIndex::Precomputed(index);
    let on_demand = CategoryIndex::OnDemand(OnDemandIndex::new(&wiki, "Root"));
    for page in ["Top page", "Shared page", "Deep page", "Outsider"] {
        let id = wiki.page_id_of(page);
        assert_eq!(
            precomputed.is_member(id).unwrap(),
            on_demand.is_member(id).unwrap(),
            "strategies disagree on {page}"
        );
    }
    assert!(!precomputed.is_member(wiki.page_id_of("Outsider")).unwrap());
}

#[test]
fn test_ineligible_namespace_never_resolves() {
    let mut wiki = MemoryWiki::new();
    wiki.add_page("Tooltip:Help:Foo", "x");
    wiki.add_page("MediaWiki:To-missing-page-tooltip", "missing");
    wiki.add_page("MediaWiki:To-empty-page-name-tooltip", "empty");
    for cfg in [Configuration::default(), early_everything(), late_only()] {
        let session = RenderSession::new(cfg, &wiki, &title("Article"));
        for link in ["Help:Foo", "Template:Foo", "Special:Search", "Media:Foo.png"] {
            assert!(session.pipeline().resolve(&title(link)).is_none(), "{link} resolved");
        }
    }
}

#[test]
fn test_element_id_encoding_deterministic() {
    for input in ["Foo", "Foo bar", "Ünïcode/title", "a_b-c"] {
        let once = encode_element_id(input);
        assert_eq!(once, encode_element_id(input));
        assert!(once.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-'));
    }
}

#[test]
fn test_early_and_late_agree() {
    let mut wiki = MemoryWiki::new();
    wiki.add_page("Tooltip:Foo", "About foo");
    wiki.add_redirect("Old foo", "Foo");
    wiki.add_page("MediaWiki:To-missing-page-tooltip", "missing");
    let cfg = early_everything();
    let session = RenderSession::new(cfg.clone(), &wiki, &title("Article"));
    let handler = TooltipQueryHandler::new(&cfg, &wiki);

    for link in ["Foo", "Old foo", "Ghost"] {
        let early = session.pipeline().resolve(&title(link)).unwrap();
        let late = handler
            .handle(&TooltipQuery {
                target: Some(link.into()),
                tooltip: None,
                options: QueryOptions::parse("follow|title|image|exists").unwrap(),
            })
            .unwrap();
        assert_eq!(early.tooltip_title, late.tooltip_title, "{link}");
        assert_eq!(early.missing_page, late.exists == Some(false), "{link}");
    }
}
