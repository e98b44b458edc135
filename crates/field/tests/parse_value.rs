//! Acceptance flow: type text, wait for the fetched proposals, accept.

use anyhow::Result;
use pretty_assertions::assert_eq;
use smartfield_field::{FetcherConfig, ResolutionErrorKind, SmartField};
use smartfield_jobs::{submit, BlockingCondition};
use smartfield_lookup::{LookupRow, MemorySource};
use std::sync::Arc;
use std::time::Duration;
use tokio::time;

fn field() -> SmartField<i64> {
    let source = Arc::new(MemorySource::new(vec![
        LookupRow::new(1, "aName"),
        LookupRow::new(2, "bName1"),
        LookupRow::new(3, "bName2"),
    ]));
    SmartField::new(
        source,
        FetcherConfig {
            debounce: Duration::ZERO,
            ..Default::default()
        },
    )
}

async fn wait_settled(field: &SmartField<i64>) -> Result<()> {
    let mut snapshots = field.watch_snapshots();
    time::timeout(
        Duration::from_secs(5),
        snapshots.wait_for(|snapshot| !snapshot.resolving),
    )
    .await??;
    Ok(())
}

/// Drives the UI path: search, wait until the fetch result is published,
/// then accept with forced close — the async half is gated on a blocking
/// condition, the way a synchronous caller observes the fetch pipeline.
async fn run_match_case(
    search_text: &str,
    expected_value: Option<i64>,
    expected_display: &str,
    expected_proposals: usize,
    expect_chooser_registered_after: bool,
    expect_validation_error: bool,
) -> Result<()> {
    let field = field();

    let loaded = BlockingCondition::new("load-proposals", true);
    let signal = loaded.clone();
    let mut results = field.subscribe_results();
    submit(async move {
        let _ = results.recv().await;
        signal.set_blocking(false);
    });

    field.search(search_text, false).await;
    loaded.wait_for(Duration::from_secs(5)).await?;
    wait_settled(&field).await?;

    if expected_proposals > 0 {
        assert!(field.is_chooser_registered());
        assert_eq!(field.proposal_row_count(), expected_proposals);
    }
    assert_eq!(field.display_text(), search_text);
    assert_eq!(field.value(), None);

    field.accept_proposal(search_text, true).await;
    assert_eq!(
        field.is_chooser_registered(),
        expect_chooser_registered_after
    );

    if expect_validation_error {
        assert!(field.error_status().is_some());
        assert_eq!(field.display_text(), search_text);
        assert_eq!(field.value(), None);
        assert!(field.current_lookup_row().is_none());
    } else {
        assert_eq!(field.error_status(), None);
        assert_eq!(field.display_text(), expected_display);
        assert_eq!(field.value(), expected_value);
        assert!(field.current_lookup_row().is_some());
    }
    Ok(())
}

#[tokio::test]
async fn single_match_settles_on_the_row() -> Result<()> {
    run_match_case("a", Some(1), "aName", 1, false, false).await
}

#[tokio::test]
async fn multi_match_reports_ambiguity_and_keeps_the_chooser() -> Result<()> {
    run_match_case("b", None, "", 2, true, true).await
}

#[tokio::test]
async fn no_match_settles_invalid_with_closed_chooser() -> Result<()> {
    run_match_case("c", None, "", 0, false, true).await
}

#[tokio::test]
async fn set_value_resolves_the_backing_row() {
    let field = field();
    field.set_value(1).await;

    assert!(field.current_lookup_row().is_some());
    assert_eq!(field.value(), Some(1));
    assert_eq!(field.display_text(), "aName");
    assert_eq!(field.error_status(), None);
}

#[tokio::test]
async fn set_value_without_backing_row_is_trusted() {
    let field = field();
    field.set_value(99).await;

    assert_eq!(field.value(), Some(99));
    assert!(field.current_lookup_row().is_none());
    assert_eq!(field.display_text(), "99");
    assert_eq!(field.error_status(), None);
}

#[tokio::test]
async fn parse_and_set_value_resolves_like_the_ui_path() {
    let field = field();
    field.parse_and_set_value("aName").await;

    assert!(field.current_lookup_row().is_some());
    assert_eq!(field.value(), Some(1));
    assert_eq!(field.display_text(), "aName");
}

#[tokio::test]
async fn invalid_parse_sets_error_status_until_resolved() {
    let field = field();
    field.parse_and_set_value("FooBar").await;

    assert!(field.current_lookup_row().is_none());
    let status = field.error_status().expect("expected a validation error");
    assert_eq!(status.kind(), &ResolutionErrorKind::NoMatch);

    // When the text becomes resolvable again, the error must be removed.
    field.parse_and_set_value("aName").await;
    assert_eq!(field.error_status(), None);
    assert_eq!(field.value(), Some(1));
}

#[tokio::test]
async fn ambiguous_parse_opens_the_chooser() {
    let field = field();
    field.parse_and_set_value("b").await;

    assert_eq!(field.value(), None);
    assert!(field.is_chooser_open());
    assert_eq!(field.proposal_row_count(), 2);
    let status = field.error_status().expect("expected a validation error");
    assert_eq!(
        status.kind(),
        &ResolutionErrorKind::AmbiguousMatch { candidates: 2 }
    );

    // An exact acceptance against the open chooser resolves the ambiguity.
    field.accept_proposal("bName2", true).await;
    assert_eq!(field.value(), Some(3));
    assert_eq!(field.display_text(), "bName2");
    assert_eq!(field.error_status(), None);
    assert!(!field.is_chooser_registered());
}
