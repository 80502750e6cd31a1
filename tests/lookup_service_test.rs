//! Tests for LookupService

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rstest::rstest;

use seglist::application::{ApplicationError, LookupService};
use seglist::config::LookupConfig;
use seglist::domain::{ColumnCandidate, SourceCandidate, SourceRef};
use seglist::infrastructure::traits::SourceCatalog;
use seglist::infrastructure::TomlSourceCatalog;

/// Catalog that answers with `count` numbered candidates and counts calls.
#[derive(Default)]
struct CountingCatalog {
    count: usize,
    calls: AtomicUsize,
}

impl SourceCatalog for CountingCatalog {
    fn suggest(
        &self,
        term: &str,
        _schema: &str,
        _limit: usize,
    ) -> io::Result<Vec<SourceCandidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok((0..self.count)
            .map(|i| SourceCandidate {
                source_name: format!("{} {}", term, i),
                source_id: format!("id-{}", i),
            })
            .collect())
    }

    fn join_columns(&self, _source_id: &str) -> io::Result<Vec<ColumnCandidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![ColumnCandidate {
            name: "CONTACT_ID".into(),
            label: "Contact ID".into(),
        }])
    }
}

struct OfflineCatalog;

impl SourceCatalog for OfflineCatalog {
    fn suggest(
        &self,
        _term: &str,
        _schema: &str,
        _limit: usize,
    ) -> io::Result<Vec<SourceCandidate>> {
        Err(io::Error::new(io::ErrorKind::TimedOut, "catalog timed out"))
    }

    fn join_columns(&self, _source_id: &str) -> io::Result<Vec<ColumnCandidate>> {
        Err(io::Error::new(io::ErrorKind::TimedOut, "catalog timed out"))
    }
}

#[rstest]
#[case("", 0)]
#[case("a", 0)]
#[case(" a ", 0)]
#[case("ab", 1)]
#[case("  gala  ", 1)]
fn given_term_when_suggesting_then_catalog_queried_only_from_min_length(
    #[case] term: &str,
    #[case] expected_calls: usize,
) {
    let catalog = Arc::new(CountingCatalog {
        count: 2,
        ..Default::default()
    });
    let service = LookupService::new(catalog.clone(), LookupConfig::default());

    let found = service.suggest(term, "report").unwrap();

    assert_eq!(catalog.calls.load(Ordering::SeqCst), expected_calls);
    assert_eq!(found.len(), expected_calls * 2);
}

#[test]
fn given_catalog_over_limit_when_suggesting_then_truncated() {
    let catalog = Arc::new(CountingCatalog {
        count: 25,
        ..Default::default()
    });
    let service = LookupService::new(
        catalog,
        LookupConfig {
            min_term_len: 2,
            limit: 5,
        },
    );

    let found = service.suggest("donor", "list").unwrap();

    assert_eq!(found.len(), 5);
}

#[test]
fn given_non_report_source_when_listing_columns_then_empty_without_query() {
    let catalog = Arc::new(CountingCatalog::default());
    let service = LookupService::new(catalog.clone(), LookupConfig::default());

    let columns = service
        .join_columns(&SourceRef::new("list", "7011", "Gala"))
        .unwrap();

    assert!(columns.is_empty());
    assert_eq!(catalog.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn given_report_source_when_listing_columns_then_catalog_columns() {
    let catalog = Arc::new(CountingCatalog::default());
    let service = LookupService::new(catalog, LookupConfig::default());

    let columns = service
        .join_columns(&SourceRef::new("Report", "00O1", "Lapsed Donors"))
        .unwrap();

    assert_eq!(columns.len(), 1);
    assert_eq!(columns[0].name, "CONTACT_ID");
}

#[test]
fn given_offline_catalog_when_suggesting_then_transport_error() {
    let service = LookupService::new(Arc::new(OfflineCatalog), LookupConfig::default());

    let err = service.suggest("gala", "list").unwrap_err();

    assert!(matches!(err, ApplicationError::Transport { .. }));
}

#[test]
fn given_candidate_when_choosing_then_source_ref_of_kind() {
    let service = LookupService::new(Arc::new(CountingCatalog::default()), LookupConfig::default());
    let candidate = SourceCandidate {
        source_name: "Gala 2024".into(),
        source_id: "7011".into(),
    };

    let source = service.choose(&candidate, "list");

    assert_eq!(source, SourceRef::new("list", "7011", "Gala 2024"));
    assert_eq!(source.column_name, None);
}

#[test]
fn given_toml_catalog_when_suggesting_then_case_insensitive_match() {
    let catalog = TomlSourceCatalog::parse(
        r#"
[[sources]]
kind = "report"
id = "00O1"
name = "Lapsed Donors"
columns = [{ name = "CONTACT_ID", label = "Contact ID" }]

[[sources]]
kind = "report"
id = "00O2"
name = "Major Donors"

[[sources]]
kind = "list"
id = "7011"
name = "Donor Gala"
"#,
    )
    .unwrap();
    assert_eq!(catalog.len(), 3);
    let service = LookupService::new(Arc::new(catalog), LookupConfig::default());

    let found = service.suggest("DONOR", "report").unwrap();

    let ids: Vec<_> = found.iter().map(|c| c.source_id.as_str()).collect();
    assert_eq!(ids, vec!["00O1", "00O2"]);

    let columns = service.join_columns(&service.choose(&found[0], "report")).unwrap();
    assert_eq!(columns[0].label, "Contact ID");
}
