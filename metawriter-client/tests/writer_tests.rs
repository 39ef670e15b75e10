use metawriter_client::mock::MockCatalog;
use metawriter_client::{EntityUpdate, MetaWriter, WriterConfig, WriterError};
use metawriter_model::{EntityDescriptor, FieldEdit, RemovalScope, SourceType};
use metawriter_types::{NamespacedProperties, PropertyValue};
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;
use std::sync::Arc;

fn orders() -> EntityDescriptor {
    EntityDescriptor::hive_table("sales", "orders")
}

fn customers() -> EntityDescriptor {
    EntityDescriptor::hive_table("sales", "customers")
}

fn catalog() -> Arc<MockCatalog> {
    Arc::new(
        MockCatalog::new()
            .with_source(SourceType::Hive, "hive-1")
            .with_source(SourceType::Hdfs, "hdfs-1")
            .with_identity(orders(), "101")
            .with_identity(customers(), "102")
            .with_identity(EntityDescriptor::hdfs_file("/data/raw/a.csv"), "201"),
    )
}

fn writer(catalog: &Arc<MockCatalog>) -> MetaWriter {
    MetaWriter::new(catalog.clone(), catalog.clone())
}

fn basic(pairs: &[(&str, &str)]) -> NamespacedProperties {
    let mut props = NamespacedProperties::new();
    let ns = props.entry("Basic_Property".to_string()).or_default();
    for (k, v) in pairs {
        ns.insert(k.to_string(), PropertyValue::from(*v));
    }
    props
}

// ── Building edits ──────────────────────────────────────────────

#[test]
fn edit_resolves_identity_and_source() {
    let catalog = catalog();
    let writer = writer(&catalog);

    let edit = writer.edit(orders()).unwrap();
    assert_eq!(edit.identity().map(|id| id.as_str()), Some("101"));
    assert_eq!(edit.source_id().map(|id| id.as_str()), Some("hive-1"));
    assert!(edit.managed().is_empty());
}

#[test]
fn edit_uses_configured_removal_scope() {
    let catalog = catalog();
    let config = WriterConfig {
        removal_scope: RemovalScope::Namespace,
        ..Default::default()
    };
    let writer = MetaWriter::with_config(catalog.clone(), catalog.clone(), config);

    let edit = writer.edit(orders()).unwrap();
    assert_eq!(edit.managed().scope(), RemovalScope::Namespace);
}

#[test]
fn edit_fails_without_registered_source() {
    let catalog = Arc::new(MockCatalog::new().with_identity(orders(), "101"));
    let writer = writer(&catalog);

    let err = writer.edit(orders()).unwrap_err();
    assert!(matches!(err, WriterError::Validation(ref msg) if msg.contains("HIVE")));
}

#[test]
fn edit_fails_for_unknown_entity_when_identity_required() {
    let catalog = catalog();
    let writer = writer(&catalog);

    let err = writer.edit(EntityDescriptor::hive_table("sales", "missing")).unwrap_err();
    assert!(matches!(err, WriterError::Validation(ref msg) if msg.contains("sales.missing")));
}

#[test]
fn edit_allows_unknown_entity_when_identity_optional() {
    let catalog = catalog();
    let config = WriterConfig {
        require_identity: false,
        ..Default::default()
    };
    let mut writer = MetaWriter::with_config(catalog.clone(), catalog.clone(), config);

    let edit = writer.edit(EntityDescriptor::hive_table("sales", "missing")).unwrap();
    assert!(edit.identity().is_none());
    assert!(writer.add(edit).unwrap());
}

#[test]
fn lookup_transport_failure_is_a_catalog_error() {
    let catalog = catalog();
    catalog.fail_transport(Some("connection refused"));
    let writer = writer(&catalog);

    let err = writer.edit(orders()).unwrap_err();
    assert!(matches!(err, WriterError::Catalog(_)));
    assert!(!err.is_retriable());
}

// ── Batching ────────────────────────────────────────────────────

#[test]
fn equal_edits_are_batched_once() {
    let catalog = catalog();
    let mut writer = writer(&catalog);

    let mut edit = writer.edit(orders()).unwrap();
    edit.add_tags(["pii"]);

    assert!(writer.add(edit.clone()).unwrap());
    assert!(!writer.add(edit).unwrap());
    assert_eq!(writer.pending().len(), 1);
}

#[test]
fn invalid_edit_never_reaches_the_batch() {
    let catalog = catalog();
    let mut writer = writer(&catalog);

    let mut edit = writer.edit(orders()).unwrap();
    edit.set_source_id(None);

    let err = writer.add(edit).unwrap_err();
    assert!(matches!(err, WriterError::Validation(ref msg) if msg.contains("source id")));
    assert!(writer.pending().is_empty());
}

#[test]
fn invalid_managed_namespace_is_an_argument_error() {
    let catalog = catalog();
    let mut writer = writer(&catalog);

    let mut managed = NamespacedProperties::new();
    managed
        .entry(String::new())
        .or_default()
        .insert("Status".to_string(), PropertyValue::from("ok"));

    let err = writer
        .update_hive_table("sales", "orders", EntityUpdate::new().managed(managed))
        .unwrap_err();
    assert!(matches!(err, WriterError::InvalidArgument(_)));
    assert!(writer.pending().is_empty());
}

#[test]
fn update_adds_managed_properties_and_removals() {
    let catalog = catalog();
    let mut writer = writer(&catalog);

    writer
        .update_hive_table(
            "sales",
            "orders",
            EntityUpdate::new()
                .alias("Orders")
                .tags(["pii", "finance"])
                .managed(basic(&[("Status", "reviewed")]))
                .remove(["Owner"]),
        )
        .unwrap();

    let edit = writer.pending().iter().next().unwrap();
    assert_eq!(edit.alias(), Some("Orders"));
    assert_eq!(
        edit.tags(),
        &FieldEdit::Add(BTreeSet::from(["finance".to_string(), "pii".to_string()]))
    );
    assert_eq!(edit.managed().additions(), &basic(&[("Status", "reviewed")]));
    assert!(edit.managed().removals().contains("Owner"));
    assert!(!edit.managed().has_override());
}

#[test]
fn update_with_replace_overrides() {
    let catalog = catalog();
    let mut writer = writer(&catalog);

    writer
        .update_hdfs_file(
            "/data/raw/a.csv",
            EntityUpdate::new()
                .tags(["raw"])
                .managed(basic(&[("Status", "new")]))
                .replace(true),
        )
        .unwrap();

    let edit = writer.pending().iter().next().unwrap();
    assert_eq!(edit.tags(), &FieldEdit::Replace(BTreeSet::from(["raw".to_string()])));
    assert!(edit.managed().additions().is_empty());
    assert_eq!(
        edit.managed().override_properties(),
        Some(&basic(&[("Status", "new")]))
    );
}

#[test]
fn removal_after_override_strips_the_key() {
    let catalog = catalog();
    let mut writer = writer(&catalog);

    let mut edit = writer.edit(orders()).unwrap();
    EntityUpdate::new()
        .managed(basic(&[("Status", "new"), ("Owner", "ops")]))
        .replace(true)
        .remove(["Owner"])
        .apply_to(&mut edit)
        .unwrap();

    assert_eq!(
        edit.managed().override_properties(),
        Some(&basic(&[("Status", "new")]))
    );
    assert!(edit.managed().removals().contains("Owner"));
}

// ── Commit ──────────────────────────────────────────────────────

#[test]
fn empty_commit_makes_no_call() {
    let catalog = catalog();
    let mut writer = writer(&catalog);

    let report = writer.commit().unwrap();
    assert_eq!(report.commit_id, None);
    assert_eq!(report.submitted, 0);
    assert_eq!(catalog.submit_count(), 0);
}

#[test]
fn successful_commit_submits_everything_once() {
    let catalog = catalog();
    let mut writer = writer(&catalog);

    writer
        .update_hive_table("sales", "orders", EntityUpdate::new().tags(["a"]))
        .unwrap();
    writer
        .update_hive_table("sales", "customers", EntityUpdate::new().tags(["b"]))
        .unwrap();

    let report = writer.commit().unwrap();
    assert!(report.commit_id.is_some());
    assert_eq!(report.submitted, 2);
    assert!(writer.pending().is_empty());

    let submissions = catalog.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].len(), 2);

    // Nothing left over for a second commit.
    writer.commit().unwrap();
    assert_eq!(catalog.submit_count(), 1);
}

#[test]
fn partial_rejection_returns_failed_edit_and_clears_batch() {
    let catalog = catalog();
    catalog.reject(customers(), "entity is locked");
    let mut writer = writer(&catalog);

    writer
        .update_hive_table("sales", "orders", EntityUpdate::new().tags(["a"]))
        .unwrap();
    writer
        .update_hive_table("sales", "customers", EntityUpdate::new().tags(["b"]))
        .unwrap();

    let err = writer.commit().unwrap_err();
    assert!(writer.pending().is_empty());
    assert_eq!(catalog.submit_count(), 1);

    let failed = err.failed_edits().unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].descriptor(), &customers());
    assert!(err.to_string().contains("entity is locked"));
    assert!(!err.is_retriable());

    let WriterError::Remote(remote) = err else {
        panic!("expected a remote error");
    };
    assert_eq!(remote.failures[0].detail, "entity is locked");
    for edit in remote.into_failed_edits() {
        assert!(writer.add(edit).unwrap());
    }
    assert_eq!(writer.pending().len(), 1);
}

#[test]
fn transport_failure_fails_every_item() {
    let catalog = catalog();
    let mut writer = writer(&catalog);

    writer
        .update_hive_table("sales", "orders", EntityUpdate::new().tags(["a"]))
        .unwrap();
    writer
        .update_hive_table("sales", "customers", EntityUpdate::new().tags(["b"]))
        .unwrap();
    catalog.fail_transport(Some("timed out"));

    let err = writer.commit().unwrap_err();
    assert!(writer.pending().is_empty());
    assert_eq!(catalog.submit_count(), 0);

    let WriterError::Remote(remote) = err else {
        panic!("expected a remote error");
    };
    assert_eq!(remote.failures.len(), 2);
    assert!(remote.failures.iter().all(|f| f.detail.contains("timed out")));
}

#[test]
fn commit_after_failure_starts_fresh() {
    let catalog = catalog();
    catalog.reject(orders(), "nope");
    let mut writer = writer(&catalog);

    writer
        .update_hive_table("sales", "orders", EntityUpdate::new().tags(["a"]))
        .unwrap();
    assert!(writer.commit().is_err());

    writer
        .update_hive_table("sales", "customers", EntityUpdate::new().tags(["b"]))
        .unwrap();
    let report = writer.commit().unwrap();
    assert_eq!(report.submitted, 1);
    assert_eq!(catalog.submissions()[1][0].descriptor(), &customers());
}
