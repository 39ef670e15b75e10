use metawriter_client::mock::MockCatalog;
use metawriter_client::{ModelRegistry, PropertyDef, PropertyType, WriterError};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::BTreeSet;
use std::sync::Arc;

fn registry() -> (Arc<MockCatalog>, ModelRegistry) {
    let catalog = Arc::new(MockCatalog::new());
    let registry = ModelRegistry::new(catalog.clone());
    (catalog, registry)
}

#[test]
fn commit_registers_everything_in_one_call() {
    let (catalog, mut registry) = registry();
    registry
        .add_namespace("Basic_Property", "Basic", "Core business properties")
        .unwrap();
    registry
        .add_property(
            PropertyDef::new("Basic_Property", "Status", PropertyType::Enum)
                .values(["new", "reviewed"]),
        )
        .unwrap();
    registry
        .add_property(PropertyDef::new("Basic_Property", "Owner", PropertyType::Text).max_length(64))
        .unwrap();
    registry
        .add_mapping("nav", "hv_table", "Basic_Property", "Status")
        .unwrap();
    registry
        .add_mapping("nav", "hv_table", "Basic_Property", "Owner")
        .unwrap();

    registry.commit().unwrap();
    assert!(registry.is_empty());

    let models = catalog.registered_models();
    assert_eq!(models.len(), 1);
    assert_eq!(models[0].namespaces.len(), 1);
    assert_eq!(models[0].properties.len(), 2);
    assert_eq!(
        models[0].mappings["nav.hv_table"],
        BTreeSet::from([
            "Basic_Property.Owner".to_string(),
            "Basic_Property.Status".to_string(),
        ])
    );
}

#[test]
fn empty_commit_makes_no_call() {
    let (catalog, mut registry) = registry();
    registry.commit().unwrap();
    assert!(catalog.registered_models().is_empty());
}

#[test]
fn later_definition_replaces_earlier() {
    let (_, mut registry) = registry();
    registry
        .add_property(PropertyDef::new("Audit", "Reviewed", PropertyType::Text))
        .unwrap();
    registry
        .add_property(PropertyDef::new("Audit", "Reviewed", PropertyType::Boolean))
        .unwrap();

    let model = registry.model();
    assert_eq!(model.properties.len(), 1);
    assert_eq!(model.properties[0].property_type, PropertyType::Boolean);
}

#[test]
fn enum_property_needs_values() {
    let (_, mut registry) = registry();
    let err = registry
        .add_property(PropertyDef::new("Audit", "Level", PropertyType::Enum))
        .unwrap_err();
    assert!(matches!(err, WriterError::InvalidArgument(ref msg) if msg.contains("Audit.Level")));
    assert!(registry.is_empty());
}

#[test]
fn empty_names_are_rejected() {
    let (_, mut registry) = registry();
    assert!(matches!(
        registry.add_namespace(" ", "x", "y"),
        Err(WriterError::InvalidArgument(_))
    ));
    assert!(matches!(
        registry.add_mapping("nav", "", "Audit", "Level"),
        Err(WriterError::InvalidArgument(_))
    ));
    assert!(registry.is_empty());
}

#[test]
fn failed_registration_keeps_definitions() {
    let (catalog, mut registry) = registry();
    registry.add_namespace("Audit", "Audit", "").unwrap();
    catalog.fail_transport(Some("unreachable"));

    assert!(matches!(registry.commit(), Err(WriterError::Catalog(_))));
    assert!(!registry.is_empty());

    catalog.fail_transport(None);
    registry.commit().unwrap();
    assert!(registry.is_empty());
    assert_eq!(catalog.registered_models().len(), 1);
}

#[test]
fn clear_drops_definitions() {
    let (catalog, mut registry) = registry();
    registry.add_namespace("Audit", "Audit", "").unwrap();
    registry.clear();
    registry.commit().unwrap();
    assert!(catalog.registered_models().is_empty());
}

#[test]
fn property_def_wire_format() {
    let def = PropertyDef::new("Basic_Property", "Tags", PropertyType::Text)
        .display_name("Tags")
        .multi_valued(true);
    assert_eq!(
        serde_json::to_value(&def).unwrap(),
        json!({
            "namespace": "Basic_Property",
            "name": "Tags",
            "propertyType": "TEXT",
            "displayName": "Tags",
            "multiValued": true,
        })
    );
}
