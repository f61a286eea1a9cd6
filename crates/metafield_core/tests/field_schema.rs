use metafield_core::{
    field_schema, AllowAll, FieldRegistration, FieldRegistry, MemoryMetaStore,
    MetaFieldSynchronizer, ObjectRef, ObjectType,
};
use serde_json::json;

fn registry_with(registrations: Vec<FieldRegistration>) -> FieldRegistry {
    let mut registry = FieldRegistry::new(ObjectType::Post);
    for registration in registrations {
        registry.register(registration).unwrap();
    }
    registry
}

#[test]
fn properties_are_exactly_the_typed_visible_fields() {
    let mut hidden = FieldRegistration::single("hidden", "string");
    hidden.show_in_rest = false;
    let registry = registry_with(vec![
        FieldRegistration::single("subtitle", "string"),
        FieldRegistration::multi("tags", "string"),
        FieldRegistration::single("untyped", ""),
        FieldRegistration::single("exotic", "matrix"),
        hidden,
    ]);

    let document = field_schema(&registry);
    let names: Vec<&str> = document.properties.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["subtitle", "tags"]);
}

#[test]
fn schema_and_read_expose_the_same_field_set() {
    // A field with REST exposure but no declared type is visible in neither.
    let registry = registry_with(vec![
        FieldRegistration::single("typed", "string"),
        FieldRegistration::single("untyped", ""),
    ]);
    let sync = MetaFieldSynchronizer::new(registry, MemoryMetaStore::new(), AllowAll);

    let mapping = sync.read(&ObjectRef::new(ObjectType::Post, 1)).unwrap();
    let schema = sync.schema();

    let read_names: Vec<&String> = mapping.keys().collect();
    let schema_names: Vec<&String> = schema.properties.keys().collect();
    assert_eq!(read_names, schema_names);
    assert!(!mapping.contains_key("untyped"));
}

#[test]
fn property_schema_carries_type_description_and_default() {
    let registry = registry_with(vec![FieldRegistration::single("featured", "boolean")
        .with_description("Shown on the front page.")
        .with_default(json!(false))]);

    let document = field_schema(&registry);
    let property = &document.properties["featured"];
    assert_eq!(property.schema_type, "boolean");
    assert_eq!(property.description, "Shown on the front page.");
    assert_eq!(property.default, json!(false));
}

#[test]
fn document_envelope_matches_discovery_shape() {
    let document = field_schema(&registry_with(vec![]));
    assert_eq!(document.schema_type, "object");
    assert_eq!(document.context, vec!["view", "edit"]);
    assert!(document.properties.is_empty());
}
