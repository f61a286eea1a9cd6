use metafield_core::{
    AllowAll, EntryServiceError, MemoryMetaStore, MetaAction, MetaEntryService, MetaStore,
    ObjectRef, ObjectType,
};
use serde_json::json;

fn post(id: u64) -> ObjectRef {
    ObjectRef::new(ObjectType::Post, id)
}

fn service() -> MetaEntryService<MemoryMetaStore, AllowAll> {
    MetaEntryService::new(MemoryMetaStore::new(), AllowAll)
}

#[test]
fn create_then_get_round_trips() {
    let mut service = service();
    let object = post(1);

    let created = service.create_entry(&object, "mood", &json!("happy")).unwrap();
    assert_eq!(created.key, "mood");
    assert_eq!(created.raw_value, "happy");

    let fetched = service.get_entry(&object, created.entry_id).unwrap();
    assert_eq!(fetched, created);
}

#[test]
fn duplicate_keys_get_distinct_entry_ids() {
    let mut service = service();
    let object = post(1);

    let first = service.create_entry(&object, "tag", &json!("a")).unwrap();
    let second = service.create_entry(&object, "tag", &json!("a")).unwrap();
    assert_ne!(first.entry_id, second.entry_id);

    // Each copy remains individually addressable.
    service.delete_entry(&object, first.entry_id).unwrap();
    assert!(service.get_entry(&object, second.entry_id).is_ok());
}

#[test]
fn update_overwrites_value_in_place() {
    let mut service = service();
    let object = post(1);

    let created = service.create_entry(&object, "mood", &json!("happy")).unwrap();
    let updated = service
        .update_entry(&object, created.entry_id, &json!("calm"))
        .unwrap();

    assert_eq!(updated.entry_id, created.entry_id);
    assert_eq!(updated.raw_value, "calm");
}

#[test]
fn entries_of_other_objects_read_as_missing() {
    let mut service = service();

    let created = service.create_entry(&post(1), "mood", &json!("happy")).unwrap();
    let err = service.get_entry(&post(2), created.entry_id).unwrap_err();
    assert!(matches!(err, EntryServiceError::EntryNotFound(id) if id == created.entry_id));

    let err = service.delete_entry(&post(2), created.entry_id).unwrap_err();
    assert!(matches!(err, EntryServiceError::EntryNotFound(_)));
}

#[test]
fn missing_entry_is_not_found() {
    let service = service();
    let err = service.get_entry(&post(1), 424242).unwrap_err();
    assert!(matches!(err, EntryServiceError::EntryNotFound(424242)));
}

#[test]
fn protected_keys_are_rejected_and_hidden() {
    let mut service = service();
    let object = post(1);

    let err = service
        .create_entry(&object, "_internal", &json!("x"))
        .unwrap_err();
    assert!(matches!(err, EntryServiceError::ProtectedKey(key) if key == "_internal"));

    // A protected entry written by the host directly is invisible here.
    let mut store = MemoryMetaStore::new();
    let hidden_id = store.add_entry(&object, "_internal", "x").unwrap();
    let visible_id = store.add_entry(&object, "visible", "y").unwrap();
    let service = MetaEntryService::new(store, AllowAll);

    let listed = service.list_entries(&object).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].entry_id, visible_id);

    let err = service.get_entry(&object, hidden_id).unwrap_err();
    assert!(matches!(err, EntryServiceError::ProtectedKey(_)));
}

#[test]
fn compound_payloads_are_hidden_and_unreadable() {
    let object = post(1);
    let mut store = MemoryMetaStore::new();
    let compound_id = store
        .add_entry(&object, "layout", r#"{"cols": 2}"#)
        .unwrap();
    store.add_entry(&object, "plain", "text").unwrap();
    let service = MetaEntryService::new(store, AllowAll);

    let listed = service.list_entries(&object).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].key, "plain");

    let err = service.get_entry(&object, compound_id).unwrap_err();
    assert!(matches!(err, EntryServiceError::NotScalar(id) if id == compound_id));
}

#[test]
fn compound_input_values_are_rejected() {
    let mut service = service();
    let err = service
        .create_entry(&post(1), "layout", &json!({"cols": 2}))
        .unwrap_err();
    assert!(matches!(err, EntryServiceError::InvalidValue(_)));
}

#[test]
fn mutations_respect_the_authorizer() {
    let deny_edit = |action: MetaAction, _object: &ObjectRef, _key: &str| {
        action != MetaAction::Edit
    };
    let mut service = MetaEntryService::new(MemoryMetaStore::new(), deny_edit);

    let err = service
        .create_entry(&post(1), "mood", &json!("happy"))
        .unwrap_err();
    assert!(
        matches!(err, EntryServiceError::PermissionDenied { key, action }
            if key == "mood" && action == MetaAction::Edit)
    );
}

#[test]
fn delete_requires_the_delete_capability() {
    let object = post(1);
    let mut store = MemoryMetaStore::new();
    let entry_id = store.add_entry(&object, "mood", "happy").unwrap();

    let deny_delete = |action: MetaAction, _object: &ObjectRef, _key: &str| {
        action != MetaAction::Delete
    };
    let mut service = MetaEntryService::new(store, deny_delete);

    let err = service.delete_entry(&object, entry_id).unwrap_err();
    assert!(
        matches!(err, EntryServiceError::PermissionDenied { action, .. }
            if action == MetaAction::Delete)
    );
    assert!(service.get_entry(&object, entry_id).is_ok());
}

#[test]
fn services_can_share_a_store_by_mutable_borrow() {
    let mut store = MemoryMetaStore::new();
    {
        let mut service = MetaEntryService::new(&mut store, AllowAll);
        service.create_entry(&post(1), "mood", &json!("happy")).unwrap();
    }
    assert_eq!(store.len(), 1);
}
