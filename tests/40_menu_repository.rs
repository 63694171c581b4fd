mod common;

use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use senbox_api::components::{ComponentType, CreateMenuComponentRequest};
use senbox_api::database::models::{Component, MenuEntryPatch, NewMenuEntry};
use senbox_api::database::{ComponentRepository, DatabaseError, MenuFilter, MenuRepository, MenuScope, ScopeKey};

async fn component(pool: &PgPool, name: &str) -> Component {
    ComponentRepository::new(pool.clone())
        .create_component(&CreateMenuComponentRequest {
            component_type: "label".to_string(),
            name: name.to_string(),
            key: String::new(),
            value: json!({ "text": name }),
            language: Some("en".to_string()),
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn entries_come_back_in_order() {
    let Some(pool) = common::test_pool().await else { return };
    let menu = MenuRepository::new(MenuScope::User, pool.clone());
    let key = ScopeKey::Owner(Uuid::new_v4());

    let third = component(&pool, "third").await;
    let first = component(&pool, "first").await;
    let second = component(&pool, "second").await;
    menu.bulk_create(&[
        NewMenuEntry::new(key, third.id, 30),
        NewMenuEntry::new(key, first.id, 10),
        NewMenuEntry::new(key, second.id, 20),
    ])
    .await
    .unwrap();

    let ids: Vec<Uuid> = menu
        .get_by_scope_key(&key)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.component_id)
        .collect();
    assert_eq!(ids, vec![first.id, second.id, third.id]);
}

#[tokio::test]
async fn visibility_toggle_leaves_order_alone() {
    let Some(pool) = common::test_pool().await else { return };
    let menu = MenuRepository::new(MenuScope::Teacher, pool.clone());
    let key = ScopeKey::Owner(Uuid::new_v4());

    let a = component(&pool, "a").await;
    let b = component(&pool, "b").await;
    menu.create(&NewMenuEntry::new(key, a.id, 1)).await.unwrap();
    menu.create(&NewMenuEntry::new(key, b.id, 2)).await.unwrap();

    let hidden = menu.update_visibility(&key, a.id, false).await.unwrap();
    assert!(!hidden.visible);
    assert_eq!(hidden.order, 1);

    let visible = menu.get_visible_by_scope_key(&key).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].component_id, b.id);

    let shown = menu.update_visibility(&key, a.id, true).await.unwrap();
    assert_eq!(shown.order, 1);
    assert_eq!(menu.get_visible_by_scope_key(&key).await.unwrap().len(), 2);
}

#[tokio::test]
async fn patch_touches_only_given_fields() {
    let Some(pool) = common::test_pool().await else { return };
    let menu = MenuRepository::new(MenuScope::Parent, pool.clone());
    let key = ScopeKey::Owner(Uuid::new_v4());
    let c = component(&pool, "patched").await;

    let mut entry = NewMenuEntry::new(key, c.id, 5);
    entry.visible = false;
    menu.create(&entry).await.unwrap();

    let updated = menu
        .update(&MenuEntryPatch {
            key,
            component_id: c.id,
            order: Some(9),
            visible: None,
        })
        .await
        .unwrap();
    assert_eq!(updated.order, 9);
    assert!(!updated.visible);

    let missing = menu
        .update(&MenuEntryPatch {
            key,
            component_id: Uuid::new_v4(),
            order: Some(1),
            visible: None,
        })
        .await;
    assert!(matches!(missing, Err(DatabaseError::NotFound(_))));
}

#[tokio::test]
async fn patching_one_entry_keeps_the_others() {
    let Some(pool) = common::test_pool().await else { return };
    let menu = MenuRepository::new(MenuScope::Student, pool.clone());
    let key = ScopeKey::Owner(Uuid::new_v4());

    let a = component(&pool, "a").await;
    let b = component(&pool, "b").await;
    let c = component(&pool, "c").await;
    menu.bulk_create(&[
        NewMenuEntry::new(key, a.id, 10),
        NewMenuEntry::new(key, b.id, 20),
        NewMenuEntry::new(key, c.id, 30),
    ])
    .await
    .unwrap();

    let mut tx = pool.begin().await.unwrap();
    let moved = menu
        .update_with_tx(
            &mut tx,
            &MenuEntryPatch {
                key,
                component_id: a.id,
                order: Some(25),
                visible: None,
            },
        )
        .await
        .unwrap();
    tx.commit().await.unwrap();
    assert_eq!(moved.order, 25);

    let entries = menu.get_by_scope_key(&key).await.unwrap();
    let sequence: Vec<(Uuid, i32)> = entries.iter().map(|e| (e.component_id, e.order)).collect();
    assert_eq!(sequence, vec![(b.id, 20), (a.id, 25), (c.id, 30)]);
}

#[tokio::test]
async fn get_entry_finds_one_binding() {
    let Some(pool) = common::test_pool().await else { return };
    let menu = MenuRepository::new(MenuScope::Parent, pool.clone());
    let key = ScopeKey::Owner(Uuid::new_v4());
    let c = component(&pool, "single").await;
    menu.create(&NewMenuEntry::new(key, c.id, 4)).await.unwrap();

    let entry = menu.get_entry(&key, c.id).await.unwrap();
    assert_eq!(entry.component_id, c.id);
    assert_eq!(entry.order, 4);

    let other = ScopeKey::Owner(Uuid::new_v4());
    let err = menu.get_entry(&other, c.id).await.unwrap_err();
    assert!(matches!(err, DatabaseError::NotFound(_)));
}

#[tokio::test]
async fn binding_a_missing_component_is_not_found() {
    let Some(pool) = common::test_pool().await else { return };
    let menu = MenuRepository::new(MenuScope::Device, pool.clone());
    let key = ScopeKey::Owner(Uuid::new_v4());

    let err = menu
        .create(&NewMenuEntry::new(key, Uuid::new_v4(), 0))
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::NotFound(_)));

    let real = component(&pool, "real").await;
    let err = menu
        .bulk_create(&[NewMenuEntry::new(key, real.id, 0), NewMenuEntry::new(key, Uuid::new_v4(), 1)])
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::NotFound(_)));
    assert!(menu.get_by_scope_key(&key).await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_binding_is_a_conflict() {
    let Some(pool) = common::test_pool().await else { return };
    let menu = MenuRepository::new(MenuScope::Student, pool.clone());
    let key = ScopeKey::Owner(Uuid::new_v4());
    let c = component(&pool, "twice").await;

    menu.create(&NewMenuEntry::new(key, c.id, 0)).await.unwrap();
    let err = menu.create(&NewMenuEntry::new(key, c.id, 1)).await.unwrap_err();
    assert!(matches!(err, DatabaseError::Conflict(_)));

    let err = menu
        .bulk_create(&[NewMenuEntry::new(key, c.id, 0), NewMenuEntry::new(key, c.id, 1)])
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::Conflict(_)));
}

#[tokio::test]
async fn wrong_key_shape_never_reaches_storage() {
    let Some(pool) = common::test_pool().await else { return };
    let menu = MenuRepository::new(MenuScope::OrgStudent, pool);

    let err = menu.get_by_scope_key(&ScopeKey::Owner(Uuid::new_v4())).await.unwrap_err();
    assert!(matches!(err, DatabaseError::InvalidScopeKey(_)));
}

#[tokio::test]
async fn component_removal_is_isolated_per_scope() {
    let Some(pool) = common::test_pool().await else { return };
    let org = Uuid::new_v4();
    let owner = Uuid::new_v4();
    let org_key = ScopeKey::OwnerInOrganization {
        organization_id: org,
        owner_id: owner,
    };
    let owner_key = ScopeKey::Owner(owner);

    let org_teacher = MenuRepository::new(MenuScope::OrgTeacher, pool.clone());
    let teacher = MenuRepository::new(MenuScope::Teacher, pool.clone());
    let shared = component(&pool, "shared").await;

    org_teacher.create(&NewMenuEntry::new(org_key, shared.id, 0)).await.unwrap();
    teacher.create(&NewMenuEntry::new(owner_key, shared.id, 0)).await.unwrap();

    let removed = org_teacher.delete_by_component_id(shared.id).await.unwrap();
    assert_eq!(removed, 1);

    assert!(org_teacher.get_by_scope_key(&org_key).await.unwrap().is_empty());
    assert_eq!(teacher.get_by_scope_key(&owner_key).await.unwrap().len(), 1);
}

#[tokio::test]
async fn clearing_one_owner_spares_others() {
    let Some(pool) = common::test_pool().await else { return };
    let menu = MenuRepository::new(MenuScope::Organization, pool.clone());
    let mine = ScopeKey::Owner(Uuid::new_v4());
    let theirs = ScopeKey::Owner(Uuid::new_v4());

    let a = component(&pool, "mine").await;
    let b = component(&pool, "theirs").await;
    menu.create(&NewMenuEntry::new(mine, a.id, 0)).await.unwrap();
    menu.create(&NewMenuEntry::new(theirs, b.id, 0)).await.unwrap();

    let removed = menu.delete_by_scope_key(&mine).await.unwrap();
    assert_eq!(removed, vec![a.id]);
    assert!(menu.get_by_scope_key(&mine).await.unwrap().is_empty());
    assert_eq!(menu.get_by_scope_key(&theirs).await.unwrap().len(), 1);
}

#[tokio::test]
async fn bound_component_cannot_be_deleted() {
    let Some(pool) = common::test_pool().await else { return };
    let menu = MenuRepository::new(MenuScope::OrgDepartment, pool.clone());
    let key = ScopeKey::OwnerInOrganization {
        organization_id: Uuid::new_v4(),
        owner_id: Uuid::new_v4(),
    };
    let c = component(&pool, "pinned").await;
    menu.create(&NewMenuEntry::new(key, c.id, 0)).await.unwrap();

    let err = ComponentRepository::new(pool.clone()).delete_component(c.id).await.unwrap_err();
    assert!(matches!(err, DatabaseError::Conflict(_)));
    assert_eq!(menu.get_by_scope_key(&key).await.unwrap().len(), 1);
}

#[tokio::test]
async fn global_menu_filters_by_language() {
    let Some(pool) = common::test_pool().await else { return };
    let menu = MenuRepository::new(MenuScope::SuperAdmin, pool.clone());
    let repo = ComponentRepository::new(pool.clone());
    let marker = Uuid::new_v4().to_string();

    let vi = repo
        .create_component(&CreateMenuComponentRequest {
            component_type: "label".to_string(),
            name: marker.clone(),
            key: String::new(),
            value: json!({ "text": "Xin chào" }),
            language: Some("vi".to_string()),
        })
        .await
        .unwrap();
    menu.create(&NewMenuEntry::new(ScopeKey::Global, vi.id, 0)).await.unwrap();

    let items = menu
        .list_items(
            &ScopeKey::Global,
            &MenuFilter {
                language: Some("VI".to_string()),
                component_type: Some(ComponentType::Label),
                visible_only: true,
            },
        )
        .await
        .unwrap();
    assert!(items.iter().any(|item| item.component.id == vi.id));
    assert!(items.iter().all(|item| item.component.language.as_deref() == Some("vi")));

    menu.delete(&ScopeKey::Global, vi.id).await.unwrap();
}

#[tokio::test]
async fn delete_all_wipes_every_owner_in_scope() {
    let Some(pool) = common::test_pool().await else { return };
    // staff is reserved for this test
    let menu = MenuRepository::new(MenuScope::Staff, pool.clone());
    let one = ScopeKey::Owner(Uuid::new_v4());
    let two = ScopeKey::Owner(Uuid::new_v4());
    let c = component(&pool, "staff").await;

    menu.create(&NewMenuEntry::new(one, c.id, 0)).await.unwrap();
    menu.create(&NewMenuEntry::new(two, c.id, 0)).await.unwrap();

    assert!(menu.delete_all().await.unwrap() >= 2);
    assert!(menu.get_by_scope_key(&one).await.unwrap().is_empty());
    assert!(menu.get_by_scope_key(&two).await.unwrap().is_empty());
}
