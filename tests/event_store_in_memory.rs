//! Event store behaviour over the in-memory backend

use member_ledger::domain::{Actor, DomainEvent, Resource, ResourceVersion};
use member_ledger::event_store::{EventStore, InMemoryEventStorage};
use member_ledger::EventStoreError;
use tokio_test::{assert_err, assert_ok};
use uuid::Uuid;

mod common;

fn store() -> EventStore<InMemoryEventStorage> {
    EventStore::new(InMemoryEventStorage::new())
}

#[tokio::test]
async fn test_first_area_lands_at_version_zero() {
    let store = store();
    let area_id = Uuid::new_v4();
    let event = common::area_created(area_id, "Laser Cutting");

    let committed = assert_ok!(
        store
            .commit(&Resource::area(area_id), ResourceVersion::NoSuchResource, &event)
            .await
    );
    assert_eq!(committed.version, 0);

    let all = assert_ok!(store.get_all().await);
    assert_eq!(all, vec![event]);
}

#[tokio::test]
async fn test_version_tracks_commit_count() {
    let store = store();
    let area_id = Uuid::new_v4();
    let resource = Resource::area(area_id);

    let mut events = vec![common::area_created(area_id, "Wood")];
    for member_number in 1..=4 {
        events.push(DomainEvent::OwnerAdded {
            area_id,
            member_number,
            recorded_by: Actor::System,
            recorded_at: chrono::Utc::now(),
        });
    }

    let mut version = ResourceVersion::NoSuchResource;
    for event in &events {
        let committed = assert_ok!(store.commit(&resource, version, event).await);
        version = ResourceVersion::Version(committed.version);
    }

    let loaded = assert_ok!(store.get_resource_events(&resource).await);
    assert_eq!(loaded.version, ResourceVersion::Version(events.len() as i64 - 1));
    assert_eq!(loaded.events, events);
}

#[tokio::test]
async fn test_racing_commits_have_exactly_one_winner() {
    let store = store();
    let area_id = Uuid::new_v4();
    let resource = Resource::area(area_id);
    assert_ok!(
        store
            .commit(&resource, ResourceVersion::NoSuchResource, &common::area_created(area_id, "Wood"))
            .await
    );

    let owner = |member_number| DomainEvent::OwnerAdded {
        area_id,
        member_number,
        recorded_by: Actor::System,
        recorded_at: chrono::Utc::now(),
    };
    let (first, second) = (owner(1), owner(2));

    let (a, b) = tokio::join!(
        store.commit(&resource, ResourceVersion::Version(0), &first),
        store.commit(&resource, ResourceVersion::Version(0), &second),
    );

    let (winner, loser) = if a.is_ok() { (a, b) } else { (b, a) };
    assert_eq!(assert_ok!(winner).version, 1);
    assert!(matches!(
        assert_err!(loser),
        EventStoreError::ConcurrencyConflict { .. }
    ));

    let loaded = assert_ok!(store.get_resource_events(&resource).await);
    assert_eq!(loaded.events.len(), 2);
    assert_eq!(loaded.version, ResourceVersion::Version(1));
}

#[tokio::test]
async fn test_resources_version_independently() {
    let store = store();
    let area_id = Uuid::new_v4();
    let equipment_id = Uuid::new_v4();

    assert_ok!(
        store
            .commit(&Resource::area(area_id), ResourceVersion::NoSuchResource, &common::area_created(area_id, "Wood"))
            .await
    );
    let committed = assert_ok!(
        store
            .commit(
                &Resource::equipment(equipment_id),
                ResourceVersion::NoSuchResource,
                &common::equipment_added(equipment_id, area_id, "Lathe"),
            )
            .await
    );
    assert_eq!(committed.version, 0);
}
