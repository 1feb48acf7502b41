use std::{sync::Arc, time::Duration};

use realm_server::Schedule;
use realm_shared::{AsAnyArc, Attribute, Container, Entity, Locate, Name, Partition};
use realm_test::{assert_located_in, init_logger, TestEntityBuilder};

fn inventory_of(entity: &Arc<Entity>) -> Arc<Container> {
    entity.attribute::<Container>().unwrap()
}

#[test]
fn copied_entity_describes_the_same() {
    init_logger();
    let original = TestEntityBuilder::new("chest")
        .alias("box")
        .description("An iron-bound chest.")
        .schedule("reset", Duration::from_secs(300), Duration::from_secs(60))
        .narrative()
        .build();

    let copy = original.copy();

    assert_ne!(copy.id(), original.id());
    assert_eq!(copy.describe(), original.describe());
    assert_eq!(copy.attributes().len(), original.attributes().len());
    for attribute in copy.attributes() {
        assert_eq!(attribute.owner().map(|owner| owner.id()), Some(copy.id()));
    }
}

#[test]
fn copy_keeps_origin_but_not_location() {
    let (_, hall) = realm_test::room("hall");
    let sword = TestEntityBuilder::new("sword").build();
    hall.add(sword.clone()).unwrap();

    let copy = sword.copy();
    let locate = copy.capability::<Locate>();

    assert!(locate.location().is_none());
    assert!(Arc::ptr_eq(&locate.origin().unwrap(), &hall));
    assert!(!hall.contains(&copy.id()).unwrap());
}

#[test]
fn copied_inventory_holds_copies_in_the_same_partitions() {
    init_logger();
    let backpack = TestEntityBuilder::new("backpack").inventory().build();
    let inventory = inventory_of(&backpack);

    let apple = TestEntityBuilder::new("apple").build();
    let map = TestEntityBuilder::new("map").narrative().build();
    let rock = TestEntityBuilder::new("rock").build();
    {
        let mut guard = inventory.lock().unwrap();
        for item in [&apple, &map, &rock] {
            guard.add(Arc::clone(item)).unwrap();
        }
        guard.enable(&apple.id()).unwrap();
        guard.enable(&map.id()).unwrap();
    }

    let copy = backpack.copy();
    let copied = inventory_of(&copy);
    assert_ne!(copied.token(), inventory.token());

    let guard = copied.lock().unwrap();
    assert_eq!(guard.len(), 3);
    assert!(guard.is_consistent());

    let names = |partition| -> Vec<String> {
        guard
            .members(partition)
            .iter()
            .map(|member| member.capability::<Name>().name().to_string())
            .collect()
    };
    assert_eq!(names(Partition::Others), vec!["apple"]);
    assert_eq!(names(Partition::Fixtures), vec!["map"]);
    assert_eq!(names(Partition::Disabled), vec!["rock"]);

    for member in Partition::ALL.iter().flat_map(|p| guard.members(*p)) {
        assert!(![apple.id(), map.id(), rock.id()].contains(&member.id()));
        let location = member.capability::<Locate>().location().unwrap();
        assert_eq!(location.token(), copied.token());
    }
    drop(guard);

    // originals untouched
    assert_located_in!(apple, inventory);
    assert_eq!(inventory.len().unwrap(), 3);
}

#[test]
fn copied_schedule_is_idle() {
    let original = TestEntityBuilder::new("wolf")
        .schedule("howl", Duration::from_millis(10), Duration::ZERO)
        .build();

    let copy = original.copy();
    let schedule = copy.attribute::<Schedule>().unwrap();

    assert!(!schedule.is_pending());
    assert_eq!(schedule.command(), "howl");
}

#[test]
fn freeing_inventory_frees_members() {
    let bag = TestEntityBuilder::new("bag").inventory().build();
    let inventory = inventory_of(&bag);
    let coin = TestEntityBuilder::new("coin").build();
    inventory.add(coin.clone()).unwrap();

    bag.free();

    assert!(bag.attributes().is_empty());
    assert!(coin.attributes().is_empty());
    assert_eq!(inventory.len().unwrap(), 0);
}

#[test]
fn downcast_container_from_attribute_list() {
    let crate_entity = TestEntityBuilder::new("crate").inventory().build();
    let container = crate_entity
        .attributes()
        .into_iter()
        .find_map(|attribute| {
            <dyn Attribute as AsAnyArc>::as_any_arc(attribute)
                .downcast::<Container>()
                .ok()
        });

    assert!(container.is_some());
}
