use std::{collections::HashSet, thread};

use realm_shared::{AttributeRegistry, Container, Entity, EntityId};
use realm_test::thing;

#[test]
fn concurrent_entities_get_distinct_ids() {
    let handles: Vec<_> = (0..8)
        .map(|_| {
            thread::spawn(|| {
                (0..500)
                    .map(|index| thing(&format!("pebble {}", index)).id())
                    .collect::<Vec<EntityId>>()
            })
        })
        .collect();

    let mut seen = HashSet::new();
    for handle in handles {
        for id in handle.join().unwrap() {
            assert!(seen.insert(id), "duplicate id {}", id);
        }
    }
    assert_eq!(seen.len(), 8 * 500);
}

#[test]
fn concurrent_containers_get_distinct_tokens() {
    let handles: Vec<_> = (0..4)
        .map(|_| thread::spawn(|| (0..250).map(|_| Container::new().token()).collect::<Vec<_>>()))
        .collect();

    let mut seen = HashSet::new();
    for handle in handles {
        for token in handle.join().unwrap() {
            assert!(seen.insert(token), "duplicate token {}", token);
        }
    }
}

#[test]
fn copies_never_reuse_ids() {
    let original = thing("feather");
    let copies: HashSet<EntityId> = (0..100).map(|_| original.copy().id()).collect();

    assert_eq!(copies.len(), 100);
    assert!(!copies.contains(&original.id()));
}

#[test]
fn restored_ids_are_not_handed_out_again() {
    let restored: EntityId = "#zz00".parse().unwrap();
    let kept = AttributeRegistry::default().build(Some(restored), &[]).unwrap();

    let fresh = Entity::new(vec![]);
    assert_eq!(kept.id(), restored);
    assert!(fresh.id() > restored);
    assert_eq!(kept.id().to_string(), "#zz00");
}
