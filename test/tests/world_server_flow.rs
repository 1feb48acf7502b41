use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

use realm_server::{EventState, Schedule, WorldConfig};
use realm_shared::{ContainerError, Entity, Locate, Partition};
use realm_test::{
    assert_located_in, assert_partitions_consistent, init_logger, player, thing,
    TestEntityBuilder, TestWorld, RESPAWN,
};

fn wait_until<F: Fn() -> bool>(timeout: Duration, condition: F) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    condition()
}

#[test]
fn respawn_returns_entity_home_under_contention() {
    init_logger();
    let world = TestWorld::new(WorldConfig::default(), 3).unwrap();
    let goblin = TestEntityBuilder::new("goblin")
        .schedule(RESPAWN, Duration::from_millis(20), Duration::from_millis(10))
        .build();

    world.room(0).add(goblin.clone()).unwrap();
    world.room(0).enable(&goblin.id()).unwrap();
    world.room(0).move_entity(&goblin.id(), world.room(2)).unwrap();
    assert_located_in!(goblin, world.room(2));

    let crowd: Vec<Arc<Entity>> = (0..12)
        .map(|index| {
            if index % 4 == 0 {
                player(&format!("adventurer {}", index))
            } else {
                thing(&format!("junk {}", index))
            }
        })
        .collect();
    for (index, member) in crowd.iter().enumerate() {
        world
            .server()
            .place(member.clone(), world.room(index % world.room_count()))
            .unwrap();
    }

    let rooms: Vec<_> = (0..world.room_count()).map(|i| world.room(i).clone()).collect();
    let running = Arc::new(AtomicBool::new(true));
    let actors: Vec<_> = (0..4u64)
        .map(|seed| {
            let (rooms, crowd, running) = (rooms.clone(), crowd.clone(), running.clone());
            thread::spawn(move || {
                let rng = fastrand::Rng::with_seed(seed);
                while running.load(Ordering::Relaxed) {
                    let member = &crowd[rng.usize(..crowd.len())];
                    let from = &rooms[rng.usize(..rooms.len())];
                    let to = &rooms[rng.usize(..rooms.len())];
                    match from.move_entity(&member.id(), to) {
                        Ok(_)
                        | Err(ContainerError::NotMember { .. })
                        | Err(ContainerError::SameContainer { .. }) => {}
                        Err(other) => panic!("actor failed: {}", other),
                    }
                }
            })
        })
        .collect();

    let schedule = goblin.attribute::<Schedule>().unwrap();
    let event = schedule.start(world.server().scheduler()).unwrap();

    let home = world.room(0).clone();
    let returned = wait_until(Duration::from_secs(5), || {
        goblin
            .capability::<Locate>()
            .location()
            .is_some_and(|location| Arc::ptr_eq(&location, &home))
    });

    running.store(false, Ordering::Relaxed);
    for actor in actors {
        actor.join().unwrap();
    }

    assert!(returned, "goblin never respawned");
    assert_eq!(event.state(), EventState::Fired);
    assert_located_in!(goblin, world.room(0));
    assert!(!world.room(2).contains(&goblin.id()).unwrap());
    assert_eq!(world.total_members().unwrap(), crowd.len() + 1);
    for index in 0..world.room_count() {
        assert_partitions_consistent!(world.room(index));
    }
    world.shutdown();
}

#[tokio::test(start_paused = true)]
async fn placed_schedule_respawns_on_paused_clock() {
    init_logger();
    let world = TestWorld::with_handle(
        WorldConfig::default(),
        tokio::runtime::Handle::current(),
        2,
    )
    .unwrap();
    let rat = TestEntityBuilder::new("rat")
        .schedule(RESPAWN, Duration::from_millis(50), Duration::ZERO)
        .build();

    assert_eq!(
        world.server().place(rat.clone(), world.room(0)).unwrap(),
        Partition::Others
    );
    world.room(0).move_entity(&rat.id(), world.room(1)).unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_located_in!(rat, world.room(0));
    assert_eq!(world.room(1).len().unwrap(), 0);
    assert!(!rat.attribute::<Schedule>().unwrap().is_pending());
}

#[tokio::test(start_paused = true)]
async fn other_commands_leave_entity_in_place() {
    let world = TestWorld::with_handle(
        WorldConfig::default(),
        tokio::runtime::Handle::current(),
        2,
    )
    .unwrap();
    let bat = thing("bat");
    world.server().place(bat.clone(), world.room(0)).unwrap();
    world.room(0).move_entity(&bat.id(), world.room(1)).unwrap();

    let event = world
        .server()
        .scheduler()
        .queue(bat.clone(), "flap", Duration::from_millis(5), Duration::ZERO);
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(event.state(), EventState::Fired);
    assert_located_in!(bat, world.room(1));
}

#[tokio::test(start_paused = true)]
async fn freed_entity_cancels_its_respawn() {
    let world = TestWorld::with_handle(
        WorldConfig::default(),
        tokio::runtime::Handle::current(),
        1,
    )
    .unwrap();
    let ghost = TestEntityBuilder::new("ghost")
        .schedule(RESPAWN, Duration::from_millis(30), Duration::ZERO)
        .build();
    world.server().place(ghost.clone(), world.room(0)).unwrap();
    let schedule = ghost.attribute::<Schedule>().unwrap();
    assert!(schedule.is_pending());

    world.room(0).remove(&ghost.id()).unwrap();
    ghost.free();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(!schedule.is_pending());
    assert_eq!(world.server().scheduler().pending(), 0);
    assert_eq!(world.room(0).len().unwrap(), 0);
}

#[test]
fn crowded_rooms_follow_config() {
    let config = WorldConfig {
        crowd_size: 2,
        ..WorldConfig::default()
    };
    let world = TestWorld::new(config, 1).unwrap();
    world.server().place(player("ann"), world.room(0)).unwrap();
    world.server().place(thing("barrel"), world.room(0)).unwrap();
    assert!(!world.server().is_crowded(&world.room(0).lock().unwrap()));

    world.server().place(player("ben"), world.room(0)).unwrap();
    assert!(world.server().is_crowded(&world.room(0).lock().unwrap()));
    world.shutdown();
}
