use std::{sync::Arc, time::Duration};

use proptest::prelude::*;
use tokio::{
    runtime::Builder,
    sync::mpsc::unbounded_channel,
    time::{sleep, Instant},
};

use realm_server::{EventState, Scheduler};
use realm_test::{init_logger, thing, RecordingScript};

fn paused_runtime() -> tokio::runtime::Runtime {
    Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_fire_time_within_window(after_ms in 0u64..500, jitter_ms in 0u64..300) {
        let runtime = paused_runtime();
        let elapsed = runtime.block_on(async {
            let scheduler = Scheduler::new(tokio::runtime::Handle::current());
            let (sender, mut fired) = unbounded_channel();
            scheduler
                .install_script(move |_, _| {
                    let _ = sender.send(Instant::now());
                })
                .unwrap();

            let start = Instant::now();
            scheduler.queue(
                thing("candle"),
                "gutter",
                Duration::from_millis(after_ms),
                Duration::from_millis(jitter_ms),
            );
            fired.recv().await.unwrap() - start
        });

        let after = Duration::from_millis(after_ms);
        let jitter = Duration::from_millis(jitter_ms);
        prop_assert!(elapsed >= after);
        if jitter.is_zero() {
            prop_assert!(elapsed < after + Duration::from_millis(1));
        } else {
            prop_assert!(elapsed < after + jitter);
        }
    }
}

#[tokio::test(start_paused = true)]
async fn every_target_fires_once() {
    init_logger();
    let scheduler = Scheduler::new(tokio::runtime::Handle::current());
    let script = RecordingScript::new();
    script.install(&scheduler).unwrap();

    let targets: Vec<_> = (0..10).map(|index| thing(&format!("seed {}", index))).collect();
    let events: Vec<_> = targets
        .iter()
        .map(|target| {
            scheduler.queue(
                Arc::clone(target),
                "sprout",
                Duration::from_millis(10),
                Duration::from_millis(90),
            )
        })
        .collect();

    sleep(Duration::from_millis(200)).await;

    assert_eq!(script.count(), targets.len());
    let mut fired: Vec<_> = script.fired().into_iter().map(|(id, _)| id).collect();
    fired.sort();
    let mut expected: Vec<_> = targets.iter().map(|target| target.id()).collect();
    expected.sort();
    assert_eq!(fired, expected);
    assert!(events.iter().all(|event| event.state() == EventState::Fired));
    assert_eq!(scheduler.pending(), 0);
}

#[tokio::test(start_paused = true)]
async fn cancelling_half_fires_the_rest() {
    let scheduler = Scheduler::new(tokio::runtime::Handle::current());
    let script = RecordingScript::new();
    script.install(&scheduler).unwrap();

    let events: Vec<_> = (0..8)
        .map(|index| {
            scheduler.queue(
                thing(&format!("bubble {}", index)),
                "pop",
                Duration::from_millis(50),
                Duration::from_millis(50),
            )
        })
        .collect();

    sleep(Duration::from_millis(20)).await;
    for event in events.iter().step_by(2) {
        assert!(event.cancel());
    }
    sleep(Duration::from_millis(200)).await;

    assert_eq!(script.count(), 4);
    let kept: Vec<_> = events.iter().skip(1).step_by(2).map(|e| e.target().id()).collect();
    assert!(script.fired().iter().all(|(id, _)| kept.contains(id)));
}
