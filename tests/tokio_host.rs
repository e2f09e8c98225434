use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use idlewatch::{ActiveDetector, ActivityState, EventTarget, Host, IdleDetector, TokioClock};
use tokio::task::LocalSet;
use tokio::time::sleep;

fn tokio_host() -> (Rc<EventTarget>, Host) {
    let document = Rc::new(EventTarget::new("document"));
    let host = Host::new(Rc::new(TokioClock::new()), document.clone());
    (document, host)
}

#[tokio::test(start_paused = true)]
async fn idle_fires_on_real_timer() {
    LocalSet::new()
        .run_until(async {
            let (_document, host) = tokio_host();
            let fired = Rc::new(Cell::new(0));
            let f = fired.clone();
            let idle = IdleDetector::new(&host);
            let mut rx = idle.subscribe();
            idle.add_default_interaction_surface()
                .configure_timeout(1, 1000)
                .repeat_firing(true)
                .on_fire(move || f.set(f.get() + 1))
                .start()
                .unwrap();

            sleep(Duration::from_millis(900)).await;
            assert_eq!(fired.get(), 0);

            sleep(Duration::from_millis(1200)).await;
            assert_eq!(fired.get(), 2);
            assert!(matches!(rx.recv().await, Ok(ActivityState::Idle { .. })));

            idle.stop();
            sleep(Duration::from_millis(5000)).await;
            assert_eq!(fired.get(), 2);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn interaction_delays_idle_on_real_timer() {
    LocalSet::new()
        .run_until(async {
            let (document, host) = tokio_host();
            let fired = Rc::new(Cell::new(0));
            let f = fired.clone();
            let idle = IdleDetector::new(&host);
            idle.add_default_interaction_surface()
                .configure_timeout(1, 1000)
                .on_fire(move || f.set(f.get() + 1))
                .start()
                .unwrap();

            sleep(Duration::from_millis(500)).await;
            document.dispatch("mousemove");

            sleep(Duration::from_millis(600)).await;
            assert_eq!(fired.get(), 0);

            sleep(Duration::from_millis(500)).await;
            assert_eq!(fired.get(), 1);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn active_transition_reaches_subscribers() {
    LocalSet::new()
        .run_until(async {
            let (document, host) = tokio_host();
            let active = ActiveDetector::new(&host);
            let mut rx = active.subscribe();
            active
                .add_default_interaction_surface()
                .configure_timeout(1, 1000)
                .start()
                .unwrap();

            sleep(Duration::from_millis(500)).await;
            document.dispatch("keydown");

            let state = tokio::time::timeout(Duration::from_millis(700), rx.recv())
                .await
                .expect("transition before the boundary passes")
                .unwrap();
            assert_eq!(state, ActivityState::Active);
        })
        .await;
}
