use super::*;
use crate::testonly;

#[tokio::test]
async fn wait_returns_interrupted_on_cancel() {
    testonly::abort_on_panic();
    let ctx = &root();
    assert!(ctx.is_active());
    assert_eq!(Ok(7), ctx.wait(async { 7 }).await);
    ctx.cancel();
    assert!(!ctx.is_active());
    assert_eq!(
        Err(Interrupted),
        ctx.wait(std::future::pending::<()>()).await
    );
}

#[tokio::test]
async fn cancel_is_visible_to_clones() {
    testonly::abort_on_panic();
    let ctx = root();
    let clone = ctx.clone();
    let waiter = tokio::spawn(async move { clone.canceled().await });
    ctx.cancel();
    waiter.await.unwrap();
}

#[test]
fn clock_advance() {
    testonly::abort_on_panic();
    let clock = ManualClock::new();
    let ctx = &test_root(&clock);
    let now = ctx.now();
    let delta = time::Duration::seconds(10);
    clock.advance(delta);
    assert_eq!(ctx.now(), now + delta);
}

#[tokio::test]
async fn manual_sleep_blocks_until_advanced() {
    testonly::abort_on_panic();
    let _guard = testonly::set_timeout(time::Duration::seconds(20));
    let clock = ManualClock::new();
    let ctx = test_root(&clock);
    let sec = time::Duration::SECOND;
    let t = ctx.now() + 1000 * sec;

    let sleeper = tokio::spawn({
        let ctx = ctx.clone();
        async move { ctx.sleep(1000 * sec).await }
    });
    // Let the sleeper register its wake target before advancing the clock,
    // otherwise the target would be computed from the advanced time.
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    clock.advance_until(t - sec);
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert!(!sleeper.is_finished());
    clock.advance_until(t);
    sleeper.await.unwrap().unwrap();

    // A canceled context interrupts the sleep.
    let sleeper = tokio::spawn({
        let ctx = ctx.clone();
        async move { ctx.sleep(1000 * sec).await }
    });
    ctx.cancel();
    assert_eq!(Err(Interrupted), sleeper.await.unwrap());
}
