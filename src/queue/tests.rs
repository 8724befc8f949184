use super::*;
use crate::{ctx, error::Interrupted, testonly, time};
use assert_matches::assert_matches;
use std::sync::{Arc, Mutex};

#[tokio::test]
async fn deque_semantics() {
    testonly::abort_on_panic();
    let q = Queue::new();
    q.push_back(1);
    q.push_back(2);
    assert_eq!(2, q.len());
    assert_eq!(1, q.pop_front().unwrap());
    assert_eq!(1, q.len());
    q.push_front(0);
    assert_eq!(2, q.pop_back().unwrap());
    assert_eq!(0, q.pop_front().unwrap());
    assert_matches!(q.pop_front(), Err(Empty));
    assert_matches!(q.pop_back(), Err(Empty));
    assert!(q.is_empty());
}

#[tokio::test]
async fn consumer_processes_elements_sequentially() {
    testonly::abort_on_panic();
    let _guard = testonly::set_timeout(time::Duration::seconds(20));
    let ctx = &ctx::test_root(&ctx::RealClock);
    let q = Arc::new(Queue::from_iter(["a", "b", "c"]));
    let log = Arc::new(Mutex::new(Vec::new()));

    let worker = tokio::spawn({
        let q = q.clone();
        let ctx = ctx.clone();
        let log = log.clone();
        async move {
            q.consume(&ctx, |v| {
                let log = log.clone();
                async move {
                    log.lock().unwrap().push(format!("start {v}"));
                    // Suspend mid-element: the loop must not start the next
                    // element before this one signals completion.
                    tokio::task::yield_now().await;
                    log.lock().unwrap().push(format!("done {v}"));
                }
            })
            .await
        }
    });

    q.drained(ctx).await.unwrap();
    while log.lock().unwrap().len() < 6 {
        tokio::task::yield_now().await;
    }
    ctx.cancel();
    assert_eq!(Err(Interrupted), worker.await.unwrap());

    let expected: Vec<_> = ["start a", "done a", "start b", "done b", "start c", "done c"]
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(expected, *log.lock().unwrap());
}

#[tokio::test]
async fn consumer_picks_up_later_pushes() {
    testonly::abort_on_panic();
    let _guard = testonly::set_timeout(time::Duration::seconds(20));
    let ctx = &ctx::test_root(&ctx::RealClock);
    let q = Arc::new(Queue::new());
    let log = Arc::new(Mutex::new(Vec::new()));
    let worker = tokio::spawn({
        let q = q.clone();
        let ctx = ctx.clone();
        let log = log.clone();
        async move {
            q.consume(&ctx, |v: u32| {
                let log = log.clone();
                async move { log.lock().unwrap().push(v) }
            })
            .await
        }
    });

    // The loop is idle on an empty queue; pushes wake it up again.
    q.push_back(1);
    q.drained(ctx).await.unwrap();
    q.push_back(2);
    q.push_back(3);
    q.drained(ctx).await.unwrap();
    while log.lock().unwrap().len() < 3 {
        tokio::task::yield_now().await;
    }
    ctx.cancel();
    assert_eq!(Err(Interrupted), worker.await.unwrap());
    assert_eq!(vec![1, 2, 3], *log.lock().unwrap());
}

#[tokio::test]
async fn drained_resolves_immediately_when_empty() {
    testonly::abort_on_panic();
    let ctx = &ctx::test_root(&ctx::RealClock);
    let q = Queue::<u32>::new();
    // Zero timeout: the future must resolve on its first poll.
    tokio::time::timeout(std::time::Duration::ZERO, q.drained(ctx))
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn drained_fires_when_the_queue_empties() {
    testonly::abort_on_panic();
    let _guard = testonly::set_timeout(time::Duration::seconds(20));
    let ctx = &ctx::test_root(&ctx::RealClock);
    let q = Arc::new(Queue::new());
    q.push_back(1);
    let waiter = tokio::spawn({
        let q = q.clone();
        let ctx = ctx.clone();
        async move { q.drained(&ctx).await }
    });
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert!(!waiter.is_finished());
    q.pop_front().unwrap();
    waiter.await.unwrap().unwrap();
}
