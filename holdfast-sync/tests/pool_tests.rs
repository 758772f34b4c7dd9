use holdfast_sync::{ConnectionMonitor, Connectivity, ObjectPool, StagingQueue};

// ── Object pool ─────────────────────────────────────────────────

#[test]
fn checkout_allocates_when_empty() {
    let pool: ObjectPool<Vec<u32>> = ObjectPool::new(2);
    assert_eq!(pool.available(), 0);

    let batch = pool.checkout();
    assert!(batch.is_empty());
    assert_eq!(pool.outstanding(), 1);
}

#[test]
fn dropped_values_return_recycled() {
    let pool: ObjectPool<Vec<u32>> = ObjectPool::new(2);
    {
        let mut batch = pool.checkout();
        batch.extend([1, 2, 3]);
    }
    assert_eq!(pool.outstanding(), 0);
    assert_eq!(pool.available(), 1);

    let batch = pool.checkout();
    assert!(batch.is_empty());
    assert!(batch.capacity() >= 3);
}

#[test]
fn pool_retains_at_most_capacity() {
    let pool: ObjectPool<Vec<u32>> = ObjectPool::new(1);
    let a = pool.checkout();
    let b = pool.checkout();
    drop(a);
    drop(b);
    assert_eq!(pool.available(), 1);
    assert_eq!(pool.outstanding(), 0);
}

#[test]
fn values_return_on_early_exit() {
    fn fill(pool: &ObjectPool<Vec<u32>>, fail: bool) -> Result<usize, &'static str> {
        let mut batch = pool.checkout();
        batch.push(7);
        if fail {
            return Err("boom");
        }
        Ok(batch.len())
    }

    let pool = ObjectPool::new(4);
    assert!(fill(&pool, true).is_err());
    assert_eq!(pool.outstanding(), 0);
    assert_eq!(pool.available(), 1);
}

// ── Staging queue ───────────────────────────────────────────────

#[test]
fn take_empties_queue_in_order() {
    let queue = StagingQueue::new();
    queue.push(1);
    queue.extend([2, 3]);
    assert_eq!(queue.len(), 3);

    assert_eq!(queue.take(), vec![1, 2, 3]);
    assert!(queue.is_empty());
}

#[test]
fn restored_batch_goes_ahead_of_new_entries() {
    let queue = StagingQueue::new();
    queue.extend([1, 2]);
    let batch = queue.take();
    queue.push(3);

    queue.restore_front(batch);
    assert_eq!(queue.take(), vec![1, 2, 3]);
}

// ── Connection monitor ──────────────────────────────────────────

#[test]
fn monitor_starts_unknown() {
    let monitor = ConnectionMonitor::new();
    assert_eq!(monitor.state(), Connectivity::Unknown);
    assert!(!monitor.is_offline());
}

#[tokio::test]
async fn subscribers_see_changes() {
    let monitor = ConnectionMonitor::new();
    let mut rx = monitor.subscribe();

    monitor.set(Connectivity::Offline);
    rx.changed().await.unwrap();
    assert_eq!(*rx.borrow_and_update(), Connectivity::Offline);
    assert!(monitor.is_offline());
}

#[test]
fn setting_same_state_does_not_notify() {
    let monitor = ConnectionMonitor::new();
    let rx = monitor.subscribe();

    monitor.set(Connectivity::Unknown);
    assert!(!rx.has_changed().unwrap());

    monitor.set(Connectivity::Online);
    assert!(rx.has_changed().unwrap());
}
