use bgworker::prelude::*;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn wait_until(timeout: Duration, cond: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    cond()
}

struct Append {
    index: usize,
    log: Arc<Mutex<Vec<usize>>>,
}

impl Runnable for Append {
    fn run(&self) {
        self.log.lock().push(self.index);
    }
}

#[test]
fn test_capacity_two_scenario() {
    let worker = BackgroundWorker::new("cap2", 2).unwrap();

    assert!(worker.execute(|| {}));
    assert!(worker.execute(|| {}));
    assert!(!worker.execute(|| {}));
    assert_eq!(worker.queue_depth(), 2);
}

#[test]
fn test_stop_right_after_submission_keeps_prefix_order() {
    let worker = BackgroundWorker::new("prefix", 100).unwrap();
    let log = Arc::new(Mutex::new(Vec::new()));

    worker.start().unwrap();
    for index in 0..100 {
        assert!(worker.submit(Arc::new(Append {
            index,
            log: log.clone(),
        })));
    }
    worker.stop();
    worker.wait_to_exit_timeout(Duration::from_millis(50));

    let log = log.lock();
    let expected: Vec<usize> = (0..log.len()).collect();
    assert_eq!(*log, expected);
}

#[test]
fn test_depth_matches_accepted_minus_completed() {
    let worker = BackgroundWorker::new("depth", 10).unwrap();
    let hold = Arc::new(Gate::blocked());
    let done = Arc::new(AtomicUsize::new(0));

    for _ in 0..6 {
        let hold = hold.clone();
        let done = done.clone();
        assert!(worker.execute(move || {
            hold.wait();
            done.fetch_add(1, Ordering::SeqCst);
        }));
    }
    assert_eq!(worker.queue_depth(), 6);

    worker.start().unwrap();
    hold.set();
    assert!(wait_until(Duration::from_secs(2), || done.load(Ordering::SeqCst) == 6));
    assert_eq!(worker.queue_depth(), 0);

    worker.stop();
}

#[test]
fn test_tasks_submitted_from_many_threads_all_run() {
    let worker = Arc::new(BackgroundWorker::new("mt", 1_000).unwrap());
    let count = Arc::new(AtomicUsize::new(0));
    worker.start().unwrap();

    let submitters: Vec<_> = (0..4)
        .map(|_| {
            let worker = worker.clone();
            let count = count.clone();
            thread::spawn(move || {
                for _ in 0..100 {
                    let count = count.clone();
                    assert!(worker.execute(move || {
                        count.fetch_add(1, Ordering::SeqCst);
                    }));
                }
            })
        })
        .collect();

    for s in submitters {
        s.join().unwrap();
    }

    assert!(wait_until(Duration::from_secs(2), || count.load(Ordering::SeqCst) == 400));
    worker.stop();
    assert!(worker.wait_to_exit_timeout(Duration::from_millis(100)));
}

#[test]
fn test_execution_timestamps_follow_submission_order() {
    let worker = BackgroundWorker::new("ts", 32).unwrap();
    let stamps = Arc::new(Mutex::new(Vec::new()));

    for i in 0..32 {
        let stamps = stamps.clone();
        worker.execute(move || stamps.lock().push((i, Instant::now())));
    }
    worker.start().unwrap();
    assert!(wait_until(Duration::from_secs(1), || stamps.lock().len() == 32));
    worker.stop();

    let stamps = stamps.lock();
    for pair in stamps.windows(2) {
        assert!(pair[0].0 < pair[1].0);
        assert!(pair[0].1 <= pair[1].1);
    }
}

#[test]
fn test_gate_scenario() {
    let gate = Arc::new(Gate::blocked());
    let waiter = {
        let gate = gate.clone();
        thread::spawn(move || gate.wait())
    };

    thread::sleep(Duration::from_millis(20));
    assert!(!waiter.is_finished());

    gate.set();
    waiter.join().unwrap();
    assert!(gate.wait_timeout(Duration::from_millis(1)).is_signaled());
}

#[test]
fn test_busy_flag_drops_after_stop() {
    let worker = BackgroundWorker::default();
    worker.start().unwrap();
    assert!(worker.is_busy());

    worker.stop();
    assert!(wait_until(Duration::from_millis(100), || !worker.is_busy()));
    assert!(worker.wait_to_exit());
}
