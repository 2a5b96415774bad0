//! Queue a few printing tasks, then give the worker 10ms before reporting
//! whatever is still queued.

use bgworker::prelude::*;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() -> bgworker::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let worker = BackgroundWorker::new("TestWorker", 100)?;
    worker.start()?;

    for _ in 0..10 {
        worker.execute(|| {
            let line: Vec<String> = (0..100).map(|i| i.to_string()).collect();
            println!("{}", line.join(" "));
        });
    }

    if !worker.wait_to_exit_timeout(Duration::from_millis(10)) {
        eprintln!("\n\nThere are {} tasks left", worker.queue_depth());
    }

    Ok(())
}
