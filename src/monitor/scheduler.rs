// src/monitor/scheduler.rs

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;
use tracing::info;

/// Stops a running [`Scheduler`] at its next wait.
#[derive(Clone)]
pub struct StopHandle(Sender<()>);

impl StopHandle {
    pub fn stop(&self) {
        // A closed channel means the scheduler is already gone.
        let _ = self.0.send(());
    }
}

/// Runs a job, waits `interval`, runs it again.
///
/// The wait is blocking but can be cut short with a [`StopHandle`].
pub struct Scheduler {
    interval: Duration,
    max_runs: Option<u64>,
    stop_tx: Sender<()>,
    stop_rx: Receiver<()>,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        let (stop_tx, stop_rx) = mpsc::channel();
        Self {
            interval,
            max_runs: None,
            stop_tx,
            stop_rx,
        }
    }

    /// Return after `n` runs instead of looping forever.
    pub fn with_max_runs(mut self, n: u64) -> Self {
        self.max_runs = Some(n);
        self
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(self.stop_tx.clone())
    }

    /// Drive `job` until it fails, the run limit is hit, or a stop is requested.
    /// Returns the number of completed runs.
    pub fn run<F, E>(&self, mut job: F) -> Result<u64, E>
    where
        F: FnMut() -> Result<(), E>,
    {
        let mut runs = 0;

        loop {
            job()?;
            runs += 1;

            if self.max_runs.is_some_and(|max| runs >= max) {
                return Ok(runs);
            }

            info!("waiting {} seconds...", self.interval.as_secs());
            match self.stop_rx.recv_timeout(self.interval) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    info!(runs, "stop requested");
                    return Ok(runs);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn stops_after_max_runs() {
        let scheduler = Scheduler::new(Duration::from_millis(1)).with_max_runs(3);
        let mut calls = 0;

        let runs = scheduler
            .run(|| -> Result<(), ()> {
                calls += 1;
                Ok(())
            })
            .unwrap();

        assert_eq!(runs, 3);
        assert_eq!(calls, 3);
    }

    #[test]
    fn single_run_does_not_wait() {
        let scheduler = Scheduler::new(Duration::from_secs(3600)).with_max_runs(1);
        let start = Instant::now();
        scheduler.run(|| -> Result<(), ()> { Ok(()) }).unwrap();
        assert!(start.elapsed() < Duration::from_secs(60));
    }

    #[test]
    fn job_error_ends_the_loop() {
        let scheduler = Scheduler::new(Duration::from_millis(1));
        let mut calls = 0;

        let err = scheduler
            .run(|| {
                calls += 1;
                if calls == 2 {
                    Err("store gone")
                } else {
                    Ok(())
                }
            })
            .unwrap_err();

        assert_eq!(err, "store gone");
        assert_eq!(calls, 2);
    }

    #[test]
    fn stop_from_signal_style_handler_ends_after_current_run() {
        let scheduler = Scheduler::new(Duration::from_secs(3600));
        let stop = scheduler.stop_handle();
        let mut handler: Box<dyn FnMut() + Send + 'static> = Box::new(move || stop.stop());

        let mut calls = 0;
        let runs = scheduler
            .run(|| -> Result<(), ()> {
                calls += 1;
                // Signal arrives while the job is running.
                handler();
                Ok(())
            })
            .unwrap();

        assert_eq!(runs, 1);
        assert_eq!(calls, 1);
    }

    #[test]
    fn stop_handle_interrupts_the_wait() {
        let scheduler = Scheduler::new(Duration::from_secs(3600));
        let handle = scheduler.stop_handle();

        let stopper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            handle.stop();
        });

        let start = Instant::now();
        let runs = scheduler.run(|| -> Result<(), ()> { Ok(()) }).unwrap();
        stopper.join().unwrap();

        assert_eq!(runs, 1);
        assert!(start.elapsed() < Duration::from_secs(60));
    }
}
