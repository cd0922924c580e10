//! Shared fixtures for tests and benchmarks.
//!
//! Compiled for `cfg(test)` and for the `bench` feature so criterion
//! benches can reuse the same pool and clock implementations. The thread
//! pool here is reference tooling, not part of the core: production
//! embeds its own pool behind [`WorkerPool`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, unbounded, Sender};

use crate::dispatch::{Job, JobHandle, WorkerPool};
use crate::driver::SimClock;
use crate::tile::{ServiceKind, ZoneKind};
use crate::world::WorldGrid;

/// Minimal thread-backed worker pool: one unbounded job channel fanned out
/// to `workers` detached threads. Workers exit when the pool is dropped and
/// the job sender disconnects.
pub struct ThreadWorkerPool {
    tx: Sender<Job>,
    workers: usize,
}

impl ThreadWorkerPool {
    pub fn new(workers: usize) -> Self {
        let (tx, rx) = unbounded::<Job>();
        for _ in 0..workers {
            let rx = rx.clone();
            thread::spawn(move || {
                while let Ok(job) = rx.recv() {
                    job();
                }
            });
        }
        Self { tx, workers }
    }
}

impl WorkerPool for ThreadWorkerPool {
    fn worker_count(&self) -> usize {
        self.workers
    }

    fn submit(&self, job: Job) -> JobHandle {
        let (done_tx, done_rx) = bounded(1);
        let wrapped: Job = Box::new(move || {
            job();
            let _ = done_tx.send(());
        });
        self.tx.send(wrapped).expect("worker pool has exited");
        JobHandle::from_receiver(done_rx)
    }
}

/// Hand-driven clock for deterministic driver tests. Clones share the same
/// time source, so a test keeps one clone and advances it while the
/// simulation owns another.
#[derive(Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ns: u64) {
        self.now.fetch_add(ns, Ordering::SeqCst);
    }
}

impl SimClock for ManualClock {
    fn now_ns(&mut self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Zone a rectangle of tiles with utilities and decent service coverage,
/// marking everything dirty — enough for the default hooks to grow.
pub fn zone_block(world: &mut WorldGrid, x0: u32, y0: u32, w: u32, h: u32, zone: ZoneKind) {
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            world.edit_tile(x, y, |t| {
                t.zone = zone;
                t.density = 2;
                t.powered = true;
                t.watered = true;
                t.set_service(ServiceKind::Power, 255);
                t.set_service(ServiceKind::Water, 230);
                t.set_service(ServiceKind::Parks, 180);
            });
        }
    }
}
