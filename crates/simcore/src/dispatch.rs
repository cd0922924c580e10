//! Worker-pool interface and parallel chunk-update dispatch.
//!
//! The core never creates threads. It consumes a job-submission interface
//! ([`WorkerPool`]) and splits the due-chunk list into contiguous, disjoint
//! ranges, one job per worker. Disjointness is by construction — a chunk
//! belongs to exactly one tier queue per cycle — so no two jobs ever touch
//! the same chunk and chunk updates need no locks.
//!
//! Dispatch joins every job handle before returning. The aggregate-stats
//! pass that follows therefore observes fully written chunk state.

use crossbeam_channel::{bounded, Receiver};

use crate::scheduler::LodQueues;
use crate::updater::{update_chunk, TileHooks};
use crate::world::WorldGrid;

/// A unit of work submitted to the external pool.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Completion handle for a submitted job.
///
/// Resolves when the job has run; also resolves if the pool drops the job,
/// so a broken pool cannot wedge the driver.
pub struct JobHandle {
    rx: Receiver<()>,
}

impl JobHandle {
    /// Build a handle from a receiver the pool signals (or drops) when the
    /// job finishes.
    pub fn from_receiver(rx: Receiver<()>) -> Self {
        Self { rx }
    }

    /// A handle that is already resolved, for pools that run jobs inline.
    pub fn completed() -> Self {
        let (tx, rx) = bounded(0);
        drop(tx);
        Self { rx }
    }

    /// Block until the job has finished.
    pub fn wait(self) {
        let _ = self.rx.recv();
    }
}

/// External worker-pool abstraction consumed by the dispatcher.
pub trait WorkerPool: Send + Sync {
    /// Number of workers available for chunk-update jobs.
    fn worker_count(&self) -> usize;

    /// Submit an independent job for asynchronous execution.
    fn submit(&self, job: Job) -> JobHandle;
}

/// Update every chunk due this cycle, in parallel when a pool with workers
/// is available, otherwise synchronously in queue order.
pub fn update_chunks(
    world: &mut WorldGrid,
    queues: &LodQueues,
    tick: u64,
    hooks: &dyn TileHooks,
    world_seed: u64,
    pool: Option<&dyn WorkerPool>,
) {
    let due: Vec<u32> = queues.due().collect();
    if due.is_empty() {
        return;
    }

    match pool {
        Some(pool) if pool.worker_count() > 0 && due.len() > 1 => {
            update_parallel(world, &due, tick, hooks, world_seed, pool);
        }
        _ => {
            for idx in due {
                update_chunk(world.chunk_mut(idx), tick, hooks, world_seed);
            }
        }
    }
}

#[derive(Clone, Copy)]
struct ChunkTablePtr(*mut crate::chunk::Chunk);
// SAFETY: the pointer is only dereferenced at indices from disjoint ranges,
// and all jobs are joined before the underlying borrow ends.
unsafe impl Send for ChunkTablePtr {}

#[derive(Clone, Copy)]
struct HooksPtr(*const dyn TileHooks);
// SAFETY: `TileHooks` requires Send + Sync; the pointee outlives the jobs
// because dispatch joins every handle before returning.
unsafe impl Send for HooksPtr {}

fn update_parallel(
    world: &mut WorldGrid,
    due: &[u32],
    tick: u64,
    hooks: &dyn TileHooks,
    world_seed: u64,
    pool: &dyn WorkerPool,
) {
    let jobs = pool.worker_count().min(due.len());
    let per_job = due.len().div_ceil(jobs);

    let table = ChunkTablePtr(world.chunks_mut_ptr());
    // SAFETY: erases the borrow lifetime only; the reference stays live until
    // every job handle is joined below.
    let hooks_ptr = HooksPtr(unsafe {
        std::mem::transmute::<*const (dyn TileHooks + '_), *const (dyn TileHooks + 'static)>(hooks)
    });

    let mut handles = Vec::with_capacity(jobs);
    for range in due.chunks(per_job) {
        let indices = range.to_vec();
        handles.push(pool.submit(Box::new(move || {
            // Capture the whole Send wrappers, not their raw-pointer fields.
            let (table, hooks_ptr) = (table, hooks_ptr);
            // SAFETY: each chunk index occurs in exactly one range (a chunk
            // is queued in at most one tier per cycle), so no two jobs alias
            // a chunk; the borrows behind both pointers stay live until the
            // join below completes.
            let hooks = unsafe { &*hooks_ptr.0 };
            for idx in indices {
                let chunk = unsafe { &mut *table.0.add(idx as usize) };
                update_chunk(chunk, tick, hooks, world_seed);
            }
        })));
    }

    // Barrier: the stats pass that follows must not race in-flight writes.
    for handle in handles {
        handle.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_harness::ThreadWorkerPool;
    use crate::tile::{ServiceKind, ZoneKind};
    use crate::updater::DefaultHooks;
    use crate::visibility::{classify, Camera};

    fn dirty_world() -> WorldGrid {
        let mut world = WorldGrid::new(128, 128).expect("valid dims");
        for y in (0..128).step_by(3) {
            for x in (0..128).step_by(5) {
                world.edit_tile(x, y, |t| {
                    t.zone = ZoneKind::Commercial;
                    t.density = 2;
                    t.powered = true;
                    t.watered = true;
                    t.set_service(ServiceKind::Power, 255);
                    t.set_service(ServiceKind::Police, 200);
                });
            }
        }
        classify(
            &mut world,
            Camera {
                tile_x: 64,
                tile_y: 64,
                view_distance: 128,
            },
        );
        world
    }

    fn run(world: &mut WorldGrid, pool: Option<&dyn WorkerPool>) {
        let mut queues = LodQueues::new();
        queues.schedule(world, 0);
        assert!(queues.total() > 1);
        update_chunks(world, &queues, 0, &DefaultHooks, 77, pool);
    }

    #[test]
    fn test_parallel_matches_synchronous() {
        let mut sync_world = dirty_world();
        run(&mut sync_world, None);

        let pool = ThreadWorkerPool::new(4);
        let mut par_world = dirty_world();
        run(&mut par_world, Some(&pool));

        assert_eq!(sync_world.aggregate_stats(), par_world.aggregate_stats());
        for i in 0..sync_world.chunk_count() as u32 {
            assert_eq!(sync_world.chunk(i).stats, par_world.chunk(i).stats);
            for t in 0..crate::config::TILES_PER_CHUNK {
                assert_eq!(sync_world.chunk(i).tile(t), par_world.chunk(i).tile(t));
            }
        }
    }

    #[test]
    fn test_zero_worker_pool_falls_back_to_synchronous() {
        struct NoWorkers;
        impl WorkerPool for NoWorkers {
            fn worker_count(&self) -> usize {
                0
            }
            fn submit(&self, _job: Job) -> JobHandle {
                panic!("must not be called with zero workers");
            }
        }

        let mut world = dirty_world();
        run(&mut world, Some(&NoWorkers));
        assert!(world.aggregate_stats().jobs > 0);
    }

    #[test]
    fn test_all_dirty_chunks_updated_and_clean_after_dispatch() {
        let pool = ThreadWorkerPool::new(3);
        let mut world = dirty_world();
        run(&mut world, Some(&pool));
        for &idx in world.active_chunks() {
            assert!(!world.chunk(idx).is_dirty());
        }
        assert!(world.aggregate_stats().jobs > 0);
    }

    #[test]
    fn test_completed_handle_resolves_immediately() {
        JobHandle::completed().wait();
    }
}
