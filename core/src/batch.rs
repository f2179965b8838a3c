use std::thread;

use crossbeam_channel::{bounded, unbounded};
use geo::Coord;

use crate::{locator::Locator, store::RegionId};

/// Number of points a worker locates at a time
const CHUNK_SIZE: usize = 1024;

/// The default number of worker threads: one per CPU
pub fn default_workers() -> usize {
    num_cpus::get()
}

/// Locates all points on `workers` threads. The result contains the
/// identifier of the region containing each point (or [`None`]) in the
/// order of `points`.
pub fn locate_all(locator: &Locator, points: &[Coord], workers: usize) -> Vec<Option<RegionId>> {
    let locate_chunk = |chunk: &[Coord]| -> Vec<Option<RegionId>> {
        chunk.iter().map(|p| locator.locate(*p).map(|m| m.id)).collect()
    };

    let workers = workers.max(1);
    if workers == 1 || points.len() <= CHUNK_SIZE {
        return locate_chunk(points);
    }

    let mut results = vec![None; points.len()];

    thread::scope(|scope| {
        let (chunk_send, chunk_recv) = bounded::<(usize, &[Coord])>(workers * 2);
        let (result_send, result_recv) = unbounded::<(usize, Vec<Option<RegionId>>)>();

        for _ in 0..workers {
            let chunk_recv = chunk_recv.clone();
            let result_send = result_send.clone();
            scope.spawn(move || {
                for (offset, chunk) in chunk_recv {
                    if result_send.send((offset, locate_chunk(chunk))).is_err() {
                        break;
                    }
                }
            });
        }
        drop(chunk_recv);
        drop(result_send);

        for (i, chunk) in points.chunks(CHUNK_SIZE).enumerate() {
            if chunk_send.send((i * CHUNK_SIZE, chunk)).is_err() {
                break;
            }
        }
        drop(chunk_send);

        for (offset, located) in result_recv {
            results[offset..offset + located.len()].copy_from_slice(&located);
        }
    });

    results
}
