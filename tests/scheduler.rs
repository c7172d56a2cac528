use fingermatch::{FingerError, Scheduler};
use std::sync::atomic::{AtomicUsize, Ordering};

fn schedulers() -> Vec<Scheduler> {
    vec![Scheduler::inline(), Scheduler::pool(0), Scheduler::pool(3), Scheduler::new()]
}

#[test]
fn split_covers_every_index_once() {
    for scheduler in schedulers() {
        for len in [0usize, 1, 2, 7, 100, 1013] {
            let hits: Vec<AtomicUsize> = (0..len).map(|_| AtomicUsize::new(0)).collect();
            scheduler
                .split(0..len, |chunk| {
                    for i in chunk {
                        hits[i].fetch_add(1, Ordering::Relaxed);
                    }
                })
                .unwrap();
            assert!(hits.iter().all(|h| h.load(Ordering::Relaxed) == 1), "{scheduler:?} {len}");
        }
    }
}

#[test]
fn row_bands_write_disjoint_rows() {
    for scheduler in schedulers() {
        let (width, height) = (13, 29);
        let mut data = vec![0usize; width * height];
        scheduler
            .for_each_row_mut(&mut data, width, |rows, band| {
                for (offset, y) in rows.enumerate() {
                    for x in 0..width {
                        band[offset * width + x] = y * width + x;
                    }
                }
            })
            .unwrap();
        assert!(data.iter().enumerate().all(|(i, &v)| i == v));
    }
}

#[test]
fn panics_surface_after_siblings_finish() {
    let scheduler = Scheduler::pool(3);
    let finished = AtomicUsize::new(0);
    let result = scheduler.split(0..4, |chunk| {
        if chunk.start == 0 {
            panic!("chunk zero failed");
        }
        finished.fetch_add(chunk.len(), Ordering::SeqCst);
    });
    match result {
        Err(FingerError::TaskFailed { reason }) => assert!(reason.contains("chunk zero failed")),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(finished.load(Ordering::SeqCst), 3);

    // The pool stays usable after a failure.
    let values = scheduler.map_range(10, |i| i * i).unwrap();
    assert_eq!(values[9], 81);
}

#[test]
fn scheduled_tasks_return_values() {
    for scheduler in schedulers() {
        let tickets: Vec<_> = (0..8).map(|i| scheduler.schedule(move || i * 2)).collect();
        let values: Vec<_> = tickets.into_iter().map(|t| t.wait().unwrap()).collect();
        assert_eq!(values, (0..8).map(|i| i * 2).collect::<Vec<_>>());
        let (a, b) = scheduler.join(|| "left", || 42).unwrap();
        assert_eq!((a, b), ("left", 42));
    }
}
