//! A suite run through its own harness: `cargo test --test suite_harness -- --format json`.

use context_suite::harness_main;
use std::collections::VecDeque;
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};

// Bodies and teardowns of the "drains after each test" units.
static DRAINING_BODIES: AtomicUsize = AtomicUsize::new(0);
static DRAINED: AtomicUsize = AtomicUsize::new(0);

#[derive(Default)]
struct Queue {
    items: VecDeque<u32>,
    capacity: usize,
}

fn main() -> ExitCode {
    let code = harness_main::<Queue, _>(|s| {
        s.setup(|q| q.capacity = 2);

        s.a("Queue", |s| {
            s.test("starts empty", |q| assert!(q.items.is_empty()));

            s.that("has one item", |s| {
                s.setup(|q| q.items.push_back(1));
                s.test("pops it", |q| assert_eq!(q.items.pop_front(), Some(1)));
                s.and_also("a second item", |s| {
                    s.setup(|q| q.items.push_back(2));
                    s.test("is full", |q| assert_eq!(q.items.len(), q.capacity));
                    s.pending_test("rejects a third", |_| unimplemented!());
                    Ok(())
                })
            })?;

            s.that("drains after each test", |s| {
                s.teardown(|q| {
                    let drained = q.items.drain(..).count();
                    assert_eq!(drained, q.capacity, "teardown saw the body's items");
                    DRAINED.fetch_add(1, Ordering::SeqCst);
                });
                s.test("fills to capacity", |q| {
                    q.items.extend([7, 8]);
                    DRAINING_BODIES.fetch_add(1, Ordering::SeqCst);
                });
                Ok(())
            })
        })
    });

    let bodies = DRAINING_BODIES.load(Ordering::SeqCst);
    let drained = DRAINED.load(Ordering::SeqCst);
    if bodies != drained {
        eprintln!("teardown ran {drained} time(s) for {bodies} test body run(s)");
        return ExitCode::FAILURE;
    }
    code
}
