#![allow(clippy::unwrap_used, clippy::expect_used)]
//! High-contention stress over the generated event accessors.
//!
//! Many threads hammer `add`/`remove` on one shared instance. The
//! compare-exchange-retry loop in the synthesized bodies must never lose a
//! registration: after the dust settles, the backing field holds exactly
//! the handlers that were added and not removed.

use std::sync::Arc;

use rand::seq::SliceRandom;

use cil_eval::{DelegateTable, Instance, Value};
use cil_image::{ImageMethod, ImageParam, ImageType, TypeFlags, TypeSig};

fn event_type() -> ImageType {
    let mut ty = ImageType::new("Stress", "Emitter", TypeFlags::PUBLIC);
    let field = ty.push_field(cil_synth::event_backing_field("Tick"));
    ty.push_method(ImageMethod {
        name: "add_Tick".to_string(),
        flags: cil_synth::accessor_flags(false),
        ret: TypeSig::Void,
        params: vec![ImageParam::new("value", TypeSig::Handler)],
        body: cil_synth::event_adder_body(field),
    });
    ty.push_method(ImageMethod {
        name: "remove_Tick".to_string(),
        flags: cil_synth::accessor_flags(false),
        ret: TypeSig::Void,
        params: vec![ImageParam::new("value", TypeSig::Handler)],
        body: cil_synth::event_remover_body(field),
    });
    ty
}

#[test]
fn concurrent_add_remove_never_loses_a_handler() {
    const THREADS: u64 = 8;
    const PER_THREAD: u64 = 200;

    let ty = event_type();
    let table = Arc::new(DelegateTable::new());
    let instance = Instance::new(&ty);

    // Each thread owns a disjoint token range; it adds every token and
    // removes a pre-chosen half, with the op order shuffled so adds and
    // removes of different tokens interleave across threads.
    let mut kept: Vec<u64> = Vec::new();
    let mut plans: Vec<Vec<(u64, bool)>> = Vec::new();
    let mut rng = rand::thread_rng();
    for t in 0..THREADS {
        let mut ops = Vec::new();
        for i in 0..PER_THREAD {
            let token = t * PER_THREAD + i;
            let remove_it = i % 2 == 0;
            ops.push((token, remove_it));
            if !remove_it {
                kept.push(token);
            }
        }
        ops.shuffle(&mut rng);
        plans.push(ops);
    }

    std::thread::scope(|scope| {
        for plan in &plans {
            let table = Arc::clone(&table);
            let instance = &instance;
            scope.spawn(move || {
                for (token, remove_it) in plan {
                    let handler = table.singleton(*token);
                    instance
                        .call(&table, "add_Tick", &[Value::Handler(handler)])
                        .unwrap();
                    if *remove_it {
                        instance
                            .call(&table, "remove_Tick", &[Value::Handler(handler)])
                            .unwrap();
                    }
                }
            });
        }
    });

    let final_id = instance.handler_field("Tick").unwrap();
    let mut survivors = table.handlers(final_id);
    survivors.sort_unstable();
    kept.sort_unstable();
    assert_eq!(survivors, kept);
}

#[test]
fn removal_under_contention_only_touches_its_own_token() {
    const ROUNDS: u64 = 500;

    let ty = event_type();
    let table = Arc::new(DelegateTable::new());
    let instance = Instance::new(&ty);

    // A stable subscriber that must survive everything.
    let keeper = table.singleton(u64::MAX);
    instance
        .call(&table, "add_Tick", &[Value::Handler(keeper)])
        .unwrap();

    std::thread::scope(|scope| {
        for t in 0..4u64 {
            let table = Arc::clone(&table);
            let instance = &instance;
            scope.spawn(move || {
                for i in 0..ROUNDS {
                    let token = t * ROUNDS + i;
                    let handler = table.singleton(token);
                    instance
                        .call(&table, "add_Tick", &[Value::Handler(handler)])
                        .unwrap();
                    instance
                        .call(&table, "remove_Tick", &[Value::Handler(handler)])
                        .unwrap();
                }
            });
        }
    });

    let final_id = instance.handler_field("Tick").unwrap();
    assert_eq!(table.handlers(final_id), vec![u64::MAX]);
}
