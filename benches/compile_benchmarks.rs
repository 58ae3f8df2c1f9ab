//! Performance benchmarks for the TIL compile and run pipeline.
//!
//! Programs are generated as trees of growing size so that checking,
//! code generation and execution can be measured separately.
//!
//! ## Profiling with Puffin
//!
//! Run with the `profile-with-puffin` feature to collect pass timings:
//!
//! ```bash
//! cargo bench --features profile-with-puffin -- --profile-time 5
//! ```

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use til::ast::build::*;
use til::ast::{Declaration, Program};
use til::{Compiler, Type, Unit};

#[cfg(feature = "profile-with-puffin")]
static FRAME_VIEW: std::sync::OnceLock<puffin::GlobalFrameView> = std::sync::OnceLock::new();

#[cfg(feature = "profile-with-puffin")]
fn setup_profiler() {
    puffin::set_scopes_on(true);
    FRAME_VIEW.get_or_init(puffin::GlobalFrameView::default);
}

#[cfg(not(feature = "profile-with-puffin"))]
fn setup_profiler() {}

#[cfg(feature = "profile-with-puffin")]
fn end_profiling_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(not(feature = "profile-with-puffin"))]
fn end_profiling_frame() {}

/// `step{i}(int n) -> int` summing `i * k` for `k < n`, with a nested
/// helper of a wider type that forces a trampoline.
fn step_function(i: i32) -> Declaration {
    let body = block(
        vec![
            declare(Type::int(), "k", Some(int(0))),
            declare(Type::int(), "total", Some(int(0))),
            declare(
                Type::function(vec![Type::int()], Type::double()),
                "scale",
                Some(function(
                    vec![param("x", Type::double())],
                    Type::int(),
                    block(vec![], vec![ret(int(i))]),
                )),
            ),
        ],
        vec![
            loop_(
                lt(id("k"), id("n")),
                block(
                    vec![],
                    vec![
                        eval(assign(var("total"), add(id("total"), mul(id("k"), int(i))))),
                        eval(assign(var("k"), add(id("k"), int(1)))),
                    ],
                ),
            ),
            ret(id("total")),
        ],
    );
    declare_var(
        &format!("step{i}"),
        function(vec![param("n", Type::int())], Type::int(), body),
    )
}

fn generated_program(functions: i32) -> Program {
    let declarations = (0..functions).map(step_function).collect();
    let calls = (0..functions)
        .map(|i| println(vec![call(id(&format!("step{i}")), vec![int(10)])]))
        .collect();
    program(declarations, Some(block(vec![], calls)))
}

fn compile_benchmarks(c: &mut Criterion) {
    setup_profiler();

    let mut group = c.benchmark_group("compile");
    for functions in [1, 10, 100, 1000] {
        group.bench_function(format!("functions_{functions}"), |b| {
            b.iter_batched(
                || generated_program(functions),
                |mut program| {
                    let module = Compiler::compile(&mut program).unwrap();
                    end_profiling_frame();
                    black_box(module)
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn run_benchmarks(c: &mut Criterion) {
    setup_profiler();

    let mut unit = Unit::new(generated_program(100));
    unit.build().unwrap();

    c.bench_function("run/functions_100", |b| {
        b.iter(|| {
            let execution = unit.run(black_box("")).unwrap();
            end_profiling_frame();
            black_box(execution)
        });
    });
}

criterion_group!(benches, compile_benchmarks, run_benchmarks);
criterion_main!(benches);
