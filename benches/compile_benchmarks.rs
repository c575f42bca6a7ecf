//! Performance benchmarks for the Basalt unit build pipeline.
//!
//! Declaration trees are generated in memory, so these measure the four
//! passes and the recording backend only.
//!
//! Run with the `profiling` feature to get per-pass scopes from whichever
//! profiler backend is installed:
//!
//! ```bash
//! cargo bench --features profiling
//! ```

use basalt::basalt_compiler::{
    DataDecl, DeclNode, DeclSeq, DeclStmt, FuncDecl, GotoStmt, LabelStmt, LiteralExpr, StmtSeq,
    StructDecl, TypeTag, VarDecl, VectorDecl,
};
use basalt::basalt_core::{DeclFlags, Literal, Span};
use basalt::{CompileOptions, Unit};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

fn at(line: u32) -> Span {
    Span::point(line, 1)
}

fn lit(value: Literal) -> LiteralExpr {
    LiteralExpr::new(value, Span::default())
}

fn struct_decl(i: u32) -> DeclNode {
    let fields: DeclSeq = ["x", "y", "name"]
        .into_iter()
        .enumerate()
        .map(|(n, f)| {
            let tag = if f == "name" { TypeTag::String } else { TypeTag::Int };
            DeclNode::new(
                at(i + n as u32),
                VarDecl::new(f, tag, DeclFlags::FIELD).into(),
            )
        })
        .collect();
    DeclNode::new(at(i), StructDecl::new(format!("S{i}"), fields).into())
}

fn func_decl(i: u32) -> DeclNode {
    let params: DeclSeq = (0..3)
        .map(|p| {
            DeclNode::new(
                at(i),
                VarDecl::new(format!("a{p}"), TypeTag::Int, DeclFlags::PARAM).into(),
            )
        })
        .collect();
    let mut body = StmtSeq::new();
    body.push(DeclStmt::new(DeclNode::new(
        at(i + 1),
        VarDecl::new("s", TypeTag::String, DeclFlags::LOCAL)
            .with_init(lit(Literal::String("hi".into())))
            .into(),
    )));
    body.push(DeclStmt::new(DeclNode::new(
        at(i + 2),
        VarDecl::new("p", TypeTag::Named(format!("S{i}")), DeclFlags::LOCAL).into(),
    )));
    body.push(LabelStmt::new("top", at(i + 3)));
    body.push(GotoStmt::new("top", at(i + 4)));
    DeclNode::new(
        at(i),
        FuncDecl::new(format!("f{i}"), TypeTag::Int, params, body).into(),
    )
}

/// A unit with `n` groups of struct, function, global, array and data.
fn program(n: u32) -> Vec<DeclNode> {
    let mut decls = Vec::new();
    for i in 0..n {
        let line = i * 10;
        decls.push(func_decl(line));
        decls.push(struct_decl(line));
        decls.push(DeclNode::new(
            at(line + 5),
            VarDecl::new(format!("g{line}"), TypeTag::Float, DeclFlags::GLOBAL)
                .with_init(lit(Literal::Int(1)))
                .into(),
        ));
        decls.push(DeclNode::new(
            at(line + 6),
            VectorDecl::new(format!("v{line}"), TypeTag::Int, DeclFlags::GLOBAL)
                .with_dim(lit(Literal::Int(10)))
                .with_dim(lit(Literal::Int(10)))
                .into(),
        ));
        decls.push(DeclNode::new(
            at(line + 7),
            DataDecl::new(lit(Literal::String(format!("data {i}")))).into(),
        ));
    }
    decls
}

fn build(decls: Vec<DeclNode>, options: &CompileOptions) -> usize {
    let mut unit = Unit::new(options.clone());
    for decl in decls {
        unit.add_decl(decl).expect("unit is open");
    }
    unit.build().expect("benchmark program compiles").len()
}

fn bench_unit_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("unit/sizes");
    let options = CompileOptions::default();

    for n in [1u32, 10, 100, 1000] {
        group.throughput(Throughput::Elements(u64::from(n) * 5));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter_batched(
                || program(n),
                |decls| black_box(build(decls, &options)),
                criterion::BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn bench_debug_mode(c: &mut Criterion) {
    let mut group = c.benchmark_group("unit/debug");
    let release = CompileOptions::default();
    let debug = CompileOptions::default().with_debug(true);

    group.bench_function("release_100", |b| {
        b.iter_batched(
            || program(100),
            |decls| black_box(build(decls, &release)),
            criterion::BatchSize::LargeInput,
        );
    });
    group.bench_function("debug_100", |b| {
        b.iter_batched(
            || program(100),
            |decls| black_box(build(decls, &debug)),
            criterion::BatchSize::LargeInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_unit_sizes, bench_debug_mode);
criterion_main!(benches);
