use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use calclog::{
    core::{caretaker::UndoRedo, history::HistoryLog},
    decimal::Decimal,
    engine::CalculationEngine,
    record::CalculationRecord,
    types::Operator,
};

fn record(engine: &CalculationEngine, i: i64) -> CalculationRecord {
    let calc = engine
        .calculate(Operator::Add, &Decimal::from(i % 1000), &Decimal::from(7))
        .expect("add");
    CalculationRecord::stamp_now(calc, "bench")
}

fn bench_calculate(c: &mut Criterion) {
    let engine = CalculationEngine::default();
    let mut group = c.benchmark_group("calculate");
    let operands: [(Operator, &str, &str); 4] = [
        (Operator::Add, "123.4567", "89.1011"),
        (Operator::Divide, "1", "3"),
        (Operator::Power, "2", "10"),
        (Operator::Root, "2", "3"),
    ];
    for (op, a, b) in operands {
        let a: Decimal = a.parse().expect("operand");
        let b: Decimal = b.parse().expect("operand");
        group.bench_with_input(BenchmarkId::from_parameter(op.command_name()), &op, |bench, &op| {
            bench.iter(|| engine.calculate(op, &a, &b).expect("calculate"));
        });
    }
    group.finish();
}

fn bench_bounded_append(c: &mut Criterion) {
    let engine = CalculationEngine::default();
    let records: Vec<_> = (0..10_000).map(|i| record(&engine, i)).collect();

    c.bench_function("history_append_10k_bound_100", |b| {
        b.iter(|| {
            let mut log = HistoryLog::new(100);
            for r in &records {
                let _ = log.append(r.clone());
            }
        });
    });
}

fn bench_undo_redo(c: &mut Criterion) {
    let engine = CalculationEngine::default();
    let mut group = c.benchmark_group("undo_redo_cycle");

    for bound in [10usize, 100, 1000] {
        let mut log = HistoryLog::new(bound);
        let mut stacks = UndoRedo::new();
        for i in 0..bound as i64 {
            stacks.record_before_mutation(&log);
            log.append(record(&engine, i));
        }
        group.bench_with_input(BenchmarkId::from_parameter(bound), &bound, |b, _| {
            b.iter(|| {
                stacks.undo(&mut log).expect("undo");
                stacks.redo(&mut log).expect("redo");
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_calculate, bench_bounded_append, bench_undo_redo);
criterion_main!(benches);
