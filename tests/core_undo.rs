use calclog::{
    core::{
        HistoryError,
        caretaker::UndoRedo,
        history::{HistoryLog, Snapshot},
    },
    engine::CalculationEngine,
    record::CalculationRecord,
    types::Operator,
};
use chrono::NaiveDate;

fn rec(op: Operator, a: i64, b: i64, sec: u32) -> CalculationRecord {
    let calc = CalculationEngine::default()
        .calculate(op, &a.into(), &b.into())
        .unwrap();
    let ts = NaiveDate::from_ymd_opt(2025, 1, 5)
        .unwrap()
        .and_hms_opt(14, 0, sec)
        .unwrap();
    CalculationRecord::new(calc, ts, "test-instance")
}

fn append(log: &mut HistoryLog, stacks: &mut UndoRedo, record: CalculationRecord) {
    stacks.record_before_mutation(log);
    log.append(record);
}

#[test]
fn undo_then_redo_returns_the_changed_record() {
    let mut log = HistoryLog::new(100);
    let mut stacks = UndoRedo::new();
    let first = rec(Operator::Add, 5, 2, 1);
    let second = rec(Operator::Multiply, 3, 4, 2);
    append(&mut log, &mut stacks, first.clone());
    append(&mut log, &mut stacks, second.clone());

    assert_eq!(stacks.undo(&mut log).unwrap(), Some(second.clone()));
    assert_eq!(log.to_vec(), vec![first.clone()]);

    assert_eq!(stacks.redo(&mut log).unwrap(), Some(second.clone()));
    assert_eq!(log.to_vec(), vec![first, second]);
}

#[test]
fn bound_evicts_oldest_first() {
    let mut log = HistoryLog::new(2);
    let a = rec(Operator::Add, 1, 1, 1);
    let b = rec(Operator::Add, 2, 2, 2);
    let c = rec(Operator::Add, 3, 3, 3);

    assert!(log.append(a.clone()).is_empty());
    assert!(log.append(b.clone()).is_empty());
    assert_eq!(log.append(c.clone()), vec![a]);
    assert_eq!(log.to_vec(), vec![b, c]);
}

#[test]
fn undo_restores_an_evicted_record() {
    let mut log = HistoryLog::new(2);
    let mut stacks = UndoRedo::new();
    let a = rec(Operator::Add, 1, 1, 1);
    let b = rec(Operator::Add, 2, 2, 2);
    let c = rec(Operator::Add, 3, 3, 3);
    for r in [a.clone(), b.clone(), c.clone()] {
        append(&mut log, &mut stacks, r);
    }

    assert_eq!(stacks.undo(&mut log).unwrap(), Some(c));
    assert_eq!(log.to_vec(), vec![a, b]);
}

#[test]
fn new_append_after_undo_invalidates_redo() {
    let mut log = HistoryLog::new(100);
    let mut stacks = UndoRedo::new();
    append(&mut log, &mut stacks, rec(Operator::Add, 1, 1, 1));
    append(&mut log, &mut stacks, rec(Operator::Add, 2, 2, 2));

    stacks.undo(&mut log).unwrap();
    assert!(stacks.can_redo());

    append(&mut log, &mut stacks, rec(Operator::Subtract, 9, 1, 3));
    assert!(!stacks.can_redo());
    assert_eq!(stacks.redo(&mut log).unwrap(), None);
    assert_eq!(log.len(), 2);
}

#[test]
fn empty_stacks_are_a_no_op() {
    let mut log = HistoryLog::new(10);
    let mut stacks = UndoRedo::new();
    log.append(rec(Operator::Add, 1, 1, 1));

    assert_eq!(stacks.undo(&mut log).unwrap(), None);
    assert_eq!(stacks.redo(&mut log).unwrap(), None);
    assert_eq!(log.len(), 1);
}

#[test]
fn duplicate_records_are_diffed_by_count() {
    let mut log = HistoryLog::new(100);
    let mut stacks = UndoRedo::new();
    let same = rec(Operator::Add, 2, 2, 7);
    append(&mut log, &mut stacks, same.clone());
    append(&mut log, &mut stacks, same.clone());

    assert_eq!(stacks.undo(&mut log).unwrap(), Some(same.clone()));
    assert_eq!(log.len(), 1);
    assert_eq!(stacks.redo(&mut log).unwrap(), Some(same));
    assert_eq!(log.len(), 2);
}

#[test]
fn clear_is_undoable_and_reports_empty() {
    let mut log = HistoryLog::new(10);
    let mut stacks = UndoRedo::new();
    let r = rec(Operator::Power, 2, 3, 1);
    append(&mut log, &mut stacks, r.clone());

    stacks.record_before_mutation(&log);
    assert!(log.clear());
    assert!(!log.clear());

    assert_eq!(stacks.undo(&mut log).unwrap(), None);
    assert_eq!(log.to_vec(), vec![r]);
}

#[test]
fn oversized_snapshot_is_rejected_without_side_effects() {
    let mut log = HistoryLog::new(1);
    let kept = rec(Operator::Add, 1, 1, 1);
    log.append(kept.clone());

    let too_big = Snapshot::new(vec![rec(Operator::Add, 2, 2, 2), rec(Operator::Add, 3, 3, 3)]);
    assert_eq!(
        log.restore(&too_big),
        Err(HistoryError::SnapshotExceedsCapacity { len: 2, max: 1 })
    );
    assert_eq!(log.to_vec(), vec![kept]);
}

#[test]
fn snapshots_are_independent_of_later_mutation() {
    let mut log = HistoryLog::new(10);
    log.append(rec(Operator::Add, 1, 1, 1));
    let snap = log.snapshot();
    log.append(rec(Operator::Add, 2, 2, 2));

    assert_eq!(snap.len(), 1);
    log.restore(&snap).unwrap();
    assert_eq!(log.len(), 1);
}

#[test]
fn undo_depth_is_capped_and_forgets_the_oldest_step() {
    let mut log = HistoryLog::new(100);
    let mut stacks = UndoRedo::with_depth(2);
    let records: Vec<_> = (1..=4).map(|i| rec(Operator::Add, i, i, i as u32)).collect();
    for r in &records {
        append(&mut log, &mut stacks, r.clone());
    }
    assert_eq!(stacks.undo_len(), 2);

    assert_eq!(stacks.undo(&mut log).unwrap(), Some(records[3].clone()));
    assert_eq!(stacks.undo(&mut log).unwrap(), Some(records[2].clone()));
    assert_eq!(stacks.undo(&mut log).unwrap(), None);
    assert_eq!(log.to_vec(), records[..2].to_vec());

    stacks.redo(&mut log).unwrap();
    stacks.redo(&mut log).unwrap();
    assert_eq!((stacks.undo_len(), stacks.redo_len()), (2, 0));
    assert_eq!(log.to_vec(), records);
}
