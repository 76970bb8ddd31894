use std::{hint::black_box, iter::repeat_with, sync::Arc};

use arrow::{
    array::{ArrayRef, Int64Array, RecordBatch, StringArray},
    datatypes::{DataType, Field, Schema},
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rowref::{BatchCursor, BatchPool, OwnedRowRef, RowRef, SortRow};

const SORT_KEY: [usize; 2] = [0, 1];

fn sorted_batch(rows: usize) -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("name", DataType::Utf8, false),
    ]));
    // Runs of four equal ids so most comparisons reach the second column.
    let ids = (0..rows as i64).map(|row| row / 4).collect::<Vec<_>>();
    let mut names = repeat_with(|| repeat_with(fastrand::alphanumeric).take(16).collect::<String>())
        .take(rows)
        .collect::<Vec<_>>();
    names.sort();
    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int64Array::from(ids)) as ArrayRef,
            Arc::new(StringArray::from(names)) as ArrayRef,
        ],
    )
    .expect("record batch")
}

#[inline(never)]
fn count_key_changes(sort_columns: &[ArrayRef], rows: usize) -> usize {
    let mut previous = RowRef::default();
    let mut changes = 0;
    for row in 0..rows {
        let current = RowRef::new(sort_columns, row, 0);
        if previous.is_empty() || !previous.equal_sort_key(&current) {
            changes += 1;
        }
        previous = current;
    }
    changes
}

fn compare_rows(c: &mut Criterion) {
    let mut group = c.benchmark_group("row_ref");

    for rows in [1024, 8192] {
        let batch = sorted_batch(rows);
        let sort_columns = SORT_KEY
            .iter()
            .map(|&idx| batch.column(idx).clone())
            .collect::<Vec<_>>();

        group.bench_with_input(
            BenchmarkId::new("equal_sort_key", rows),
            &sort_columns,
            |b, sort_columns| b.iter(|| black_box(count_key_changes(sort_columns, rows))),
        );
    }
    group.finish();
}

fn pool_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_pool");
    let batch = sorted_batch(1024);

    for capacity in [2, 16] {
        let pool = BatchPool::new(capacity);
        let cursor = BatchCursor::new(0, &batch, SORT_KEY.to_vec()).expect("cursor");

        group.bench_function(BenchmarkId::new("alloc_bind_release", capacity), |b| {
            b.iter(|| {
                let mut last = OwnedRowRef::default();
                for _ in 0..capacity {
                    let handle = pool.alloc(batch.clone(), &SORT_KEY);
                    last.bind(&cursor, handle);
                }
                black_box(last.is_empty())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, compare_rows, pool_churn);
criterion_main!(benches);
