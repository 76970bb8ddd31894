//! Per-row equality over Arrow columns.
//!
//! Both row reference kinds funnel their sort-key checks through
//! [`check_equals`] and [`first_non_equal`]. Common column types take a
//! monomorphic path; everything else goes through Arrow's dynamic
//! comparator, which builds a boxed comparator per call and so allocates on
//! every row compared.
//!
//! Equality follows sort-key semantics rather than SQL semantics: two nulls
//! are equal, a null never equals a value, and floats compare by total order
//! so `NaN` equals `NaN`.

use arrow::{
    array::{make_comparator, Array, ArrayRef, ArrowNativeTypeOp, ArrowPrimitiveType, AsArray},
    compute::SortOptions,
    datatypes::{
        DataType, Date32Type, Date64Type, Decimal128Type, Float32Type, Float64Type, Int16Type,
        Int32Type, Int64Type, Int8Type, TimeUnit, TimestampMicrosecondType,
        TimestampMillisecondType, TimestampNanosecondType, TimestampSecondType, UInt16Type,
        UInt32Type, UInt64Type, UInt8Type,
    },
};

/// Whether `lhs[lhs_row]` equals `rhs[rhs_row]`.
///
/// Columns of different types never compare equal, including decimals of
/// different precision or scale and timestamps in different time zones.
pub fn columns_equal_at(lhs: &dyn Array, lhs_row: usize, rhs: &dyn Array, rhs_row: usize) -> bool {
    if lhs.data_type() != rhs.data_type() {
        return false;
    }
    match (lhs.is_null(lhs_row), rhs.is_null(rhs_row)) {
        (true, true) => return true,
        (true, false) | (false, true) => return false,
        (false, false) => {}
    }

    match lhs.data_type() {
        DataType::Int8 => primitive_eq::<Int8Type>(lhs, lhs_row, rhs, rhs_row),
        DataType::Int16 => primitive_eq::<Int16Type>(lhs, lhs_row, rhs, rhs_row),
        DataType::Int32 => primitive_eq::<Int32Type>(lhs, lhs_row, rhs, rhs_row),
        DataType::Int64 => primitive_eq::<Int64Type>(lhs, lhs_row, rhs, rhs_row),
        DataType::UInt8 => primitive_eq::<UInt8Type>(lhs, lhs_row, rhs, rhs_row),
        DataType::UInt16 => primitive_eq::<UInt16Type>(lhs, lhs_row, rhs, rhs_row),
        DataType::UInt32 => primitive_eq::<UInt32Type>(lhs, lhs_row, rhs, rhs_row),
        DataType::UInt64 => primitive_eq::<UInt64Type>(lhs, lhs_row, rhs, rhs_row),
        DataType::Float32 => primitive_eq::<Float32Type>(lhs, lhs_row, rhs, rhs_row),
        DataType::Float64 => primitive_eq::<Float64Type>(lhs, lhs_row, rhs, rhs_row),
        DataType::Date32 => primitive_eq::<Date32Type>(lhs, lhs_row, rhs, rhs_row),
        DataType::Date64 => primitive_eq::<Date64Type>(lhs, lhs_row, rhs, rhs_row),
        DataType::Decimal128(_, _) => primitive_eq::<Decimal128Type>(lhs, lhs_row, rhs, rhs_row),
        DataType::Timestamp(TimeUnit::Second, _) => {
            primitive_eq::<TimestampSecondType>(lhs, lhs_row, rhs, rhs_row)
        }
        DataType::Timestamp(TimeUnit::Millisecond, _) => {
            primitive_eq::<TimestampMillisecondType>(lhs, lhs_row, rhs, rhs_row)
        }
        DataType::Timestamp(TimeUnit::Microsecond, _) => {
            primitive_eq::<TimestampMicrosecondType>(lhs, lhs_row, rhs, rhs_row)
        }
        DataType::Timestamp(TimeUnit::Nanosecond, _) => {
            primitive_eq::<TimestampNanosecondType>(lhs, lhs_row, rhs, rhs_row)
        }
        DataType::Boolean => match (lhs.as_boolean_opt(), rhs.as_boolean_opt()) {
            (Some(l), Some(r)) => l.value(lhs_row) == r.value(rhs_row),
            _ => false,
        },
        DataType::Utf8 => match (lhs.as_string_opt::<i32>(), rhs.as_string_opt::<i32>()) {
            (Some(l), Some(r)) => l.value(lhs_row) == r.value(rhs_row),
            _ => false,
        },
        DataType::LargeUtf8 => match (lhs.as_string_opt::<i64>(), rhs.as_string_opt::<i64>()) {
            (Some(l), Some(r)) => l.value(lhs_row) == r.value(rhs_row),
            _ => false,
        },
        DataType::Binary => match (lhs.as_binary_opt::<i32>(), rhs.as_binary_opt::<i32>()) {
            (Some(l), Some(r)) => l.value(lhs_row) == r.value(rhs_row),
            _ => false,
        },
        DataType::LargeBinary => match (lhs.as_binary_opt::<i64>(), rhs.as_binary_opt::<i64>()) {
            (Some(l), Some(r)) => l.value(lhs_row) == r.value(rhs_row),
            _ => false,
        },
        _ => dynamic_eq(lhs, lhs_row, rhs, rhs_row),
    }
}

/// Whether every column pair in `lhs`/`rhs` is equal at the given rows.
///
/// Stops at the first mismatch. Both slices must have the same length.
pub fn check_equals(lhs: &[ArrayRef], lhs_row: usize, rhs: &[ArrayRef], rhs_row: usize) -> bool {
    debug_assert_eq!(lhs.len(), rhs.len(), "sort key width mismatch");
    lhs.iter()
        .zip(rhs)
        .all(|(l, r)| columns_equal_at(l.as_ref(), lhs_row, r.as_ref(), rhs_row))
}

/// Index of the first column at or after `offset` whose values differ, or
/// `lhs.len()` when the rows agree from `offset` onward.
///
/// Callers that already know a prefix is equal pass its length as `offset`
/// to skip re-comparing it.
pub fn first_non_equal(
    offset: usize,
    lhs: &[ArrayRef],
    lhs_row: usize,
    rhs: &[ArrayRef],
    rhs_row: usize,
) -> usize {
    debug_assert_eq!(lhs.len(), rhs.len(), "sort key width mismatch");
    let size = lhs.len();
    (offset..size)
        .find(|&idx| !columns_equal_at(lhs[idx].as_ref(), lhs_row, rhs[idx].as_ref(), rhs_row))
        .unwrap_or(size)
}

fn primitive_eq<T>(lhs: &dyn Array, lhs_row: usize, rhs: &dyn Array, rhs_row: usize) -> bool
where
    T: ArrowPrimitiveType,
{
    match (lhs.as_primitive_opt::<T>(), rhs.as_primitive_opt::<T>()) {
        (Some(l), Some(r)) => l.value(lhs_row).is_eq(r.value(rhs_row)),
        _ => false,
    }
}

// Dictionaries, fixed-size binary, views and nested types. Allocates a
// comparator on each call.
fn dynamic_eq(lhs: &dyn Array, lhs_row: usize, rhs: &dyn Array, rhs_row: usize) -> bool {
    match make_comparator(lhs, rhs, SortOptions::default()) {
        Ok(cmp) => cmp(lhs_row, rhs_row).is_eq(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::{
        array::{
            BooleanArray, Decimal128Array, DictionaryArray, Float64Array, Int32Array, Int64Array,
            StringArray, TimestampMillisecondArray,
        },
        datatypes::Int8Type as DictKey,
    };

    use super::*;

    fn key(ids: Vec<i64>, names: Vec<Option<&str>>) -> Vec<ArrayRef> {
        vec![
            Arc::new(Int64Array::from(ids)) as ArrayRef,
            Arc::new(StringArray::from(names)) as ArrayRef,
        ]
    }

    #[test]
    fn nulls_only_equal_nulls() {
        let names = StringArray::from(vec![Some("a"), None, None]);
        assert!(columns_equal_at(&names, 1, &names, 2));
        assert!(!columns_equal_at(&names, 0, &names, 1));
        assert!(!columns_equal_at(&names, 1, &names, 0));
    }

    #[test]
    fn floats_use_total_order() {
        let values = Float64Array::from(vec![f64::NAN, f64::NAN, 1.5, 1.5]);
        assert!(columns_equal_at(&values, 0, &values, 1));
        assert!(columns_equal_at(&values, 2, &values, 3));
        assert!(!columns_equal_at(&values, 0, &values, 2));
    }

    #[test]
    fn mismatched_types_never_equal() {
        let ints = Int32Array::from(vec![1]);
        let longs = Int64Array::from(vec![1]);
        assert!(!columns_equal_at(&ints, 0, &longs, 0));
    }

    #[test]
    fn decimal_scale_is_part_of_the_type() {
        let cents = Decimal128Array::from(vec![100])
            .with_precision_and_scale(10, 2)
            .expect("decimal(10, 2)");
        let mills = Decimal128Array::from(vec![100])
            .with_precision_and_scale(10, 3)
            .expect("decimal(10, 3)");
        assert!(!columns_equal_at(&cents, 0, &mills, 0));
        assert!(columns_equal_at(&cents, 0, &cents.clone(), 0));

        let wide = Decimal128Array::from(vec![100])
            .with_precision_and_scale(12, 2)
            .expect("decimal(12, 2)");
        assert!(!columns_equal_at(&cents, 0, &wide, 0));
    }

    #[test]
    fn timestamp_time_zone_is_part_of_the_type() {
        let utc = TimestampMillisecondArray::from(vec![1_000]).with_timezone("UTC");
        let tokyo = TimestampMillisecondArray::from(vec![1_000]).with_timezone("Asia/Tokyo");
        let naive = TimestampMillisecondArray::from(vec![1_000]);
        assert!(!columns_equal_at(&utc, 0, &tokyo, 0));
        assert!(!columns_equal_at(&utc, 0, &naive, 0));
        assert!(columns_equal_at(&utc, 0, &utc, 0));
    }

    #[test]
    fn booleans_compare_by_value() {
        let flags = BooleanArray::from(vec![true, false, true]);
        assert!(columns_equal_at(&flags, 0, &flags, 2));
        assert!(!columns_equal_at(&flags, 0, &flags, 1));
    }

    #[test]
    fn dictionary_columns_resolve_values() {
        let left: DictionaryArray<DictKey> = vec!["x", "y", "x"].into_iter().collect();
        let right: DictionaryArray<DictKey> = vec!["y", "x"].into_iter().collect();
        assert!(columns_equal_at(&left, 0, &right, 1));
        assert!(columns_equal_at(&left, 1, &right, 0));
        assert!(!columns_equal_at(&left, 2, &right, 0));
    }

    #[test]
    fn first_non_equal_reports_prefix_length() {
        let lhs = key(vec![10, 10], vec![Some("a"), Some("b")]);
        let rhs = key(vec![10, 11], vec![Some("b"), Some("b")]);

        assert_eq!(first_non_equal(0, &lhs, 0, &rhs, 0), 1);
        assert_eq!(first_non_equal(0, &lhs, 1, &rhs, 0), 2);
        assert_eq!(first_non_equal(0, &lhs, 1, &rhs, 1), 0);
        // Resuming past the differing column skips it.
        assert_eq!(first_non_equal(2, &lhs, 0, &rhs, 0), 2);
        assert_eq!(first_non_equal(5, &lhs, 0, &rhs, 0), 2);
    }

    #[test]
    fn check_equals_matches_full_scan() {
        let lhs = key(vec![1, 2, 2], vec![Some("a"), Some("b"), None]);
        for l in 0..3 {
            for r in 0..3 {
                assert_eq!(
                    check_equals(&lhs, l, &lhs, r),
                    first_non_equal(0, &lhs, l, &lhs, r) == lhs.len()
                );
            }
        }
        assert!(check_equals(&lhs, 2, &lhs, 2));
    }
}
