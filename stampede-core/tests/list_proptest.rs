//! Property-based tests: list operations against a plain `Vec` model, and
//! block search against a naive reference.

use proptest::prelude::*;
use stampede_core::{ListError, ScanDirection, SnapshottableList};

const NO_ENTRY: i64 = -1;

// =============================================================================
// Model
// =============================================================================

#[derive(Clone, Debug)]
enum ListOp {
    Set { index: usize, value: i64 },
    Insert { at: usize, length: usize },
    Push(i64),
    Extend(Vec<i64>),
    SetLogicalSize(usize),
    Clear,
    ArrayCopy { src: usize, dst: usize, length: usize },
}

fn arbitrary_list_op() -> impl Strategy<Value = ListOp> {
    prop_oneof![
        (0..40usize, -100..100i64).prop_map(|(index, value)| ListOp::Set { index, value }),
        (0..40usize, 0..6usize).prop_map(|(at, length)| ListOp::Insert { at, length }),
        (-100..100i64).prop_map(ListOp::Push),
        prop::collection::vec(-100..100i64, 0..12).prop_map(ListOp::Extend),
        (0..48usize).prop_map(ListOp::SetLogicalSize),
        Just(ListOp::Clear),
        (0..40usize, 0..40usize, 0..10usize)
            .prop_map(|(src, dst, length)| ListOp::ArrayCopy { src, dst, length }),
    ]
}

/// Every slot up to capacity, plus the logical length.
struct Model {
    slots: Vec<i64>,
    size: usize,
}

impl Model {
    fn ensure_capacity(&mut self, required: usize) {
        if required > self.slots.len() {
            let new_capacity = (self.slots.len() * 2).max(required);
            self.slots.resize(new_capacity, NO_ENTRY);
        }
    }

    fn apply(&mut self, op: &ListOp) -> Result<(), ListError> {
        match op {
            ListOp::Set { index, value } => {
                if *index >= self.size {
                    return Err(ListError::OutOfRange {
                        index: *index,
                        len: self.size,
                    });
                }
                self.slots[*index] = *value;
            }
            ListOp::Insert { at, length } => {
                if *at > self.size {
                    return Err(ListError::OutOfRange {
                        index: *at,
                        len: self.size,
                    });
                }
                self.ensure_capacity(self.size + length);
                self.slots.copy_within(*at..self.size, at + length);
                self.slots[*at..at + length].fill(NO_ENTRY);
                self.size += length;
            }
            ListOp::Push(value) => {
                self.ensure_capacity(self.size + 1);
                self.slots[self.size] = *value;
                self.size += 1;
            }
            ListOp::Extend(values) => {
                self.ensure_capacity(self.size + values.len());
                self.slots[self.size..self.size + values.len()].copy_from_slice(values);
                self.size += values.len();
            }
            ListOp::SetLogicalSize(size) => {
                self.ensure_capacity(*size);
                if *size > self.size {
                    self.slots[self.size..*size].fill(NO_ENTRY);
                }
                self.size = *size;
            }
            ListOp::Clear => self.size = 0,
            ListOp::ArrayCopy { src, dst, length } => {
                let capacity = self.slots.len();
                for start in [*src, *dst] {
                    if start + length > capacity {
                        return Err(ListError::OutOfRange {
                            index: start + length,
                            len: capacity,
                        });
                    }
                }
                self.slots.copy_within(*src..src + length, *dst);
            }
        }
        Ok(())
    }
}

fn apply(list: &SnapshottableList, op: &ListOp) -> Result<(), ListError> {
    match op {
        ListOp::Set { index, value } => list.set(*index, *value),
        ListOp::Insert { at, length } => list.insert(*at, *length),
        ListOp::Push(value) => list.push(*value),
        ListOp::Extend(values) => list.extend_from_slice(values),
        ListOp::SetLogicalSize(size) => list.set_logical_size(*size),
        ListOp::Clear => {
            list.clear();
            Ok(())
        }
        ListOp::ArrayCopy { src, dst, length } => list.array_copy(*src, *dst, *length),
    }
}

// =============================================================================
// Naive block search
// =============================================================================

/// Linear search over the blocks from `floor` on. Past the last block, an
/// upward search reports the end and a downward search reports the floor.
fn naive_block_search(
    keys: &[i64],
    floor: usize,
    shl: u32,
    value: i64,
    direction: ScanDirection,
) -> isize {
    let not_found = |block: usize| -(((block << shl) as isize) + 1);
    if floor >= keys.len() {
        return match direction {
            ScanDirection::Up => not_found(keys.len()),
            ScanDirection::Down => not_found(floor),
        };
    }

    let window = &keys[floor..];
    let matches: Vec<usize> = window
        .iter()
        .enumerate()
        .filter(|(_, k)| **k == value)
        .map(|(i, _)| floor + i)
        .collect();

    let block = match direction {
        ScanDirection::Up => matches.first(),
        ScanDirection::Down => matches.last(),
    };

    match block {
        Some(block) => (*block << shl) as isize,
        None => not_found(floor + window.iter().filter(|k| **k < value).count()),
    }
}

fn direction() -> impl Strategy<Value = ScanDirection> {
    prop_oneof![Just(ScanDirection::Up), Just(ScanDirection::Down)]
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Every operation agrees with the model, including errors and capacity.
    #[test]
    fn list_matches_vec_model(
        initial_capacity in 0..8usize,
        ops in prop::collection::vec(arbitrary_list_op(), 1..60),
    ) {
        let list: SnapshottableList = SnapshottableList::new(initial_capacity, NO_ENTRY);
        let mut model = Model { slots: vec![NO_ENTRY; initial_capacity], size: 0 };
        let mut reader = list.reader();

        for op in &ops {
            let expected = model.apply(op);
            prop_assert_eq!(apply(&list, op), expected, "op {:?}", op);
            prop_assert_eq!(list.len(), model.size);
            prop_assert_eq!(list.capacity(), model.slots.len());

            let snapshot = reader.snapshot();
            prop_assert_eq!(snapshot.as_slice(), &model.slots[..model.size]);
            prop_assert_eq!(snapshot.capacity(), model.slots.len());
        }

        for i in 0..model.size {
            prop_assert_eq!(list.get(i), Ok(model.slots[i]));
        }
        prop_assert!(list.get(model.size).is_err());
    }

    /// Block search over sorted keys agrees with a linear reference, from any
    /// element offset, aligned or not, up to past the end.
    #[test]
    fn block_search_matches_naive(
        mut keys in prop::collection::vec(0..60i64, 0..400),
        shl in 0..4u32,
        offset_blocks in 0..420usize,
        offset_slack in 0..8usize,
        value in -5..65i64,
        direction in direction(),
    ) {
        keys.sort_unstable();
        let width = 1usize << shl;
        let offset = (offset_blocks << shl) + offset_slack % width;
        let floor = offset >> shl;
        // An equal key hit during bisection scrolls below the floor. Lowering
        // equal keys there keeps the order and the reference unambiguous.
        let below = floor.min(keys.len());
        for key in keys[..below].iter_mut().filter(|k| **k == value) {
            *key = value - 1;
        }

        let values: Vec<i64> = keys
            .iter()
            .flat_map(|k| std::iter::once(*k).chain(std::iter::repeat_n(i64::MAX, width - 1)))
            .collect();

        let list: SnapshottableList = SnapshottableList::new(values.len(), NO_ENTRY);
        list.extend_from_slice(&values).unwrap();

        let expected = naive_block_search(&keys, floor, shl, value, direction);
        prop_assert_eq!(list.binary_search_block(offset, shl, value, direction), expected);
        prop_assert_eq!(
            list.to_snapshot().binary_search_block(offset, shl, value, direction),
            expected
        );
    }
}
