// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Matrix stack tests

use super::super::*;
use proptest::prelude::*;

fn marked(value: i32) -> Matrix {
    let mut m = Matrix::identity();
    m.field[3][0] = value;
    m
}

#[test]
fn test_new_stack() {
    let stack = MatrixStack::<31>::new();
    assert_eq!(stack.depth(), 31);
    assert_eq!(stack.pointer(), 0);
    assert!(!stack.error());
    assert_eq!(stack.current, Matrix::identity());
    assert_eq!(stack.slot(30), Some(&Matrix::identity()));
    assert_eq!(stack.slot(31), None);
}

#[test]
fn test_push_then_pop() {
    let mut stack = MatrixStack::<31>::new();
    stack.current = marked(7);
    stack.push();
    assert_eq!(stack.pointer(), 1);

    stack.current = Matrix::identity();
    stack.pop(1);
    assert_eq!(stack.pointer(), 0);
    assert_eq!(stack.current, marked(7));
    assert!(!stack.error());
}

#[test]
fn test_overflow_sets_error_and_saturates() {
    let mut stack = MatrixStack::<31>::new();
    for i in 0..31 {
        stack.current = marked(i);
        stack.push();
    }
    assert!(!stack.error());
    assert_eq!(stack.pointer(), 31);

    stack.current = marked(99);
    stack.push();
    assert!(stack.error());
    assert_eq!(stack.pointer(), 31);

    // The dropped push did not overwrite the top slot
    assert_eq!(stack.slot(30), Some(&marked(30)));
}

#[test]
fn test_single_slot_stack() {
    let mut stack = MatrixStack::<1>::new();
    stack.current = marked(1);
    stack.push();
    assert!(!stack.error());

    stack.push();
    assert!(stack.error());

    stack.acknowledge_error(true);
    assert!(!stack.error());
    assert_eq!(stack.pointer(), 0);

    // Underflow clamps to slot 0
    stack.pop(1);
    assert!(stack.error());
    assert_eq!(stack.pointer(), 0);
    assert_eq!(stack.current, marked(1));
}

#[test]
fn test_negative_pop_moves_forward() {
    let mut stack = MatrixStack::<31>::new();
    stack.push();
    stack.push();

    stack.pop(-3);
    assert_eq!(stack.pointer(), 5);
    assert!(!stack.error());
}

#[test]
fn test_pop_past_end_clamps() {
    let mut stack = MatrixStack::<31>::new();
    stack.pop(-40);
    assert_eq!(stack.pointer(), 30);
    assert!(stack.error());
}

#[test]
fn test_store_and_restore() {
    let mut stack = MatrixStack::<31>::new();
    stack.current = marked(12);
    stack.store(5);
    assert_eq!(stack.pointer(), 0);
    assert_eq!(stack.slot(5), Some(&marked(12)));

    stack.current = Matrix::identity();
    stack.restore(5);
    assert_eq!(stack.current, marked(12));

    stack.store(31);
    assert!(stack.error());
}

#[test]
fn test_single_slot_store_ignores_offset() {
    let mut stack = MatrixStack::<1>::new();
    stack.current = marked(3);
    stack.store(17);
    assert_eq!(stack.slot(0), Some(&marked(3)));
    assert!(!stack.error());

    stack.current = Matrix::identity();
    stack.restore(9);
    assert_eq!(stack.current, marked(3));
}

#[test]
fn test_acknowledge_without_rewind() {
    let mut stack = MatrixStack::<31>::new();
    stack.push();
    stack.pop(2);
    assert!(stack.error());

    stack.acknowledge_error(false);
    assert!(!stack.error());
    assert_eq!(stack.pointer(), 0);
}

#[test]
fn test_reset() {
    let mut stack = MatrixStack::<31>::new();
    stack.current = marked(4);
    stack.push();
    stack.push();
    stack.pop(5);
    stack.reset();

    assert_eq!(stack.pointer(), 0);
    assert!(!stack.error());
    assert_eq!(stack.current, Matrix::identity());
    assert_eq!(stack.slot(0), Some(&Matrix::identity()));
}

#[test]
fn test_state_round_trip_and_depth_check() {
    let mut stack = MatrixStack::<31>::new();
    stack.current = marked(2);
    stack.push();
    stack.current = marked(3);

    let state = stack.to_state();
    let mut restored = MatrixStack::<31>::new();
    assert!(restored.restore_from_state(&state));
    assert_eq!(restored.to_state(), state);

    let mut shallow = MatrixStack::<1>::new();
    assert!(!shallow.restore_from_state(&state));
    assert_eq!(shallow.current, Matrix::identity());
}

proptest! {
    #[test]
    fn prop_pops_return_pushes_in_reverse(count in 1usize..=31) {
        let mut stack = MatrixStack::<31>::new();
        for i in 0..count {
            stack.current = marked(i as i32);
            stack.push();
        }

        for i in (0..count).rev() {
            stack.pop(1);
            prop_assert_eq!(stack.current, marked(i as i32));
            prop_assert_eq!(stack.pointer(), i);
        }
        prop_assert!(!stack.error());
    }

    #[test]
    fn prop_pointer_stays_in_bounds(offsets in prop::collection::vec(-32i32..32, 1..40)) {
        let mut stack = MatrixStack::<31>::new();
        for offset in offsets {
            stack.pop(offset);
            prop_assert!(stack.pointer() < 31);
            stack.push();
            prop_assert!(stack.pointer() <= 31);
        }
    }
}
