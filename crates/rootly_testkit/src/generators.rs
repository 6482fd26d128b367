//! Property-based test generators using proptest.
//!
//! Provides strategies for generating traversal frames and stacks that
//! satisfy the token invariants: non-empty ids, every frame belonging to
//! one schedule, and at most one schedule frame per stack.

use proptest::prelude::*;
use rootly_model::{Frame, TraversalStack};

/// Strategy for generating upstream ids (Rootly uses numeric ids and uuids).
pub fn upstream_id_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (1u32..10_000_000).prop_map(|n| n.to_string()),
        prop::string::string_regex("[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}")
            .expect("Invalid regex"),
    ]
}

/// Strategy for generating upstream page cursors, including the empty cursor.
pub fn cursor_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        (2u32..500, 1u32..200).prop_map(|(number, size)| {
            format!(
                "https://api.rootly.com/v1/schedules/x/schedule_rotations\
                 ?page%5Bnumber%5D={number}&page%5Bsize%5D={size}"
            )
        }),
    ]
}

/// Strategy for generating a single frame.
pub fn frame_strategy() -> impl Strategy<Value = Frame> {
    prop_oneof![
        (upstream_id_strategy(), cursor_strategy(), any::<bool>()).prop_map(
            |(schedule_id, rotation_cursor, owners_resolved)| Frame::Schedule {
                schedule_id,
                rotation_cursor,
                owners_resolved,
            }
        ),
        (upstream_id_strategy(), upstream_id_strategy())
            .prop_map(|(schedule_id, rotation_id)| Frame::rotation(schedule_id, rotation_id)),
    ]
}

/// Strategy for generating valid non-empty traversal stacks.
///
/// The optional schedule frame sits at the bottom, beneath the rotations
/// of its current page.
pub fn traversal_stack_strategy() -> impl Strategy<Value = TraversalStack> {
    (
        upstream_id_strategy(),
        prop::option::of((cursor_strategy(), any::<bool>())),
        prop::collection::vec(upstream_id_strategy(), 0..10),
    )
        .prop_filter("stack must not be empty", |(_, schedule, rotations)| {
            schedule.is_some() || !rotations.is_empty()
        })
        .prop_map(|(schedule_id, schedule, rotations)| {
            let bottom = schedule.map(|(rotation_cursor, owners_resolved)| Frame::Schedule {
                schedule_id: schedule_id.clone(),
                rotation_cursor,
                owners_resolved,
            });
            bottom
                .into_iter()
                .chain(
                    rotations
                        .into_iter()
                        .map(|rotation_id| Frame::rotation(schedule_id.as_str(), rotation_id)),
                )
                .collect()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn stack_token_round_trip(stack in traversal_stack_strategy()) {
            let token = stack.encode().unwrap();
            prop_assert!(!token.is_empty());

            let decoded = TraversalStack::decode(&token).unwrap();
            prop_assert_eq!(&decoded, &stack);
            prop_assert_eq!(decoded.encode().unwrap(), token);
        }

        #[test]
        fn decode_never_panics(token in ".{0,256}") {
            let _ = TraversalStack::decode(&token);
        }

        #[test]
        fn push_then_pop_restores_stack(
            stack in traversal_stack_strategy(),
            frame in frame_strategy(),
        ) {
            let mut working = stack.clone();
            working.push(frame.clone());
            prop_assert_eq!(working.peek(), Some(&frame));
            prop_assert_eq!(working.pop(), Some(frame));
            prop_assert_eq!(working, stack);
        }
    }
}
