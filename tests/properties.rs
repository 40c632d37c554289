//! Generated checks for encoding, batching and replay partitioning.

use std::collections::HashSet;

use bytes::BytesMut;
use proptest::{
    collection::vec,
    prelude::{Strategy, any},
    prop_assert,
    prop_assert_eq,
    test_runner::{Config as ProptestConfig, RngAlgorithm, TestCaseError, TestRng, TestRunner},
};
use pushframe::{
    ErrorEvent,
    Notification,
    NotificationId,
    frame::{FRAME_HEADER_LEN, FrameBuffer, FrameDecoder, decode_item, encode_item},
    replay::{IdGenerator, IdentifiedPayload, ReplayBuffer},
};
use rstest::rstest;
use tokio_util::codec::Decoder;

fn deterministic_runner(cases: u32) -> TestRunner {
    let config = ProptestConfig {
        cases,
        ..ProptestConfig::default()
    };
    let rng = TestRng::deterministic_rng(RngAlgorithm::ChaCha);
    TestRunner::new_with_rng(config, rng)
}

fn peer_error(id: u32) -> ErrorEvent {
    let id = id.to_be_bytes();
    ErrorEvent::from_response([8, 8, id[0], id[1], id[2], id[3]])
}

fn history(capacity: usize, count: u32) -> ReplayBuffer<u32> {
    let mut ids = IdGenerator::new();
    let mut replay = ReplayBuffer::new(capacity);
    for n in 1..=count {
        replay.record(IdentifiedPayload::new(ids.next_id(), n));
    }
    replay
}

fn notification_strategy(max_payload: usize) -> impl Strategy<Value = Notification> {
    (
        any::<[u8; 32]>(),
        vec(any::<u8>(), 0..=max_payload),
        any::<u8>(),
        any::<u32>(),
    )
        .prop_map(|(token, body, priority, expiry)| {
            Notification::new(hex::encode(token), body)
                .with_priority(priority)
                .with_expiration(expiry)
        })
}

#[rstest]
#[case(1, 64)]
#[case(16, 128)]
fn retained_error_splits_history(#[case] capacity: usize, #[case] cases: u32) {
    let mut runner = deterministic_runner(cases);
    let capacity_u32 = u32::try_from(capacity).expect("small capacity");
    let strategy = (1..=capacity_u32).prop_flat_map(|n| (proptest::strategy::Just(n), 1..=n));

    runner
        .run(&strategy, |(count, failed)| {
            let close = history(capacity, count).resolve(peer_error(failed));
            prop_assert_eq!(close.error_payload, Some(failed));
            prop_assert_eq!(
                close.unsent_payloads,
                ((failed + 1)..=count).collect::<Vec<_>>()
            );
            prop_assert!(!close.unsent_buffer_overflow);
            Ok(())
        })
        .expect("partition property failed");
}

#[rstest]
#[case(1, 64)]
#[case(8, 128)]
fn evicted_error_flags_overflow(#[case] capacity: usize, #[case] cases: u32) {
    let mut runner = deterministic_runner(cases);
    let capacity_u32 = u32::try_from(capacity).expect("small capacity");
    let strategy = ((capacity_u32 + 1)..=(capacity_u32 * 4))
        .prop_flat_map(move |n| (proptest::strategy::Just(n), 1..=(n - capacity_u32)));

    runner
        .run(&strategy, |(count, failed)| {
            let close = history(capacity, count).resolve(peer_error(failed));
            prop_assert_eq!(close.error_payload, None);
            prop_assert!(close.unsent_buffer_overflow);
            prop_assert_eq!(close.unsent_payloads.len(), capacity);
            prop_assert_eq!(close.unsent_payloads.last().copied(), Some(count));
            Ok(())
        })
        .expect("overflow property failed");
}

#[rstest]
fn ids_never_zero_or_repeated() {
    let mut runner = deterministic_runner(64);
    let strategy = (1u32..=u32::MAX, 1usize..512);

    runner
        .run(&strategy, |(start, steps)| {
            let start = NotificationId::new(start)
                .ok_or_else(|| TestCaseError::fail("zero start id"))?;
            let mut ids = IdGenerator::after(start);
            let mut seen = HashSet::new();
            for _ in 0..steps {
                let id = ids.next_id();
                prop_assert!(id.get() != 0);
                prop_assert!(seen.insert(id), "id {} repeated", id);
            }
            Ok(())
        })
        .expect("id property failed");
}

#[rstest]
#[case(256, 128)]
fn encoded_items_round_trip(#[case] max_payload: usize, #[case] cases: u32) {
    let mut runner = deterministic_runner(cases);
    let strategy = (notification_strategy(max_payload), 1u32..=u32::MAX);

    runner
        .run(&strategy, |(notification, raw_id)| {
            use pushframe::Payload;

            let id = NotificationId::new(raw_id)
                .ok_or_else(|| TestCaseError::fail("zero id"))?;
            let item = encode_item(&notification, id, max_payload)
                .map_err(|err| TestCaseError::fail(format!("encode failed: {err}")))?;
            let mut wire = bytes::Bytes::copy_from_slice(item.as_bytes());
            let decoded = decode_item(&mut wire)
                .map_err(|err| TestCaseError::fail(format!("decode failed: {err}")))?;

            let body = notification.marshal(max_payload).expect("body fits");
            prop_assert_eq!(item.len(), 44 + body.len());
            prop_assert_eq!(decoded.token_hex(), notification.token());
            prop_assert_eq!(decoded.payload, body);
            prop_assert_eq!(decoded.notification_id, raw_id);
            prop_assert_eq!(decoded.expiration, notification.expiration());
            let expected_priority = if notification.priority() == 10 { 10 } else { 5 };
            prop_assert_eq!(decoded.priority, expected_priority);
            prop_assert!(wire.is_empty());
            Ok(())
        })
        .expect("round-trip property failed");
}

#[rstest]
#[case(32, 200, 96)]
#[case(256, 700, 64)]
fn frames_respect_size_limit(
    #[case] max_payload: usize,
    #[case] max_frame_size: usize,
    #[case] cases: u32,
) {
    let mut runner = deterministic_runner(cases);
    let strategy = vec(notification_strategy(max_payload), 1..40);

    runner
        .run(&strategy, |notifications| {
            let mut ids = IdGenerator::new();
            let mut buffer = FrameBuffer::new(max_frame_size);
            let mut wire = BytesMut::new();
            for notification in &notifications {
                let item = encode_item(notification, ids.next_id(), max_payload)
                    .map_err(|err| TestCaseError::fail(format!("encode failed: {err}")))?;
                if buffer.needs_flush_before(&item) {
                    let frame = buffer
                        .take_frame()
                        .ok_or_else(|| TestCaseError::fail("full buffer had no frame"))?;
                    prop_assert!(frame.len() <= max_frame_size);
                    wire.extend_from_slice(&frame);
                }
                buffer.push(&item);
                prop_assert!(buffer.len() <= max_frame_size);
            }
            if let Some(frame) = buffer.take_frame() {
                prop_assert!(frame.len() > FRAME_HEADER_LEN);
                wire.extend_from_slice(&frame);
            }

            let mut decoder = FrameDecoder::new(max_frame_size);
            let mut decoded_ids = Vec::new();
            while let Some(frame) = decoder
                .decode(&mut wire)
                .map_err(|err| TestCaseError::fail(format!("decode failed: {err}")))?
            {
                prop_assert!(!frame.items.is_empty());
                decoded_ids.extend(frame.items.iter().map(|item| item.notification_id));
            }
            let count = u32::try_from(notifications.len()).expect("short sequence");
            let expected: Vec<u32> = (1..=count).collect();
            prop_assert_eq!(decoded_ids, expected);
            prop_assert!(wire.is_empty());
            Ok(())
        })
        .expect("frame size property failed");
}
