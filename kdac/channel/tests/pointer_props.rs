//! Property tests for the buffer pointer and slot bounds

use kdac::{
    BufferMode, BufferPointer, ChannelConfig, ClaimRegistry, DacChannel, DacError, DacInstance,
    Direction, IrqSource, StateError, Watermark, MAX_CEILING, MIN_CEILING,
};
use kdac_hal::sim::{SimDac, SimNvic};
use proptest::prelude::*;

fn watermark(words: u8) -> Watermark {
    match words {
        1 => Watermark::Words1,
        2 => Watermark::Words2,
        3 => Watermark::Words3,
        _ => Watermark::Words4,
    }
}

fn mode() -> impl Strategy<Value = BufferMode> {
    prop_oneof![
        Just(BufferMode::Normal),
        Just(BufferMode::Swing),
        Just(BufferMode::OneTimeScan),
    ]
}

/// Ceiling together with a watermark offset that fits under it
fn ceiling_and_watermark() -> impl Strategy<Value = (u8, Watermark)> {
    (MIN_CEILING..=MAX_CEILING)
        .prop_flat_map(|ceiling| (Just(ceiling), 1..=ceiling.min(4)))
        .prop_map(|(ceiling, words)| (ceiling, watermark(words)))
}

/// Advances making up one full pass in `mode`
fn pass_len(mode: BufferMode, ceiling: u8) -> usize {
    match mode {
        BufferMode::Normal => usize::from(ceiling) + 1,
        BufferMode::Swing => 2 * usize::from(ceiling),
        BufferMode::OneTimeScan => usize::from(ceiling),
    }
}

fn count(events: &[IrqSource], source: IrqSource) -> usize {
    events.iter().filter(|&&e| e == source).count()
}

proptest::proptest! {
    #[test]
    fn normal_pass_returns_to_zero((ceiling, wm) in ceiling_and_watermark()) {
        let mut pointer = BufferPointer::new();
        let mut events = Vec::new();
        for step in 0..=usize::from(ceiling) {
            let fired = pointer.advance(BufferMode::Normal, ceiling, wm);
            if step < usize::from(ceiling) {
                prop_assert_eq!(usize::from(pointer.position()), step + 1);
                prop_assert!(!fired.contains(&IrqSource::Bottom));
                prop_assert!(!fired.contains(&IrqSource::Top));
            }
            events.extend_from_slice(&fired);
        }
        prop_assert_eq!(pointer.position(), 0);
        prop_assert_eq!(count(&events, IrqSource::Bottom), 1);
        prop_assert_eq!(count(&events, IrqSource::Top), 1);
        let bottom = events.iter().position(|&e| e == IrqSource::Bottom);
        let top = events.iter().position(|&e| e == IrqSource::Top);
        prop_assert!(bottom < top);
    }

    #[test]
    fn swing_bounces_between_ends((ceiling, wm) in ceiling_and_watermark()) {
        let mut pointer = BufferPointer::new();
        let c = usize::from(ceiling);
        for step in 1..=2 * c {
            let fired = pointer.advance(BufferMode::Swing, ceiling, wm);
            let expected = if step <= c { step } else { 2 * c - step };
            prop_assert_eq!(usize::from(pointer.position()), expected);
            prop_assert_eq!(fired.contains(&IrqSource::Bottom), step == c);
            prop_assert_eq!(fired.contains(&IrqSource::Top), step == 2 * c);
        }
        prop_assert_eq!(pointer.direction(), Direction::Up);
    }

    #[test]
    fn one_time_scan_freezes(
        (ceiling, wm) in ceiling_and_watermark(),
        extra in 1usize..40,
    ) {
        let mut pointer = BufferPointer::new();
        for _ in 0..ceiling {
            pointer.advance(BufferMode::OneTimeScan, ceiling, wm);
        }
        prop_assert!(pointer.scan_complete());
        prop_assert_eq!(pointer.position(), ceiling);

        let frozen = pointer;
        for _ in 0..extra {
            prop_assert!(pointer.advance(BufferMode::OneTimeScan, ceiling, wm).is_empty());
            prop_assert_eq!(pointer, frozen);
        }
    }

    #[test]
    fn watermark_once_per_pass(
        mode in mode(),
        (ceiling, wm) in ceiling_and_watermark(),
        passes in 1usize..4,
    ) {
        let mut pointer = BufferPointer::new();
        let mut watermarks = 0;
        for _ in 0..passes * pass_len(mode, ceiling) {
            let fired = pointer.advance(mode, ceiling, wm);
            watermarks += count(&fired, IrqSource::Watermark);
        }
        let expected = match mode {
            BufferMode::OneTimeScan => 1,
            _ => passes,
        };
        prop_assert_eq!(watermarks, expected);
    }

    #[test]
    fn slots_past_ceiling_rejected(ceiling in MIN_CEILING..=MAX_CEILING, slot in 0u8..=32) {
        let claims: &'static ClaimRegistry = Box::leak(Box::new(ClaimRegistry::new()));
        let mut dac =
            DacChannel::with_claims(SimDac::new(DacInstance::DAC0), SimNvic::new(), claims);
        let config = ChannelConfig::builder(DacInstance::DAC0)
            .buffer(BufferMode::Normal, ceiling)
            .build();
        dac.activate(&config).unwrap();

        let result = dac.set_buffer_data_n(0x0AA, slot);
        if slot <= ceiling {
            prop_assert_eq!(result, Ok(()));
            prop_assert_eq!(dac.buffer_data(slot), Ok(0x0AA));
        } else {
            prop_assert_eq!(
                result,
                Err(DacError::State(StateError::SlotOutOfRange { slot, ceiling }))
            );
        }
    }
}
