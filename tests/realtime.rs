use anyhow::Result;
use assert_no_alloc::{AllocDisabler, assert_no_alloc};
use shapeshift::dsp::shaper::{Character, Mode, ShapingPolicy};
use shapeshift::{BlockProcessor, Params};

#[cfg(debug_assertions)]
#[global_allocator]
static A: AllocDisabler = AllocDisabler;

const SAMPLE_RATE: f32 = 48_000.0;
const MAX_FRAMES: usize = 256;

#[test]
fn process_does_not_allocate() -> Result<()> {
    let mut engine = BlockProcessor::new()?;
    engine.prepare(SAMPLE_RATE, MAX_FRAMES as u32)?;

    let input: Vec<f32> = (0..MAX_FRAMES)
        .map(|i| (i as f32 * 0.05).sin() * 0.9)
        .collect();
    let mut left = vec![0.0f32; MAX_FRAMES];
    let mut right = vec![0.0f32; MAX_FRAMES];

    let policies = [
        ShapingPolicy::from(Mode::TanFold),
        ShapingPolicy::Split {
            top: Mode::Arctan,
            bottom: Mode::Sigmoid,
        },
        ShapingPolicy::from(Character::Apocalypse),
    ];

    for (i, shaping) in policies.into_iter().enumerate() {
        // Full block, then a short one, each with its own cutoff.
        for (j, frames) in [MAX_FRAMES, MAX_FRAMES / 3].into_iter().enumerate() {
            let params = Params {
                input_gain_db: 18.0,
                output_gain_db: -3.0,
                shaping,
                cutoff_hz: 1_000.0 + 2_000.0 * i as f32 + 500.0 * j as f32,
            };
            let updates = engine.coefficient_updates();
            assert_no_alloc(|| {
                engine.process(
                    &params,
                    &[&input[..frames], &input[..frames]],
                    &mut [&mut left[..frames], &mut right[..frames]],
                )
            })?;
            assert_eq!(engine.coefficient_updates(), updates + 1);
        }
    }

    assert!(left.iter().all(|s| s.is_finite()));
    Ok(())
}
