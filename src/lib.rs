// Enable pedantic lints globally, then allow the noisy ones we're not fixing.
#![warn(clippy::pedantic, clippy::nursery)]
// --- Intentionally allowed ---
#![allow(clippy::must_use_candidate, clippy::return_self_not_must_use)]
// Audio code performs intentional casts
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_lossless,
    clippy::cast_possible_wrap
)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]
// Exact float comparison is how parameter changes are detected
#![allow(clippy::float_cmp)]
#![allow(
    clippy::module_name_repetitions,
    clippy::doc_markdown,
    clippy::suboptimal_flops,
    clippy::unreadable_literal,
    clippy::match_same_arms,
    clippy::trivially_copy_pass_by_ref
)]

pub mod dsp;
pub mod engine;
pub mod error;
pub mod io;
pub mod settings;

pub use dsp::shaper::{Character, Mode, ShapingPolicy};
pub use engine::params::Params;
pub use engine::{BlockProcessor, EngineState};
pub use error::EngineError;
