pub mod combine;
pub mod document;
pub mod error;
pub mod model;

pub use combine::{
    combine, combine_with_callback, combine_with_events, combine_with_sink, CombineOptions,
    CombineRunOutput, ProgressSink,
};
pub use document::{render_block_header, split_blocks, Block};
pub use error::CombineError;
pub use model::{CombineSummary, ProgressEvent, OUTPUT_FILE_NAME};
