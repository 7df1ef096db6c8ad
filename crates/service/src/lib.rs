pub mod service;

pub use service::{
    get_combine_session, poll_combine_events, start_combine, CombineRequest,
    CombineSessionSnapshot, CombineSessionStatus, SequencedEvent,
};
