//! Response normalization
//!
//! Turns decoded [`BackendResponse`](crate::response::BackendResponse)s into
//! the host's structures:
//! - resource id to name lookup tables
//! - one frame per metric series, deterministically named and ordered
//! - variable dropdown values
//! - time-ordered events from polymorphic annotation records

mod annotations;
mod frames;
mod resources;
mod variables;

pub use annotations::{normalize_annotations, records_to_events, EntityKind};
pub use frames::{
    build_command_frame, build_frame, extract_group_value, frames_from_response, render_tags,
    sort_frames, COMMAND_FRAME_NAME,
};
pub use resources::ResourceIndex;
pub use variables::normalize_variable_response;
