//! Value objects - immutable types that represent domain concepts

mod ids;
mod json_path;

pub use ids::{IdParseError, MemberId, SessionId};
pub use json_path::{Filter, JsonPath};
