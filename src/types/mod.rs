pub mod response;
pub mod result;
pub mod vacation_types;

pub use response::deserialize_structured_response;
pub use result::RevisionResult;
