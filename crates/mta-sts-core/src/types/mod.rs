//! Value types for the MTA-STS policy pipeline.

pub mod mode;
pub mod policy;
pub mod record;
pub mod response;

pub use mode::Mode;
pub use policy::Policy;
pub use record::Record;
pub use response::PolicyResponse;
