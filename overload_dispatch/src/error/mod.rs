mod overload;

pub use overload::{OverloadError, OverloadResult};
