mod de;
pub mod indicator;
pub mod plan;
pub mod revenue;

pub use indicator::*;
pub use plan::*;
pub use revenue::*;
