mod clock;
mod measurement;
mod result;
mod row_id;

pub use clock::*;
pub use measurement::*;
pub use result::*;
pub use row_id::*;
