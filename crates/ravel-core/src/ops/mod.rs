mod binary;
mod concat;
mod conv;
mod pad;
mod slice;

pub use binary::*;
pub use concat::*;
pub use conv::*;
pub use pad::*;
pub use slice::*;
