pub mod basis;
pub mod curve;
pub mod data_structures;
pub mod diagnostics;
pub mod error;
pub mod fit;
pub mod linalg;
pub mod plotting;
pub mod simulate;
pub mod utils;

pub use basis::*;
pub use curve::*;
pub use data_structures::*;
pub use diagnostics::*;
pub use error::*;
pub use fit::*;
pub use linalg::*;
pub use plotting::*;
pub use simulate::*;
pub use utils::*;
