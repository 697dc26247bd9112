mod pair;
mod route;
mod evaluation;

pub use pair::*;
pub use route::*;
pub use evaluation::*;
