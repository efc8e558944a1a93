mod decoded;
mod uid;

pub use decoded::*;
pub use uid::*;
