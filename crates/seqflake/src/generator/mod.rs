mod pressure;
mod snowflake;
mod tolerance;

pub use pressure::*;
pub use snowflake::*;
pub use tolerance::*;
