//! Value objects - identifiers and small domain values

mod mention;
mod snowflake;

pub use mention::extract_mentions;
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
