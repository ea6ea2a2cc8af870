mod records;
mod schema;
mod codepage;
mod types;
mod value;
mod rows;
mod parser;
mod apprec;
mod lob;
mod sink;
mod error;

#[cfg(test)]
pub(crate) mod testutil;

pub use records::*;
pub use schema::*;
pub use codepage::*;
pub use types::*;
pub use value::*;
pub use rows::*;
pub use parser::*;
pub use apprec::*;
pub use lob::*;
pub use sink::*;
pub use error::IxfError;
