pub mod parser;
pub mod terms;
