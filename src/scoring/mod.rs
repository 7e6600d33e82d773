pub mod rsv;
pub mod accumulator;
