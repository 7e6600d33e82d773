pub mod heap;
pub mod results;
pub mod scorer;
pub mod pool;
