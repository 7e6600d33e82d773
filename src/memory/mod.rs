pub mod arena;
pub mod shared_arena;
