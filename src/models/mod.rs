pub mod block;
pub mod commitment;
pub mod interval;
pub mod request;
pub mod task;
