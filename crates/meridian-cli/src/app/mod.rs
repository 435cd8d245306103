pub mod blast;
pub mod simplemem;
pub mod stream;
