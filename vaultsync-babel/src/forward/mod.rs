//! Forward direction: markup Document Tree → target blocks.

pub mod blocks;
pub mod composer;

pub use blocks::BlockMapper;
pub use composer::Composer;
