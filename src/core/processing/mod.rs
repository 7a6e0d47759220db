pub mod adjust;
pub mod effects;
pub mod fusion;
pub mod geometry;
pub mod histogram;
pub mod layers;
pub mod pipeline;
pub mod resize;
pub mod save;
