pub mod color;
pub mod device;
pub mod dimmer_box;
pub mod effect;
pub mod error;
pub mod polling;
pub mod registry;
pub mod rest;
pub mod switch_box;
pub mod wlight_box;
