pub mod device;
pub mod dimmer;
pub mod relay;
pub mod rgbw;
