// Interface adapters: physics engine, input decoding, and the snapshot protocol.

pub mod input;
pub mod physics;
pub mod protocol;
