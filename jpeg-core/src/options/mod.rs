mod decoder;
mod encoder;

pub use decoder::DecoderOptions;
pub use encoder::EncoderOptions;
