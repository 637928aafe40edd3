/// Default model input size (width, height).
pub const DEFAULT_INPUT_SIZE: (u32, u32) = (1280, 1280);

/// Gray used for the letterbox border, per channel.
pub const LETTERBOX_COLOR: u8 = 114;
