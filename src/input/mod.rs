//! Keyboard input translation.
//!
//! This module turns native console key records into the canonical byte
//! stream a line editor reads one byte at a time:
//!
//! - **buffer**: fixed-capacity ring holding decoded bytes
//! - **decoder**: key event to byte-sequence translation rules
//! - **resize**: geometry polling for simulated resize notifications

pub mod buffer;
pub mod decoder;
pub mod resize;

pub use buffer::InputBuffer;
pub use decoder::KeyDecoder;
pub use resize::ResizeWatcher;
