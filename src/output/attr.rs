//! Console attribute state.

/// Default and current text attribute for a session.
///
/// The default is captured from the live console once at session start and
/// never changes; the current value tracks every processed SGR sequence and
/// is pushed to the console in the same step it is stored here.
#[derive(Clone, Copy, Debug, Default)]
pub struct AttributeState {
    default: u8,
    current: u8,
}

impl AttributeState {
    pub fn new(default: u8) -> Self {
        Self {
            default,
            current: default,
        }
    }

    pub fn default_attr(&self) -> u8 {
        self.default
    }

    pub fn current(&self) -> u8 {
        self.current
    }

    pub fn set_current(&mut self, attribute: u8) {
        self.current = attribute;
    }
}
