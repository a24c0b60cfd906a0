//! Screen output translation.
//!
//! Decodes the ANSI/ECMA-48 subset used by the line editor and maps it onto
//! native console state:
//!
//! - **scanner**: restartable lexer classifying the byte stream
//! - **sgr**: SGR parameter list to attribute byte translation
//! - **attr**: default/current attribute state
//! - **writer**: UTF-8 to UTF-16 conversion and chunked console writes

pub mod attr;
pub mod scanner;
pub mod sgr;
pub mod writer;

pub use attr::AttributeState;
pub use scanner::{Code, CsiSequence, Scanner};
