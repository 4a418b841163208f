//! XMLTV guide building for gracenote-xmltv.
//!
//! Maps grid channel blocks to XMLTV channels and programmes and writes
//! the resulting document.

/// Channel and programme mapping.
pub mod guide;
/// Force-series title matching.
pub mod series;
/// Grid timestamp formatting and synthetic episode numbers.
pub mod time;
/// XMLTV document model and writer.
pub mod xmltv;
