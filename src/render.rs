//! Timeline consumers. Both renderers read the same immutable [`Timeline`](crate::timeline::Timeline);
//! any change to binding or duration policy affects them identically.

pub mod interactive;
pub mod package;
pub mod video;
