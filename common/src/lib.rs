//! Types and pure logic shared by the portal backend and the browser frontend.
//!
//! Nothing in this crate performs I/O: the CSV parser works on text that was
//! already read, and the validation gate is a plain state machine driven by
//! whoever owns it (a yew component in the browser, a request handler on the
//! server).

pub mod csv;
pub mod gate;
pub mod model;
pub mod requests;
