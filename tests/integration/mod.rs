//! Integration tests for play-rail
//!
//! Each test builds a scratch workspace in a temp directory and runs the
//! compiled binary against it. Remote calls only ever target a closed local
//! port, so the tests cover everything up to and including the first
//! remote failure.

mod helpers;
mod test_doctor;
mod test_publish;
