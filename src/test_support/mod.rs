//! Helpers shared by unit tests inside the library.

pub mod socket_guard;
