//! orbstare - the terminal front end for the orb

pub mod console;
