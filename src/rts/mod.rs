//! Runtime glue towards the sound subsystem

pub mod hardware;
