//! Options for `crate::network` types.

include!(concat!(env!("OUT_DIR"), "/network_opts.rs"));
