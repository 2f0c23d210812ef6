//! ftgen: synthetic fault tree generator.
//!
//! Builds random fault trees (OR/AND gates over primary events with sampled
//! failure probabilities) of controllable size and shape, and writes them as
//! OpenPSA MEF documents for testing fault tree analysis tools.
//!
//! ```no_run
//! use ftgen::application::MefSerializer;
//! use ftgen::domain::{TreeBuilder, TreeParams};
//!
//! let params = TreeParams { nprimary: 50, ..TreeParams::default() };
//! let shape = params.validate().expect("valid parameters");
//! let tree = TreeBuilder::new(shape).build();
//! let xml = MefSerializer::new(&params, "-").render(&tree).expect("in-memory write");
//! println!("{xml}");
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
