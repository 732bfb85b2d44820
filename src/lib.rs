//! Simulated vibrational spectra from phonon mode data.
//!
//! Mode frequencies, intensities and optional linewidths go in; a broadened,
//! uniformly sampled spectrum comes out. See [`synthesis::synthesize`] for the
//! core and [`config::SpectrumConfig`] for the usual entry point.

pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod peak_table;
pub mod synthesis;
pub mod units;

pub use config::SpectrumConfig;
pub use data::model::{Mode, ModeSet, Spectrum};
pub use error::{Result, SpectrumError};
pub use synthesis::{synthesize, BroadeningKernel, Lineshape, SpectrumAxis};
pub use units::FrequencyUnit;
