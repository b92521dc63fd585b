#![allow(missing_docs)]

mod asf;
mod flac;
mod mp4;
mod mpc;
mod mpeg;
mod ogg;
mod probe;
mod trueaudio;
pub(crate) mod util;
mod wavpack;
