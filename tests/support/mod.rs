#![allow(dead_code)]

pub mod fake_audio;
pub mod voicedeck_env;
