// src/tests/common.rs

//! Common helpers for tests.

use crate::common::FPath;
use crate::data::datetime::FixedOffset;

use std::io::Write;

use ::rand::rngs::StdRng;
use ::rand::SeedableRng;
use ::tempfile::NamedTempFile;

/// seed for deterministic test RNGs
pub const RNG_SEED: u64 = 5577;

/// a deterministic RNG; every test run draws the same sequence
pub fn rng_seeded() -> StdRng {
    StdRng::seed_from_u64(RNG_SEED)
}

/// fixed timezone offset `+09:00`, the default reference timezone
pub fn fo_p9() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).unwrap()
}

/// fixed timezone offset `+00:00`
pub fn fo_0() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

/// fixed timezone offset `-08:00`
pub fn fo_m8() -> FixedOffset {
    FixedOffset::west_opt(8 * 3600).unwrap()
}

/// Create a `NamedTempFile` containing `data`.
pub fn create_temp_file(data: &str) -> NamedTempFile {
    let mut ntf = NamedTempFile::new().unwrap();
    ntf.write_all(data.as_bytes()).unwrap();
    ntf.flush().unwrap();

    ntf
}

/// The `FPath` of a `NamedTempFile`.
pub fn ntf_fpath(ntf: &NamedTempFile) -> FPath {
    ntf.path().to_string_lossy().to_string()
}
