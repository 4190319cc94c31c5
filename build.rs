//! This build script copies the `memory.x` file from the crate root into a directory where
//! the linker can always find it at build time, and records the build time as the clock's
//! starting point.

use std::{env, fs::File, io::Write, path::PathBuf};

fn main() {
    let out = &PathBuf::from(env::var_os("OUT_DIR").expect("OUT_DIR is set by cargo"));

    // Put memory layout in the output directory and ensure it's on the linker search path.
    File::create(out.join("memory.x"))
        .and_then(|mut f| f.write_all(include_bytes!("memory.x")))
        .expect("write memory.x");
    println!("cargo:rustc-link-search={}", out.display());

    // Seconds since the Unix epoch at build time, used until the phone sets the clock
    File::create(out.join("utc.rs"))
        .and_then(|mut f| {
            write!(
                f,
                "const BUILD_UTC_SECS: i64 = {};",
                chrono::Utc::now().timestamp()
            )
        })
        .expect("write utc.rs");

    println!("cargo:rerun-if-changed=memory.x");
}
