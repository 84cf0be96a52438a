use std::env;

// Stamp build provenance for `wirebound version --extended`. Cargo only
// exposes TARGET and PROFILE to build scripts, so they are re-exported
// to the compiler here.
fn main() {
    let triple = env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());
    let profile = env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=WIREBOUND_TARGET_TRIPLE={triple}");
    println!("cargo:rustc-env=WIREBOUND_BUILD_PROFILE={profile}");
    println!("cargo:rerun-if-env-changed=TARGET");
    println!("cargo:rerun-if-env-changed=PROFILE");
}
