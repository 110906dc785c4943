use std::env;
use std::path::PathBuf;
use std::process::Command;

fn main() {
    // The Vision bridge only exists on macOS
    if env::var("CARGO_CFG_TARGET_OS").unwrap() != "macos" {
        return;
    }

    println!("cargo:rerun-if-changed=vision-bridge/Sources/VisionBridge/VisionOCR.swift");
    println!("cargo:rerun-if-changed=vision-bridge/Package.swift");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let vision_bridge_dir = manifest_dir.join("vision-bridge");

    println!("cargo:warning=Building VisionBridge Swift package...");
    let build_status = Command::new("swift")
        .args(["build", "-c", "release"])
        .current_dir(&vision_bridge_dir)
        .status()
        .expect("Failed to build Swift package");

    if !build_status.success() {
        panic!("Swift build failed");
    }

    let lib_path = vision_bridge_dir
        .join(".build/release")
        .canonicalize()
        .expect("Failed to find .build/release directory");

    // Copy the dylib next to the built binaries so it resolves at runtime
    let default_target_dir = manifest_dir
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("target");
    let target_dir = env::var("CARGO_TARGET_DIR")
        .map(PathBuf::from)
        .unwrap_or(default_target_dir);
    let profile = env::var("PROFILE").unwrap_or_else(|_| "debug".to_string());
    let output_dir = target_dir.join(&profile);

    let dylib_src = lib_path.join("libVisionBridge.dylib");
    let dylib_dst = output_dir.join("libVisionBridge.dylib");

    std::fs::create_dir_all(&output_dir).unwrap_or_else(|e| {
        panic!(
            "Failed to create output directory {}: {e}",
            output_dir.display()
        )
    });
    std::fs::copy(&dylib_src, &dylib_dst).unwrap_or_else(|e| {
        panic!(
            "Failed to copy dylib from {} to {}: {e}",
            dylib_src.display(),
            dylib_dst.display()
        )
    });

    println!("cargo:rustc-link-arg=-Wl,-rpath,@executable_path");
    println!("cargo:rustc-link-arg=-Wl,-rpath,@loader_path");
    println!("cargo:rustc-link-search=native={}", lib_path.display());
    println!("cargo:rustc-link-lib=dylib=VisionBridge");

    println!("cargo:rustc-link-lib=framework=Vision");
    println!("cargo:rustc-link-lib=framework=AppKit");
    println!("cargo:rustc-link-lib=framework=Foundation");
    println!("cargo:rustc-link-lib=framework=CoreGraphics");
}
