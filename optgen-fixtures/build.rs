use std::env;
use std::path::PathBuf;

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));

    optgen_build::generate_options()
        .scan_path("src/models.rs")
        .records(["Server", "Upstream"])
        .output_file(out_dir.join("models_opts.rs"))
        .destination_module("crate::models")
        .run()
        .expect("Failed to generate model options");

    // Endpoint options live outside the module declaring Endpoint.
    optgen_build::generate_options()
        .scan_path("src/network.rs")
        .record("Endpoint")
        .output_file(out_dir.join("network_opts.rs"))
        .destination_module("crate::options")
        .run()
        .expect("Failed to generate network options");

    println!("cargo:rerun-if-changed=src/models.rs");
    println!("cargo:rerun-if-changed=src/network.rs");
}
