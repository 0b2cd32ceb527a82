/// Builds the gRPC client and server code for `proto/cities.proto` using
/// `tonic-prost-build`.
///
/// Alongside the generated modules, the encoded file descriptor set is written
/// to `OUT_DIR/cities_descriptor.bin` so the server can expose it through gRPC
/// reflection.
///
/// # Panics
///
/// This function will `panic!` if code generation fails.
///
/// # Output
///
/// ```rust,ignore
/// pub mod proto {
///     tonic::include_proto!("cities");
/// }
/// ```
use std::env;
use std::path::PathBuf;
fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let descriptor_path = out_dir.join("cities_descriptor.bin");

    let mut config = tonic_prost_build::Config::new();
    config.file_descriptor_set_path(&descriptor_path);

    tonic_prost_build::configure()
        .compile_with_config(config, &["proto/cities.proto"], &["proto"])
        .unwrap();
}
