//! # Voxel World Entry Point
//!
//! Runs the engine headless through a short scripted walk.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- [config.json]
//! ```

fn main() {
    if let Err(err) = voxel_world::run() {
        eprintln!("voxel-world: {err}");
        std::process::exit(1);
    }
}
