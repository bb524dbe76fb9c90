//! sextet - plays a short demo through the default output device
//!
//! Run with: cargo run --release [-- <seconds>]
//! Set RUST_LOG=debug to see clamped parameters and dropped notes.

mod app;

use app::Demo;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    env_logger::init();

    let seconds = std::env::args()
        .nth(1)
        .map(|arg| arg.parse::<f32>())
        .transpose()?;

    Demo::new().bpm(112.0).run(seconds)
}
