//! Command-line tools for ISIC segmentation masks.
//!
//! - `evaluate`: score `<stem>_Mine.png` predictions against
//!   `<stem>_Segmentation.png` ground truth
//! - `dataset_check`: load an ISIC training directory and print sample
//!   shapes and statistics
//!
//! ```bash
//! cargo run --bin evaluate -- out/
//! cargo run --bin dataset_check -- dataset/ --num-samples 5
//! ```

pub mod backend;

pub use backend::{create_device, get_backend_name, SelectedBackend, SelectedDevice};

use tracing_subscriber::EnvFilter;

/// Installs a stderr log subscriber. `RUST_LOG` takes precedence over the
/// verbosity flag.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
