//! Vision Shop Common Library
//!
//! CLIとWeb(WASM)で共有されるカート・スキャン制御・検出の型とロジック

pub mod types;
pub mod error;
pub mod cart;
pub mod scan;
pub mod feedback;
pub mod detection;
pub mod camera;

pub use types::{CartItem, DetectionResponse, ProductItem};
pub use error::{Error, Result};
pub use cart::{format_money, AddOutcome, Cart, ADDED_FEEDBACK_MS, ADD_DEBOUNCE_MS};
pub use scan::{
    status_label, CycleOutcome, CycleTicket, ScanController, ScanSession, ScanState,
    ANNOUNCE_COOLDOWN_MS, SCAN_INTERVAL_MS,
};
pub use feedback::{phrases, select_voice, Feedback, Priority, RecordingFeedback, SoundKind, ToneSpec, VoiceInfo};
pub use detection::{detect_url, DEFAULT_ENDPOINT, DETECT_TIMEOUT_MS};
pub use camera::{CameraStatus, FrameSource, VideoConstraints};
