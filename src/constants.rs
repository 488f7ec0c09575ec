// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

/// Application identifier, also the default share-provider prefix
pub const APP_ID: &str = "io.github.lens_capture";

/// Directory name used under the XDG config and cache directories
pub const APP_DIR_NAME: &str = "lens-capture";

/// MIME type of every outbound share action
pub const IMAGE_MIME: &str = "image/*";

/// Default prompt label of the fallback chooser
pub const CHOOSER_TITLE: &str = "Search with";

/// Prefix and extension of capture files
pub const CAPTURE_PREFIX: &str = "IMG_";
pub const CAPTURE_EXTENSION: &str = "jpg";

/// Second-resolution timestamp used in capture file names
pub const CAPTURE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Standalone image-search application
pub const LENS_STANDALONE: &str = "com.google.ar.lens";
/// General search application
pub const GENERAL_SEARCH_APP: &str = "com.google.android.googlequicksearchbox";
/// Secondary search application
pub const SECONDARY_SEARCH_APP: &str = "com.google.android.apps.searchlite";

/// JPEG quality used when the camera delivers uncompressed frames
pub const JPEG_QUALITY: u8 = 92;

/// Frames discarded while the sensor settles before the kept frame
pub const WARMUP_FRAMES: usize = 5;
