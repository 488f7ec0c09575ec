// SPDX-License-Identifier: GPL-3.0-only

//! V4L2 camera backend
//!
//! Opens one `/dev/videoN` node and keeps it for the lifetime of the binding.
//! Photos are taken by starting a short mmap stream, discarding a few frames
//! while auto-exposure settles, and writing the next frame. MJPEG frames are
//! written as-is; YUYV frames are converted and encoded first.

use super::format_converters::{is_jpeg, rgb_to_jpeg, yuyv_to_rgb};
use super::{CameraBinding, CameraHardware};
use crate::constants::WARMUP_FRAMES;
use crate::errors::{BindError, CaptureError};
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};
use v4l::buffer::Type;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;
use v4l::{Format, FourCC};

const MJPG: &[u8; 4] = b"MJPG";
const YUYV: &[u8; 4] = b"YUYV";

/// Camera driver for a single V4L2 device node
#[derive(Debug, Clone)]
pub struct V4l2Camera {
    device_path: String,
    width: u32,
    height: u32,
}

impl V4l2Camera {
    pub fn new(device_path: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            device_path: device_path.into(),
            width,
            height,
        }
    }

    /// Negotiate MJPEG, falling back to YUYV
    fn negotiate_format(&self, dev: &Device) -> Result<Format, BindError> {
        for fourcc in [MJPG, YUYV] {
            let wanted = Format::new(self.width, self.height, FourCC::new(fourcc));
            match dev.set_format(&wanted) {
                Ok(actual) if actual.fourcc == FourCC::new(fourcc) => {
                    info!(
                        width = actual.width,
                        height = actual.height,
                        fourcc = %actual.fourcc,
                        "Negotiated capture format"
                    );
                    return Ok(actual);
                }
                Ok(actual) => {
                    debug!(wanted = %wanted.fourcc, got = %actual.fourcc, "Format not accepted");
                }
                Err(e) => {
                    debug!(fourcc = %wanted.fourcc, error = %e, "Failed to set format");
                }
            }
        }
        Err(BindError::HardwareUnavailable(format!(
            "{} supports neither MJPEG nor YUYV",
            self.device_path
        )))
    }
}

impl CameraHardware for V4l2Camera {
    fn open(&self) -> Result<Box<dyn CameraBinding>, BindError> {
        let dev = Device::with_path(&self.device_path).map_err(|e| match e.kind() {
            io::ErrorKind::ResourceBusy => BindError::Busy,
            _ => BindError::HardwareUnavailable(format!("{}: {}", self.device_path, e)),
        })?;
        let format = self.negotiate_format(&dev)?;

        info!(device = %self.device_path, "Opened camera device");
        Ok(Box::new(V4l2Binding {
            device: Arc::new(Mutex::new(Some(dev))),
            format,
            device_path: self.device_path.clone(),
        }))
    }
}

struct V4l2Binding {
    device: Arc<Mutex<Option<Device>>>,
    format: Format,
    device_path: String,
}

#[async_trait]
impl CameraBinding for V4l2Binding {
    async fn take_picture(&self, path: &Path) -> Result<(), CaptureError> {
        let device = Arc::clone(&self.device);
        let format = self.format;
        let path: PathBuf = path.to_path_buf();

        tokio::task::spawn_blocking(move || {
            let jpeg = {
                let guard = device.lock().map_err(|_| CaptureError::BindingLost)?;
                let dev = guard.as_ref().ok_or(CaptureError::BindingLost)?;
                grab_jpeg(dev, &format)?
            };
            std::fs::write(&path, jpeg)
                .map_err(|e| CaptureError::Storage(format!("Failed to save photo: {}", e)))?;
            info!(path = %path.display(), "Photo saved");
            Ok(())
        })
        .await
        .map_err(|e| CaptureError::Hardware(format!("Capture task error: {}", e)))?
    }

    fn release(&self) {
        match self.device.lock() {
            Ok(mut guard) => {
                if guard.take().is_some() {
                    info!(device = %self.device_path, "Released camera device");
                }
            }
            Err(_) => warn!(device = %self.device_path, "Camera lock poisoned on release"),
        }
    }

    fn is_active(&self) -> bool {
        self.device.lock().map(|g| g.is_some()).unwrap_or(false)
    }
}

impl Drop for V4l2Binding {
    fn drop(&mut self) {
        self.release();
    }
}

fn grab_jpeg(dev: &Device, format: &Format) -> Result<Vec<u8>, CaptureError> {
    let mut stream = MmapStream::with_buffers(dev, Type::VideoCapture, 4).map_err(|e| {
        match e.kind() {
            io::ErrorKind::ResourceBusy => CaptureError::Hardware("camera is busy".to_string()),
            _ => CaptureError::Hardware(format!("Failed to create buffer stream: {}", e)),
        }
    })?;

    for _ in 0..WARMUP_FRAMES {
        stream
            .next()
            .map_err(|e| CaptureError::Hardware(format!("Failed to read frame: {}", e)))?;
    }

    let (buf, meta) = stream
        .next()
        .map_err(|e| CaptureError::Hardware(format!("Failed to read frame: {}", e)))?;
    let used = (meta.bytesused as usize).min(buf.len());
    let data = &buf[..used];
    debug!(bytes = used, fourcc = %format.fourcc, "Frame captured from device");

    if format.fourcc == FourCC::new(MJPG) {
        if !is_jpeg(data) {
            return Err(CaptureError::Hardware("corrupt MJPEG frame".to_string()));
        }
        Ok(data.to_vec())
    } else {
        let rgb = yuyv_to_rgb(data, format.width, format.height, format.stride)?;
        rgb_to_jpeg(&rgb, format.width, format.height)
    }
}
