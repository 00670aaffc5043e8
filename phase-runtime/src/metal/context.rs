//! Metal device initialization: device, command queue, pass shader library.

use objc2::rc::Retained;
use objc2::runtime::ProtocolObject;
use objc2_foundation::NSString;
use objc2_metal::{MTLCommandQueue, MTLCreateSystemDefaultDevice, MTLDevice, MTLLibrary};

use crate::error::BackendError;

/// Core GPU state: device, command queue, shader library.
pub struct MetalContext {
    pub device: Retained<ProtocolObject<dyn MTLDevice>>,
    pub queue: Retained<ProtocolObject<dyn MTLCommandQueue>>,
    pub library: Retained<ProtocolObject<dyn MTLLibrary>>,
}

impl MetalContext {
    /// Acquire the system default device, create a queue, and load the
    /// metallib built from `shaders/passes.metal`.
    pub fn new() -> Result<Self, BackendError> {
        let device = MTLCreateSystemDefaultDevice().ok_or(BackendError::DeviceNotFound)?;

        let queue = device
            .newCommandQueue()
            .ok_or_else(|| BackendError::Execution("failed to create command queue".into()))?;

        // Embedded by build.rs
        let metallib_path = env!("PASSES_METALLIB_PATH");
        let path_ns = NSString::from_str(metallib_path);
        #[allow(deprecated)]
        let library = device
            .newLibraryWithFile_error(&path_ns)
            .map_err(|e| BackendError::ShaderCompilation(format!("{:?}", e)))?;

        Ok(Self {
            device,
            queue,
            library,
        })
    }

    /// Name reported by the Metal device (e.g. "Apple M4 Pro").
    pub fn device_name(&self) -> String {
        self.device.name().to_string()
    }
}
