//! Metal backend: each launch or copy is one committed command buffer.

use objc2::rc::Retained;
use objc2::runtime::ProtocolObject;
use objc2_metal::{
    MTLBlitCommandEncoder, MTLBuffer, MTLCommandBuffer, MTLCommandBufferStatus, MTLCommandEncoder,
    MTLCommandQueue,
};
use tracing::trace;

use crate::backend::{check_index, check_lengths, Backend, DeviceArray, SubmissionStats};
use crate::error::BackendError;
use crate::kernel::Kernel;
use crate::metal::context::MetalContext;
use crate::metal::dispatch::{alloc_buffer, alloc_buffer_with_data, dispatch_pass, read_buffer_slice};
use crate::metal::pso_cache::PsoCache;
use crate::types::{BitonicParams, Key, MergeParams, ScanParams};

/// A key array in a shared-storage Metal buffer.
pub struct MetalArray {
    buffer: Retained<ProtocolObject<dyn MTLBuffer>>,
    len: usize,
}

impl MetalArray {
    /// Underlying Metal buffer.
    pub fn buffer(&self) -> &ProtocolObject<dyn MTLBuffer> {
        &self.buffer
    }
}

impl DeviceArray for MetalArray {
    fn len(&self) -> usize {
        self.len
    }
}

/// Backend dispatching pass kernels to the system default Metal device.
pub struct MetalBackend {
    ctx: MetalContext,
    pso_cache: PsoCache,
    pending: Option<Retained<ProtocolObject<dyn MTLCommandBuffer>>>,
    stats: SubmissionStats,
}

impl MetalBackend {
    pub fn new() -> Result<Self, BackendError> {
        Ok(Self {
            ctx: MetalContext::new()?,
            pso_cache: PsoCache::new(),
            pending: None,
            stats: SubmissionStats::default(),
        })
    }

    fn command_buffer(&self) -> Result<Retained<ProtocolObject<dyn MTLCommandBuffer>>, BackendError> {
        self.ctx
            .queue
            .commandBuffer()
            .ok_or_else(|| BackendError::Execution("failed to create command buffer".into()))
    }

    fn submit(&mut self, cmd: Retained<ProtocolObject<dyn MTLCommandBuffer>>) {
        debug_assert!(
            self.pending.is_none(),
            "submission issued before the previous one was awaited"
        );
        cmd.commit();
        self.pending = Some(cmd);
    }
}

fn to_u32(value: usize, kernel: &Kernel, len: usize) -> Result<u32, BackendError> {
    u32::try_from(value).map_err(|_| BackendError::InvalidLaunch {
        kernel: kernel.to_string(),
        len,
    })
}

impl Backend for MetalBackend {
    type Array = MetalArray;

    fn name(&self) -> String {
        self.ctx.device_name()
    }

    fn alloc(&mut self, len: usize) -> Result<MetalArray, BackendError> {
        let buffer = alloc_buffer(&self.ctx.device, len * std::mem::size_of::<Key>())?;
        Ok(MetalArray { buffer, len })
    }

    fn upload(&mut self, data: &[Key]) -> Result<MetalArray, BackendError> {
        let buffer = alloc_buffer_with_data(&self.ctx.device, data)?;
        Ok(MetalArray {
            buffer,
            len: data.len(),
        })
    }

    fn download(&self, array: &MetalArray) -> Result<Vec<Key>, BackendError> {
        // SAFETY: the buffer holds `len` keys and callers wait before reading.
        Ok(unsafe { read_buffer_slice::<Key>(&array.buffer, array.len) })
    }

    fn read_at(&self, array: &MetalArray, index: usize) -> Result<Key, BackendError> {
        check_index(index, array.len)?;
        // SAFETY: index < len, checked above.
        let value = unsafe {
            let ptr = array.buffer.contents().as_ptr() as *const Key;
            *ptr.add(index)
        };
        Ok(value)
    }

    fn launch(
        &mut self,
        kernel: Kernel,
        src: &MetalArray,
        dst: &mut MetalArray,
    ) -> Result<(), BackendError> {
        check_lengths(dst.len, src.len)?;
        kernel.validate(src.len)?;
        let len = src.len;
        let element_count = to_u32(len, &kernel, len)?;
        let work_items = kernel.work_items(len);

        let cmd = self.command_buffer()?;
        let encoder = cmd
            .computeCommandEncoder()
            .ok_or_else(|| BackendError::Execution("failed to create compute encoder".into()))?;
        let pso = self
            .pso_cache
            .get_or_create(&self.ctx.library, kernel.function_name())?;
        let buffers = [src.buffer(), dst.buffer()];

        if work_items > 0 {
            match kernel {
                Kernel::ScanCombine { chunk_size } => {
                    let params = ScanParams {
                        element_count,
                        chunk_size: to_u32(chunk_size, &kernel, len)?,
                        _pad: [0; 2],
                    };
                    dispatch_pass(&encoder, pso, &buffers, &params, work_items);
                }
                Kernel::BitonicStep { stage, step } => {
                    let params = BitonicParams {
                        element_count,
                        stage: to_u32(stage, &kernel, len)?,
                        step: to_u32(step, &kernel, len)?,
                        _pad: 0,
                    };
                    dispatch_pass(&encoder, pso, &buffers, &params, work_items);
                }
                Kernel::MergeRuns { run_length } => {
                    let params = MergeParams {
                        element_count,
                        run_length: to_u32(run_length, &kernel, len)?,
                        pair_count: to_u32(work_items, &kernel, len)?,
                        _pad: 0,
                    };
                    dispatch_pass(&encoder, pso, &buffers, &params, work_items);
                }
            }
        }
        encoder.endEncoding();

        trace!(%kernel, len, work_items, "metal launch");
        self.submit(cmd);
        self.stats.launches += 1;
        Ok(())
    }

    fn copy(&mut self, dst: &mut MetalArray, src: &MetalArray) -> Result<(), BackendError> {
        check_lengths(dst.len, src.len)?;
        let cmd = self.command_buffer()?;
        let blit = cmd
            .blitCommandEncoder()
            .ok_or_else(|| BackendError::Execution("failed to create blit encoder".into()))?;
        let bytes = src.len * std::mem::size_of::<Key>();
        if bytes > 0 {
            // SAFETY: both buffers hold at least `bytes` bytes.
            unsafe {
                blit.copyFromBuffer_sourceOffset_toBuffer_destinationOffset_size(
                    src.buffer(),
                    0,
                    dst.buffer(),
                    0,
                    bytes,
                );
            }
        }
        blit.endEncoding();

        trace!(len = src.len, "metal copy");
        self.submit(cmd);
        self.stats.copies += 1;
        Ok(())
    }

    fn wait(&mut self) -> Result<(), BackendError> {
        self.stats.waits += 1;
        if let Some(cmd) = self.pending.take() {
            cmd.waitUntilCompleted();
            if cmd.status() == MTLCommandBufferStatus::Error {
                return Err(BackendError::Execution(
                    "command buffer completed with error status".into(),
                ));
            }
        }
        Ok(())
    }

    fn stats(&self) -> SubmissionStats {
        self.stats
    }
}
