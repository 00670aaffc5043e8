//! Pipeline State Object (PSO) cache for the pass kernels.

use std::collections::HashMap;

use objc2::rc::Retained;
use objc2::runtime::ProtocolObject;
use objc2_foundation::NSString;
use objc2_metal::{
    MTLComputePipelineDescriptor, MTLComputePipelineState, MTLDevice, MTLLibrary, MTLPipelineOption,
};

use crate::error::BackendError;

/// Threads per threadgroup requested for every pass PSO.
pub const THREADS_PER_TG: usize = 256;

/// Cache of compiled compute pipeline states, keyed by function name.
#[derive(Default)]
pub struct PsoCache {
    cache: HashMap<&'static str, Retained<ProtocolObject<dyn MTLComputePipelineState>>>,
}

impl PsoCache {
    /// Create a new empty PSO cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or compile the PSO for `function_name`.
    pub fn get_or_create(
        &mut self,
        library: &ProtocolObject<dyn MTLLibrary>,
        function_name: &'static str,
    ) -> Result<&ProtocolObject<dyn MTLComputePipelineState>, BackendError> {
        if !self.cache.contains_key(function_name) {
            let pso = compile_pso(library, function_name)?;
            self.cache.insert(function_name, pso);
        }
        Ok(&self.cache[function_name])
    }

    /// Number of cached PSOs.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

/// Compile a PSO capped at `THREADS_PER_TG` threads per group.
fn compile_pso(
    library: &ProtocolObject<dyn MTLLibrary>,
    function_name: &str,
) -> Result<Retained<ProtocolObject<dyn MTLComputePipelineState>>, BackendError> {
    let fn_name = NSString::from_str(function_name);
    let function = library.newFunctionWithName(&fn_name).ok_or_else(|| {
        BackendError::ShaderCompilation(format!("kernel function '{function_name}' not found"))
    })?;

    let descriptor = MTLComputePipelineDescriptor::new();
    descriptor.setComputeFunction(Some(&function));
    descriptor.setMaxTotalThreadsPerThreadgroup(THREADS_PER_TG);

    library
        .device()
        .newComputePipelineStateWithDescriptor_options_reflection_error(
            &descriptor,
            MTLPipelineOption::None,
            None,
        )
        .map_err(|e| {
            BackendError::ShaderCompilation(format!("PSO for '{function_name}': {:?}", e))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pso_cache_new_is_empty() {
        let cache = PsoCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.len(), 0);
    }
}
