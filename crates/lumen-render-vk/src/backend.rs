// SPDX-License-Identifier: CEPL-1.0
use std::{ffi::CString, path::PathBuf};

use ash::{
    khr::{surface, swapchain},
    prelude::VkResult,
    vk, Entry, Instance,
};
use lumen_render::{
    choose_surface_format, AllocatedBuffer, BackendCall, DepthTarget, FrameSubmit, Geometry,
    GpuDevice, PipelineSet, RenderConfig, StartupError, SurfaceSupport, SwapchainConfig,
    MAX_FRAME_SLOTS,
};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use tracing::{debug, info, warn};

use crate::{
    adapter::{create_logical_device, pick_adapter, EnabledFeatures},
    geometry::{CUBE_INDICES, CUBE_VERTICES},
    instance::{create_instance, DebugMessenger},
    memory, resources,
    resources::{PipelineInputs, Texture},
    shaders::ShaderCode,
    texture::{load_rgba, TexturePixels},
};

/// Startup knobs that only the ash backend cares about.
#[derive(Clone, Debug)]
pub struct VkOptions {
    pub app_name: String,
    /// Image sampled by the cube shader.
    pub texture: PathBuf,
    /// Directory holding `vert.spv`/`frag.spv`; `None` uses the built-in copies.
    pub shader_dir: Option<PathBuf>,
    pub validation: bool,
}

impl Default for VkOptions {
    fn default() -> Self {
        Self {
            app_name: "lumen".into(),
            texture: PathBuf::from("assets/checker.ppm"),
            shader_dir: None,
            validation: cfg!(debug_assertions),
        }
    }
}

/// Objects that live from startup to shutdown, independent of the swapchain.
#[derive(Default)]
struct StaticResources {
    upload_pool: vk::CommandPool,
    color_format: vk::Format,
    depth_format: vk::Format,
    render_pass: vk::RenderPass,
    set_layout: vk::DescriptorSetLayout,
    pipeline_layout: vk::PipelineLayout,
    descriptor_pool: vk::DescriptorPool,
    vertices: AllocatedBuffer,
    indices: AllocatedBuffer,
    texture: Texture,
    sampler: vk::Sampler,
}

/// The ash implementation of [`GpuDevice`].
///
/// Owns the instance, surface, logical device and every static resource.
/// Swapchain-scoped and per-frame objects are created through the trait and
/// owned by the caller.
pub struct VkDevice {
    _entry: Entry,
    instance: Instance,
    debug: Option<DebugMessenger>,
    surface_loader: surface::Instance,
    surface: vk::SurfaceKHR,
    phys: vk::PhysicalDevice,
    adapter_name: String,
    memory_props: vk::PhysicalDeviceMemoryProperties,
    device: ash::Device,
    queue: vk::Queue,
    queue_family: u32,
    swapchain_loader: swapchain::Device,
    features: EnabledFeatures,
    depth_test: bool,
    shaders: ShaderCode,
    statics: StaticResources,
}

impl VkDevice {
    // STRICT ORDER:
    // 1) instance, then the surface from THIS instance
    // 2) adapter and queue family chosen against that surface
    // 3) logical device
    // 4) static resources; the render pass colour format comes from the
    //    surface's format list
    pub fn new(
        window: &dyn HasWindowHandle,
        display: &dyn HasDisplayHandle,
        options: &VkOptions,
        config: &RenderConfig,
    ) -> Result<Self, StartupError> {
        let dh = display
            .display_handle()
            .map_err(|e| StartupError::Window(e.to_string()))?
            .as_raw();
        let wh = window
            .window_handle()
            .map_err(|e| StartupError::Window(e.to_string()))?
            .as_raw();

        // Asset problems surface before any GPU object exists.
        let shaders = ShaderCode::load(options.shader_dir.as_deref())?;
        let pixels = load_rgba(&options.texture)?;
        let app_name = CString::new(options.app_name.replace('\0', ""))
            .unwrap_or_else(|_| CString::from(c"lumen"));

        unsafe {
            let entry = Entry::linked();
            let instance = create_instance(&entry, dh, &app_name, options.validation)?;
            let debug = if options.validation {
                match DebugMessenger::new(&entry, &instance) {
                    Ok(m) => Some(m),
                    Err(e) => {
                        instance.destroy_instance(None);
                        return Err(e);
                    }
                }
            } else {
                None
            };

            let surface_loader = surface::Instance::new(&entry, &instance);
            let surface = match ash_window::create_surface(&entry, &instance, dh, wh, None) {
                Ok(s) => s,
                Err(code) => {
                    if let Some(m) = &debug {
                        m.destroy();
                    }
                    instance.destroy_instance(None);
                    return Err(StartupError::Backend {
                        call: "ash_window::create_surface",
                        code,
                    });
                }
            };

            let opened = pick_adapter(&instance, &surface_loader, surface).and_then(|adapter| {
                let (device, queue, features) = create_logical_device(&instance, &adapter)?;
                Ok((adapter, device, queue, features))
            });
            let (adapter, device, queue, features) = match opened {
                Ok(v) => v,
                Err(e) => {
                    surface_loader.destroy_surface(surface, None);
                    if let Some(m) = &debug {
                        m.destroy();
                    }
                    instance.destroy_instance(None);
                    return Err(e);
                }
            };

            let swapchain_loader = swapchain::Device::new(&instance, &device);
            let memory_props = instance.get_physical_device_memory_properties(adapter.phys);

            // From here on Drop cleans up whatever was built.
            let mut this = Self {
                _entry: entry,
                instance,
                debug,
                surface_loader,
                surface,
                phys: adapter.phys,
                adapter_name: adapter.name.clone(),
                memory_props,
                device,
                queue,
                queue_family: adapter.queue_family,
                swapchain_loader,
                features,
                depth_test: config.depth_test,
                shaders,
                statics: StaticResources::default(),
            };
            let anisotropy = features
                .sampler_anisotropy
                .then_some(adapter.max_anisotropy.min(16.0));
            this.create_statics(&pixels, anisotropy)?;
            info!(
                "device ready on {} (wireframe {}, depth {})",
                this.adapter_name,
                if features.fill_mode_non_solid { "yes" } else { "no" },
                if config.depth_test { "on" } else { "off" }
            );
            Ok(this)
        }
    }

    unsafe fn create_statics(
        &mut self,
        pixels: &TexturePixels,
        anisotropy: Option<f32>,
    ) -> Result<(), StartupError> {
        let d = &self.device;
        let s = &mut self.statics;

        let pool_ci = vk::CommandPoolCreateInfo {
            s_type: vk::StructureType::COMMAND_POOL_CREATE_INFO,
            flags: vk::CommandPoolCreateFlags::TRANSIENT,
            queue_family_index: self.queue_family,
            ..Default::default()
        };
        s.upload_pool = d
            .create_command_pool(&pool_ci, None)
            .during("vkCreateCommandPool(upload)")?;

        let formats = self
            .surface_loader
            .get_physical_device_surface_formats(self.phys, self.surface)
            .during("vkGetPhysicalDeviceSurfaceFormatsKHR")?;
        s.color_format = choose_surface_format(&formats)
            .ok_or(StartupError::NoSurfaceFormat)?
            .format;
        s.depth_format = resources::pick_depth_format(&self.instance, self.phys);
        debug!(color = ?s.color_format, depth = ?s.depth_format, "attachment formats");

        s.render_pass = resources::create_render_pass(
            d,
            s.color_format,
            self.depth_test.then_some(s.depth_format),
        )?;
        s.set_layout = resources::create_descriptor_set_layout(d)?;
        s.pipeline_layout = resources::create_pipeline_layout(d, s.set_layout)?;
        s.descriptor_pool = resources::create_descriptor_pool(d, MAX_FRAME_SLOTS as u32)?;

        s.vertices = memory::upload_via_staging(
            d,
            &self.memory_props,
            self.queue,
            s.upload_pool,
            vk::BufferUsageFlags::VERTEX_BUFFER,
            bytemuck::cast_slice(&CUBE_VERTICES),
        )?;
        s.indices = memory::upload_via_staging(
            d,
            &self.memory_props,
            self.queue,
            s.upload_pool,
            vk::BufferUsageFlags::INDEX_BUFFER,
            bytemuck::cast_slice(&CUBE_INDICES),
        )?;
        s.texture =
            resources::create_texture(d, &self.memory_props, self.queue, s.upload_pool, pixels)?;
        s.sampler = resources::create_sampler(d, anisotropy)?;
        Ok(())
    }

    pub fn adapter_name(&self) -> &str {
        &self.adapter_name
    }

    pub fn supports_wireframe(&self) -> bool {
        self.features.fill_mode_non_solid
    }
}

impl GpuDevice for VkDevice {
    fn surface_support(&self) -> VkResult<SurfaceSupport> {
        unsafe {
            Ok(SurfaceSupport {
                capabilities: self
                    .surface_loader
                    .get_physical_device_surface_capabilities(self.phys, self.surface)?,
                formats: self
                    .surface_loader
                    .get_physical_device_surface_formats(self.phys, self.surface)?,
                present_modes: self
                    .surface_loader
                    .get_physical_device_surface_present_modes(self.phys, self.surface)?,
            })
        }
    }

    fn geometry(&self) -> Geometry {
        Geometry {
            vertex_buffer: self.statics.vertices.buffer,
            index_buffer: self.statics.indices.buffer,
            index_count: CUBE_INDICES.len() as u32,
        }
    }

    fn create_swapchain(
        &self,
        config: &SwapchainConfig,
        old: vk::SwapchainKHR,
    ) -> VkResult<vk::SwapchainKHR> {
        if config.surface_format.format != self.statics.color_format {
            warn!(
                "surface now prefers {:?}, render pass was built for {:?}",
                config.surface_format.format, self.statics.color_format
            );
        }
        let ci = vk::SwapchainCreateInfoKHR {
            s_type: vk::StructureType::SWAPCHAIN_CREATE_INFO_KHR,
            surface: self.surface,
            min_image_count: config.image_count,
            image_format: config.surface_format.format,
            image_color_space: config.surface_format.color_space,
            image_extent: config.extent,
            image_array_layers: 1,
            image_usage: vk::ImageUsageFlags::COLOR_ATTACHMENT,
            image_sharing_mode: vk::SharingMode::EXCLUSIVE,
            pre_transform: config.pre_transform,
            composite_alpha: vk::CompositeAlphaFlagsKHR::OPAQUE,
            present_mode: config.present_mode,
            clipped: vk::TRUE,
            old_swapchain: old,
            ..Default::default()
        };
        unsafe { self.swapchain_loader.create_swapchain(&ci, None) }
    }

    fn swapchain_images(&self, swapchain: vk::SwapchainKHR) -> VkResult<Vec<vk::Image>> {
        unsafe { self.swapchain_loader.get_swapchain_images(swapchain) }
    }

    fn destroy_swapchain(&self, swapchain: vk::SwapchainKHR) {
        unsafe { self.swapchain_loader.destroy_swapchain(swapchain, None) }
    }

    fn create_image_view(&self, image: vk::Image, format: vk::Format) -> VkResult<vk::ImageView> {
        unsafe {
            resources::create_image_view(&self.device, image, format, vk::ImageAspectFlags::COLOR)
        }
    }

    fn destroy_image_view(&self, view: vk::ImageView) {
        unsafe { self.device.destroy_image_view(view, None) }
    }

    fn create_depth_target(&self, extent: vk::Extent2D) -> Result<DepthTarget, StartupError> {
        unsafe {
            resources::create_depth_target(
                &self.device,
                &self.memory_props,
                extent,
                self.statics.depth_format,
            )
        }
    }

    fn destroy_depth_target(&self, depth: &DepthTarget) {
        unsafe { resources::destroy_depth_target(&self.device, depth) }
    }

    fn create_framebuffer(
        &self,
        attachments: &[vk::ImageView],
        extent: vk::Extent2D,
    ) -> VkResult<vk::Framebuffer> {
        let ci = vk::FramebufferCreateInfo {
            s_type: vk::StructureType::FRAMEBUFFER_CREATE_INFO,
            render_pass: self.statics.render_pass,
            attachment_count: attachments.len() as u32,
            p_attachments: attachments.as_ptr(),
            width: extent.width,
            height: extent.height,
            layers: 1,
            ..Default::default()
        };
        unsafe { self.device.create_framebuffer(&ci, None) }
    }

    fn destroy_framebuffer(&self, framebuffer: vk::Framebuffer) {
        unsafe { self.device.destroy_framebuffer(framebuffer, None) }
    }

    fn create_pipelines(&self, extent: vk::Extent2D) -> Result<PipelineSet, StartupError> {
        let inputs = PipelineInputs {
            render_pass: self.statics.render_pass,
            layout: self.statics.pipeline_layout,
            shaders: &self.shaders,
            depth_test: self.depth_test,
            wireframe: self.features.fill_mode_non_solid,
        };
        unsafe { resources::create_pipelines(&self.device, &inputs, extent) }
    }

    fn destroy_pipelines(&self, pipelines: &PipelineSet) {
        unsafe {
            self.device.destroy_pipeline(pipelines.fill, None);
            if let Some(wire) = pipelines.wireframe {
                self.device.destroy_pipeline(wire, None);
            }
        }
    }

    fn create_semaphore(&self) -> VkResult<vk::Semaphore> {
        let ci = vk::SemaphoreCreateInfo {
            s_type: vk::StructureType::SEMAPHORE_CREATE_INFO,
            ..Default::default()
        };
        unsafe { self.device.create_semaphore(&ci, None) }
    }

    fn destroy_semaphore(&self, semaphore: vk::Semaphore) {
        unsafe { self.device.destroy_semaphore(semaphore, None) }
    }

    fn create_fence(&self, signaled: bool) -> VkResult<vk::Fence> {
        let ci = vk::FenceCreateInfo {
            s_type: vk::StructureType::FENCE_CREATE_INFO,
            flags: if signaled {
                vk::FenceCreateFlags::SIGNALED
            } else {
                vk::FenceCreateFlags::empty()
            },
            ..Default::default()
        };
        unsafe { self.device.create_fence(&ci, None) }
    }

    fn destroy_fence(&self, fence: vk::Fence) {
        unsafe { self.device.destroy_fence(fence, None) }
    }

    fn create_command_pool(&self) -> VkResult<vk::CommandPool> {
        let ci = vk::CommandPoolCreateInfo {
            s_type: vk::StructureType::COMMAND_POOL_CREATE_INFO,
            flags: vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER,
            queue_family_index: self.queue_family,
            ..Default::default()
        };
        unsafe { self.device.create_command_pool(&ci, None) }
    }

    fn allocate_command_buffer(&self, pool: vk::CommandPool) -> VkResult<vk::CommandBuffer> {
        let ai = vk::CommandBufferAllocateInfo {
            s_type: vk::StructureType::COMMAND_BUFFER_ALLOCATE_INFO,
            command_pool: pool,
            level: vk::CommandBufferLevel::PRIMARY,
            command_buffer_count: 1,
            ..Default::default()
        };
        unsafe { Ok(self.device.allocate_command_buffers(&ai)?[0]) }
    }

    fn destroy_command_pool(&self, pool: vk::CommandPool) {
        unsafe { self.device.destroy_command_pool(pool, None) }
    }

    fn create_buffer(
        &self,
        size: vk::DeviceSize,
        usage: vk::BufferUsageFlags,
        properties: vk::MemoryPropertyFlags,
    ) -> Result<AllocatedBuffer, StartupError> {
        unsafe {
            memory::create_buffer_and_memory(
                &self.device,
                &self.memory_props,
                size,
                usage,
                properties,
            )
        }
    }

    fn destroy_buffer(&self, buffer: &AllocatedBuffer) {
        unsafe { memory::destroy_buffer(&self.device, buffer) }
    }

    fn allocate_frame_descriptor_set(
        &self,
        uniform: &AllocatedBuffer,
        storage: &AllocatedBuffer,
    ) -> VkResult<vk::DescriptorSet> {
        let ai = vk::DescriptorSetAllocateInfo {
            s_type: vk::StructureType::DESCRIPTOR_SET_ALLOCATE_INFO,
            descriptor_pool: self.statics.descriptor_pool,
            descriptor_set_count: 1,
            p_set_layouts: &self.statics.set_layout,
            ..Default::default()
        };
        unsafe {
            let set = self.device.allocate_descriptor_sets(&ai)?[0];
            resources::write_frame_descriptor_set(
                &self.device,
                set,
                (uniform.buffer, uniform.size),
                (storage.buffer, storage.size),
                self.statics.texture.view,
                self.statics.sampler,
            );
            Ok(set)
        }
    }

    fn acquire_next_image(
        &self,
        swapchain: vk::SwapchainKHR,
        signal: vk::Semaphore,
    ) -> VkResult<(u32, bool)> {
        unsafe {
            self.swapchain_loader
                .acquire_next_image(swapchain, u64::MAX, signal, vk::Fence::null())
        }
    }

    fn wait_for_fence(&self, fence: vk::Fence) -> VkResult<()> {
        unsafe {
            self.device
                .wait_for_fences(std::slice::from_ref(&fence), true, u64::MAX)
        }
    }

    fn reset_fence(&self, fence: vk::Fence) -> VkResult<()> {
        unsafe { self.device.reset_fences(std::slice::from_ref(&fence)) }
    }

    fn signal_fence(&self, wait: vk::Semaphore, fence: vk::Fence) -> VkResult<()> {
        let stage = vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT;
        let si = vk::SubmitInfo {
            s_type: vk::StructureType::SUBMIT_INFO,
            wait_semaphore_count: 1,
            p_wait_semaphores: &wait,
            p_wait_dst_stage_mask: &stage,
            ..Default::default()
        };
        unsafe {
            self.device
                .queue_submit(self.queue, std::slice::from_ref(&si), fence)
        }
    }

    fn reset_command_buffer(&self, cmd: vk::CommandBuffer) -> VkResult<()> {
        unsafe {
            self.device
                .reset_command_buffer(cmd, vk::CommandBufferResetFlags::empty())
        }
    }

    fn begin_command_buffer(&self, cmd: vk::CommandBuffer) -> VkResult<()> {
        let bi = vk::CommandBufferBeginInfo {
            s_type: vk::StructureType::COMMAND_BUFFER_BEGIN_INFO,
            flags: vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT,
            ..Default::default()
        };
        unsafe { self.device.begin_command_buffer(cmd, &bi) }
    }

    fn end_command_buffer(&self, cmd: vk::CommandBuffer) -> VkResult<()> {
        unsafe { self.device.end_command_buffer(cmd) }
    }

    fn write_buffer(&self, buffer: &AllocatedBuffer, data: &[u8]) -> VkResult<()> {
        unsafe { memory::write_mapped(&self.device, buffer, data) }
    }

    fn queue_submit(&self, submit: &FrameSubmit) -> VkResult<()> {
        let si = vk::SubmitInfo {
            s_type: vk::StructureType::SUBMIT_INFO,
            wait_semaphore_count: 1,
            p_wait_semaphores: &submit.wait_semaphore,
            p_wait_dst_stage_mask: &submit.wait_stage,
            command_buffer_count: 1,
            p_command_buffers: &submit.command_buffer,
            signal_semaphore_count: 1,
            p_signal_semaphores: &submit.signal_semaphore,
            ..Default::default()
        };
        unsafe {
            self.device
                .queue_submit(self.queue, std::slice::from_ref(&si), submit.fence)
        }
    }

    fn queue_present(
        &self,
        swapchain: vk::SwapchainKHR,
        image_index: u32,
        wait: vk::Semaphore,
    ) -> VkResult<bool> {
        let pi = vk::PresentInfoKHR {
            s_type: vk::StructureType::PRESENT_INFO_KHR,
            wait_semaphore_count: 1,
            p_wait_semaphores: &wait,
            swapchain_count: 1,
            p_swapchains: &swapchain,
            p_image_indices: &image_index,
            ..Default::default()
        };
        unsafe { self.swapchain_loader.queue_present(self.queue, &pi) }
    }

    fn device_wait_idle(&self) -> VkResult<()> {
        unsafe { self.device.device_wait_idle() }
    }

    fn cmd_begin_render_pass(
        &self,
        cmd: vk::CommandBuffer,
        framebuffer: vk::Framebuffer,
        extent: vk::Extent2D,
        clear_values: &[vk::ClearValue],
    ) {
        let rp_begin = vk::RenderPassBeginInfo {
            s_type: vk::StructureType::RENDER_PASS_BEGIN_INFO,
            render_pass: self.statics.render_pass,
            framebuffer,
            render_area: vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent,
            },
            clear_value_count: clear_values.len() as u32,
            p_clear_values: clear_values.as_ptr(),
            ..Default::default()
        };
        unsafe {
            self.device
                .cmd_begin_render_pass(cmd, &rp_begin, vk::SubpassContents::INLINE)
        }
    }

    fn cmd_bind_pipeline(&self, cmd: vk::CommandBuffer, pipeline: vk::Pipeline) {
        unsafe {
            self.device
                .cmd_bind_pipeline(cmd, vk::PipelineBindPoint::GRAPHICS, pipeline)
        }
    }

    fn cmd_bind_vertex_buffer(&self, cmd: vk::CommandBuffer, buffer: vk::Buffer) {
        unsafe { self.device.cmd_bind_vertex_buffers(cmd, 0, &[buffer], &[0]) }
    }

    fn cmd_bind_index_buffer(&self, cmd: vk::CommandBuffer, buffer: vk::Buffer) {
        unsafe {
            self.device
                .cmd_bind_index_buffer(cmd, buffer, 0, vk::IndexType::UINT16)
        }
    }

    fn cmd_bind_descriptor_set(&self, cmd: vk::CommandBuffer, set: vk::DescriptorSet) {
        unsafe {
            self.device.cmd_bind_descriptor_sets(
                cmd,
                vk::PipelineBindPoint::GRAPHICS,
                self.statics.pipeline_layout,
                0,
                &[set],
                &[],
            )
        }
    }

    fn cmd_draw_indexed(&self, cmd: vk::CommandBuffer, index_count: u32, first_instance: u32) {
        unsafe {
            self.device
                .cmd_draw_indexed(cmd, index_count, 1, 0, 0, first_instance)
        }
    }

    fn cmd_clear_rects(&self, cmd: vk::CommandBuffer, color: [f32; 4], rects: &[vk::Rect2D]) {
        if rects.is_empty() {
            return;
        }
        let attachment = vk::ClearAttachment {
            aspect_mask: vk::ImageAspectFlags::COLOR,
            color_attachment: 0,
            clear_value: vk::ClearValue {
                color: vk::ClearColorValue { float32: color },
            },
        };
        let clear_rects: Vec<vk::ClearRect> = rects
            .iter()
            .map(|&rect| vk::ClearRect {
                rect,
                base_array_layer: 0,
                layer_count: 1,
            })
            .collect();
        unsafe {
            self.device
                .cmd_clear_attachments(cmd, std::slice::from_ref(&attachment), &clear_rects)
        }
    }

    fn cmd_end_render_pass(&self, cmd: vk::CommandBuffer) {
        unsafe { self.device.cmd_end_render_pass(cmd) }
    }
}

// STRICT TEARDOWN ORDER:
// - device idle
// - static resources (buffers, texture, sampler, descriptor pool, layouts,
//   render pass, upload pool); null handles are no-ops
// - device
// - debug messenger, surface, instance last
// Swapchain targets and frame slots belong to the renderer and are gone
// before this runs.
impl Drop for VkDevice {
    fn drop(&mut self) {
        unsafe {
            if let Err(code) = self.device.device_wait_idle() {
                warn!(?code, "device_wait_idle failed during teardown");
            }
            let d = &self.device;
            let s = &self.statics;
            d.destroy_sampler(s.sampler, None);
            resources::destroy_texture(d, &s.texture);
            memory::destroy_buffer(d, &s.indices);
            memory::destroy_buffer(d, &s.vertices);
            d.destroy_descriptor_pool(s.descriptor_pool, None);
            d.destroy_pipeline_layout(s.pipeline_layout, None);
            d.destroy_descriptor_set_layout(s.set_layout, None);
            d.destroy_render_pass(s.render_pass, None);
            d.destroy_command_pool(s.upload_pool, None);

            d.destroy_device(None);

            if let Some(m) = &self.debug {
                m.destroy();
            }
            self.surface_loader.destroy_surface(self.surface, None);
            self.instance.destroy_instance(None);
        }
        debug!("vulkan device destroyed");
    }
}
