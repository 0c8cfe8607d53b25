use egui_wgpu::ScreenDescriptor;

use crate::material::ObjectUniform;
use crate::model::ModelTransform;
use crate::renderer::camera::CameraState;
use crate::renderer::post::PostUniform;
use crate::renderer::renderer::Renderer;
use crate::renderer::uniforms::{FrameUniform, LightingUniform};
use crate::settings::{CameraSettings, DisplaySettings, LightingSettings, PostSettings};

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 1.0,
    g: 1.0,
    b: 1.0,
    a: 1.0,
};

/// Everything one frame reads from the app.
pub struct FrameInputs<'a> {
    pub camera: &'a CameraState,
    pub camera_settings: &'a CameraSettings,
    pub model_transform: &'a ModelTransform,
    pub display: &'a DisplaySettings,
    pub lighting: &'a LightingSettings,
    pub post: &'a PostSettings,
}

impl Renderer {
    fn write_uniforms(&self, inputs: &FrameInputs<'_>) {
        let aspect = self.config.width as f32 / self.config.height as f32;
        let proj = inputs.camera.projection_matrix(
            aspect,
            inputs.camera_settings.near,
            inputs.camera_settings.far,
        );
        let view_proj = proj * inputs.camera.view_matrix();
        self.queue.write_buffer(
            &self.frame_buffer,
            0,
            bytemuck::cast_slice(&[FrameUniform::new(&view_proj, inputs.camera.eye())]),
        );

        self.queue.write_buffer(
            &self.lighting_buffer,
            0,
            bytemuck::cast_slice(&[LightingUniform::new(
                inputs.lighting,
                self.environment.max_lod(),
            )]),
        );

        self.queue.write_buffer(
            &self.post_buffer,
            0,
            bytemuck::cast_slice(&[PostUniform::new(
                inputs.lighting.exposure,
                inputs.post,
                self.surface_is_srgb(),
            )]),
        );

        let model = ObjectUniform::new(
            &inputs.model_transform.matrix(),
            &inputs.model_transform.normal_matrix(),
            &self.product_material,
        );
        self.queue
            .write_buffer(&self.model_object.buffer, 0, bytemuck::cast_slice(&[model]));
    }

    pub fn render(
        &mut self,
        inputs: &FrameInputs<'_>,
        paint_jobs: Vec<egui::ClippedPrimitive>,
        textures_delta: egui::TexturesDelta,
        screen_descriptor: ScreenDescriptor,
    ) -> Result<(), wgpu::SurfaceError> {
        // Skip rendering if window size is invalid (minimized, not ready, etc.)
        if self.config.width == 0 || self.config.height == 0 {
            return Ok(());
        }

        self.write_uniforms(inputs);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut scene_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.targets.hdr_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            scene_pass.set_pipeline(&self.mesh_pipeline);
            scene_pass.set_bind_group(0, &self.frame_bind_group, &[]);
            scene_pass.set_bind_group(2, &self.material_bind_group, &[]);
            scene_pass.set_bind_group(3, &self.environment_bind_group, &[]);

            let objects = [
                (
                    inputs.display.show_ground,
                    &self.ground_mesh,
                    &self.ground_object.bind_group,
                ),
                (true, &self.model_mesh, &self.model_object.bind_group),
            ];
            for (visible, mesh, object_bind_group) in objects {
                let Some(mesh) = mesh.as_ref().filter(|_| visible) else {
                    continue;
                };
                scene_pass.set_bind_group(1, object_bind_group, &[]);
                scene_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                scene_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                scene_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }

            if inputs.display.show_grid {
                scene_pass.set_pipeline(&self.line_pipeline);
                scene_pass.set_bind_group(0, &self.frame_bind_group, &[]);
                scene_pass.set_vertex_buffer(0, self.grid_vertex_buffer.slice(..));
                scene_pass.draw(0..self.grid_vertex_count, 0..1);
            }
        }

        {
            let mut post_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Post Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            post_pass.set_pipeline(&self.post_pipeline);
            post_pass.set_bind_group(0, &self.post_bind_group, &[]);
            post_pass.draw(0..3, 0..1);
        }

        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }

        let egui_commands = self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        {
            let mut egui_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui render pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                })
                .forget_lifetime();

            self.egui_renderer
                .render(&mut egui_pass, &paint_jobs, &screen_descriptor);
        }

        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        self.queue
            .submit(egui_commands.into_iter().chain(std::iter::once(encoder.finish())));
        output.present();

        Ok(())
    }
}
