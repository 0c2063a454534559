use anyhow::{Context as _, anyhow, bail};
use imgui::{DrawCmd, DrawData, DrawIdx, DrawVert, TextureId};
use log::debug;
use windows::Win32::Foundation::RECT;
use windows::Win32::Graphics::Direct3D::Fxc::{D3DCOMPILE_ENABLE_STRICTNESS, D3DCompile};
use windows::Win32::Graphics::Direct3D::{D3D_PRIMITIVE_TOPOLOGY_TRIANGLELIST, ID3DBlob};
use windows::Win32::Graphics::Direct3D11::{
    D3D11_BIND_CONSTANT_BUFFER, D3D11_BIND_INDEX_BUFFER, D3D11_BIND_SHADER_RESOURCE,
    D3D11_BIND_VERTEX_BUFFER, D3D11_BLEND_DESC, D3D11_BLEND_INV_SRC_ALPHA, D3D11_BLEND_ONE,
    D3D11_BLEND_OP_ADD, D3D11_BLEND_SRC_ALPHA, D3D11_BUFFER_DESC, D3D11_COLOR_WRITE_ENABLE_ALL,
    D3D11_COMPARISON_ALWAYS, D3D11_CPU_ACCESS_WRITE, D3D11_CULL_NONE, D3D11_FILL_SOLID,
    D3D11_FILTER_MIN_MAG_MIP_LINEAR, D3D11_INPUT_ELEMENT_DESC, D3D11_INPUT_PER_VERTEX_DATA,
    D3D11_MAP_WRITE_DISCARD, D3D11_MAPPED_SUBRESOURCE, D3D11_RASTERIZER_DESC,
    D3D11_RENDER_TARGET_BLEND_DESC, D3D11_SAMPLER_DESC, D3D11_SUBRESOURCE_DATA,
    D3D11_TEXTURE2D_DESC, D3D11_TEXTURE_ADDRESS_WRAP, D3D11_USAGE_DEFAULT, D3D11_USAGE_DYNAMIC,
    D3D11_VIEWPORT, ID3D11BlendState, ID3D11Buffer, ID3D11Device, ID3D11DeviceContext,
    ID3D11InputLayout, ID3D11PixelShader, ID3D11RasterizerState, ID3D11SamplerState,
    ID3D11ShaderResourceView, ID3D11Texture2D, ID3D11VertexShader,
};
use windows::Win32::Graphics::Dxgi::Common::{
    DXGI_FORMAT_R8G8B8A8_UNORM, DXGI_FORMAT_R16_UINT, DXGI_FORMAT_R32G32_FLOAT, DXGI_SAMPLE_DESC,
};
use windows::core::{PCSTR, s};

use crate::overlay::device::PresentationTarget;

/// Slack added when a draw-data frame outgrows the dynamic buffers, so
/// steady UI growth doesn't reallocate every frame.
const VERTEX_SLACK: usize = 5000;
const INDEX_SLACK: usize = 10000;

/// The only texture this renderer owns is the font atlas.
const FONT_TEXTURE_ID: usize = 1;

const SHADER_SOURCE: &str = r#"
cbuffer vertexBuffer : register(b0)
{
    float4x4 ProjectionMatrix;
};

struct VS_INPUT
{
    float2 pos : POSITION;
    float2 uv  : TEXCOORD0;
    float4 col : COLOR0;
};

struct PS_INPUT
{
    float4 pos : SV_POSITION;
    float4 col : COLOR0;
    float2 uv  : TEXCOORD0;
};

sampler sampler0;
Texture2D texture0;

PS_INPUT VS_Main(VS_INPUT input)
{
    PS_INPUT output;
    output.pos = mul(ProjectionMatrix, float4(input.pos.xy, 0.f, 1.f));
    output.col = input.col;
    output.uv = input.uv;
    return output;
}

float4 PS_Main(PS_INPUT input) : SV_Target
{
    return input.col * texture0.Sample(sampler0, input.uv);
}
"#;

/// Rendering half of the GUI bridge: turns imgui draw data into D3D11 draw
/// calls against the presentation target's device.
pub struct Dx11Renderer {
    device: ID3D11Device,
    context: ID3D11DeviceContext,
    vertex_shader: ID3D11VertexShader,
    pixel_shader: ID3D11PixelShader,
    input_layout: ID3D11InputLayout,
    constant_buffer: ID3D11Buffer,
    blend_state: ID3D11BlendState,
    rasterizer_state: ID3D11RasterizerState,
    sampler: ID3D11SamplerState,
    font_view: ID3D11ShaderResourceView,
    vertex_buffer: Option<ID3D11Buffer>,
    vertex_capacity: usize,
    index_buffer: Option<ID3D11Buffer>,
    index_capacity: usize,
}

impl Dx11Renderer {
    pub fn new(ctx: &mut imgui::Context, target: &PresentationTarget) -> anyhow::Result<Self> {
        let device = target.device().clone();
        let context = target.context().clone();

        unsafe {
            let vs_blob = compile_shader(SHADER_SOURCE, s!("VS_Main"), s!("vs_4_0"))?;
            let vs_bytes = blob_bytes(&vs_blob);
            let mut vertex_shader = None;
            device
                .CreateVertexShader(vs_bytes, None, Some(&mut vertex_shader))
                .context("vertex shader")?;
            let vertex_shader = vertex_shader.ok_or_else(|| anyhow!("vertex shader is null"))?;

            let ps_blob = compile_shader(SHADER_SOURCE, s!("PS_Main"), s!("ps_4_0"))?;
            let mut pixel_shader = None;
            device
                .CreatePixelShader(blob_bytes(&ps_blob), None, Some(&mut pixel_shader))
                .context("pixel shader")?;
            let pixel_shader = pixel_shader.ok_or_else(|| anyhow!("pixel shader is null"))?;

            let input_elements = [
                D3D11_INPUT_ELEMENT_DESC {
                    SemanticName: s!("POSITION"),
                    SemanticIndex: 0,
                    Format: DXGI_FORMAT_R32G32_FLOAT,
                    InputSlot: 0,
                    AlignedByteOffset: 0,
                    InputSlotClass: D3D11_INPUT_PER_VERTEX_DATA,
                    InstanceDataStepRate: 0,
                },
                D3D11_INPUT_ELEMENT_DESC {
                    SemanticName: s!("TEXCOORD"),
                    SemanticIndex: 0,
                    Format: DXGI_FORMAT_R32G32_FLOAT,
                    InputSlot: 0,
                    AlignedByteOffset: 8,
                    InputSlotClass: D3D11_INPUT_PER_VERTEX_DATA,
                    InstanceDataStepRate: 0,
                },
                D3D11_INPUT_ELEMENT_DESC {
                    SemanticName: s!("COLOR"),
                    SemanticIndex: 0,
                    Format: DXGI_FORMAT_R8G8B8A8_UNORM,
                    InputSlot: 0,
                    AlignedByteOffset: 16,
                    InputSlotClass: D3D11_INPUT_PER_VERTEX_DATA,
                    InstanceDataStepRate: 0,
                },
            ];
            let mut input_layout = None;
            device
                .CreateInputLayout(&input_elements, vs_bytes, Some(&mut input_layout))
                .context("input layout")?;
            let input_layout = input_layout.ok_or_else(|| anyhow!("input layout is null"))?;

            let cb_desc = D3D11_BUFFER_DESC {
                ByteWidth: 64,
                Usage: D3D11_USAGE_DYNAMIC,
                BindFlags: D3D11_BIND_CONSTANT_BUFFER.0 as u32,
                CPUAccessFlags: D3D11_CPU_ACCESS_WRITE.0 as u32,
                MiscFlags: 0,
                StructureByteStride: 0,
            };
            let mut constant_buffer = None;
            device
                .CreateBuffer(&cb_desc, None, Some(&mut constant_buffer))
                .context("constant buffer")?;
            let constant_buffer =
                constant_buffer.ok_or_else(|| anyhow!("constant buffer is null"))?;

            let blend_desc = D3D11_BLEND_DESC {
                AlphaToCoverageEnable: false.into(),
                IndependentBlendEnable: false.into(),
                RenderTarget: [
                    D3D11_RENDER_TARGET_BLEND_DESC {
                        BlendEnable: true.into(),
                        SrcBlend: D3D11_BLEND_SRC_ALPHA,
                        DestBlend: D3D11_BLEND_INV_SRC_ALPHA,
                        BlendOp: D3D11_BLEND_OP_ADD,
                        SrcBlendAlpha: D3D11_BLEND_ONE,
                        DestBlendAlpha: D3D11_BLEND_INV_SRC_ALPHA,
                        BlendOpAlpha: D3D11_BLEND_OP_ADD,
                        RenderTargetWriteMask: D3D11_COLOR_WRITE_ENABLE_ALL.0 as u8,
                    },
                    Default::default(),
                    Default::default(),
                    Default::default(),
                    Default::default(),
                    Default::default(),
                    Default::default(),
                    Default::default(),
                ],
            };
            let mut blend_state = None;
            device
                .CreateBlendState(&blend_desc, Some(&mut blend_state))
                .context("blend state")?;
            let blend_state = blend_state.ok_or_else(|| anyhow!("blend state is null"))?;

            let rasterizer_desc = D3D11_RASTERIZER_DESC {
                FillMode: D3D11_FILL_SOLID,
                CullMode: D3D11_CULL_NONE,
                ScissorEnable: true.into(),
                DepthClipEnable: true.into(),
                ..Default::default()
            };
            let mut rasterizer_state = None;
            device
                .CreateRasterizerState(&rasterizer_desc, Some(&mut rasterizer_state))
                .context("rasterizer state")?;
            let rasterizer_state =
                rasterizer_state.ok_or_else(|| anyhow!("rasterizer state is null"))?;

            let sampler_desc = D3D11_SAMPLER_DESC {
                Filter: D3D11_FILTER_MIN_MAG_MIP_LINEAR,
                AddressU: D3D11_TEXTURE_ADDRESS_WRAP,
                AddressV: D3D11_TEXTURE_ADDRESS_WRAP,
                AddressW: D3D11_TEXTURE_ADDRESS_WRAP,
                ComparisonFunc: D3D11_COMPARISON_ALWAYS,
                MaxLOD: f32::MAX,
                ..Default::default()
            };
            let mut sampler = None;
            device
                .CreateSamplerState(&sampler_desc, Some(&mut sampler))
                .context("sampler state")?;
            let sampler = sampler.ok_or_else(|| anyhow!("sampler state is null"))?;

            let font_view = upload_font_atlas(&device, ctx)?;

            debug!("d3d11 renderer bindings created");

            Ok(Self {
                device,
                context,
                vertex_shader,
                pixel_shader,
                input_layout,
                constant_buffer,
                blend_state,
                rasterizer_state,
                sampler,
                font_view,
                vertex_buffer: None,
                vertex_capacity: 0,
                index_buffer: None,
                index_capacity: 0,
            })
        }
    }

    /// Submit one frame of draw data to the bound render target.
    pub fn render(&mut self, draw_data: &DrawData) -> anyhow::Result<()> {
        if draw_data.display_size[0] <= 0.0
            || draw_data.display_size[1] <= 0.0
            || draw_data.total_vtx_count == 0
        {
            return Ok(());
        }

        self.ensure_buffer_capacity(
            draw_data.total_vtx_count as usize,
            draw_data.total_idx_count as usize,
        )?;
        self.upload_draw_data(draw_data)?;
        self.upload_projection(draw_data)?;

        unsafe {
            self.setup_render_state(draw_data);

            let display_pos = draw_data.display_pos;
            let mut vtx_base = 0usize;
            let mut idx_base = 0usize;
            for list in draw_data.draw_lists() {
                for cmd in list.commands() {
                    match cmd {
                        DrawCmd::Elements { count, cmd_params } => {
                            let clip = cmd_params.clip_rect;
                            let scissor = RECT {
                                left: (clip[0] - display_pos[0]) as i32,
                                top: (clip[1] - display_pos[1]) as i32,
                                right: (clip[2] - display_pos[0]) as i32,
                                bottom: (clip[3] - display_pos[1]) as i32,
                            };
                            if scissor.right <= scissor.left || scissor.bottom <= scissor.top {
                                continue;
                            }
                            self.context.RSSetScissorRects(Some(&[scissor]));
                            // Only the font atlas is registered, so every
                            // command binds it regardless of texture id.
                            self.context.PSSetShaderResources(
                                0,
                                Some(&[Some(self.font_view.clone())]),
                            );
                            self.context.DrawIndexed(
                                count as u32,
                                (idx_base + cmd_params.idx_offset) as u32,
                                (vtx_base + cmd_params.vtx_offset) as i32,
                            );
                        }
                        DrawCmd::ResetRenderState => self.setup_render_state(draw_data),
                        // User callbacks aren't part of this template.
                        DrawCmd::RawCallback { .. } => {}
                    }
                }
                vtx_base += list.vtx_buffer().len();
                idx_base += list.idx_buffer().len();
            }
        }
        Ok(())
    }

    fn ensure_buffer_capacity(&mut self, vertices: usize, indices: usize) -> anyhow::Result<()> {
        if self.vertex_buffer.is_none() || self.vertex_capacity < vertices {
            self.vertex_capacity = vertices + VERTEX_SLACK;
            self.vertex_buffer = Some(create_dynamic_buffer(
                &self.device,
                self.vertex_capacity * size_of::<DrawVert>(),
                D3D11_BIND_VERTEX_BUFFER.0 as u32,
            )?);
        }
        if self.index_buffer.is_none() || self.index_capacity < indices {
            self.index_capacity = indices + INDEX_SLACK;
            self.index_buffer = Some(create_dynamic_buffer(
                &self.device,
                self.index_capacity * size_of::<DrawIdx>(),
                D3D11_BIND_INDEX_BUFFER.0 as u32,
            )?);
        }
        Ok(())
    }

    fn upload_draw_data(&mut self, draw_data: &DrawData) -> anyhow::Result<()> {
        let vertex_buffer = self
            .vertex_buffer
            .as_ref()
            .ok_or_else(|| anyhow!("vertex buffer missing"))?;
        let index_buffer = self
            .index_buffer
            .as_ref()
            .ok_or_else(|| anyhow!("index buffer missing"))?;

        unsafe {
            let mut mapped = D3D11_MAPPED_SUBRESOURCE::default();
            self.context
                .Map(vertex_buffer, 0, D3D11_MAP_WRITE_DISCARD, 0, Some(&mut mapped))
                .context("map vertex buffer")?;
            let mut dst = mapped.pData as *mut DrawVert;
            for list in draw_data.draw_lists() {
                let src = list.vtx_buffer();
                std::ptr::copy_nonoverlapping(src.as_ptr(), dst, src.len());
                dst = dst.add(src.len());
            }
            self.context.Unmap(vertex_buffer, 0);

            let mut mapped = D3D11_MAPPED_SUBRESOURCE::default();
            self.context
                .Map(index_buffer, 0, D3D11_MAP_WRITE_DISCARD, 0, Some(&mut mapped))
                .context("map index buffer")?;
            let mut dst = mapped.pData as *mut DrawIdx;
            for list in draw_data.draw_lists() {
                let src = list.idx_buffer();
                std::ptr::copy_nonoverlapping(src.as_ptr(), dst, src.len());
                dst = dst.add(src.len());
            }
            self.context.Unmap(index_buffer, 0);
        }
        Ok(())
    }

    fn upload_projection(&mut self, draw_data: &DrawData) -> anyhow::Result<()> {
        let [left, top] = draw_data.display_pos;
        let right = left + draw_data.display_size[0];
        let bottom = top + draw_data.display_size[1];
        let projection = [
            [2.0 / (right - left), 0.0, 0.0, 0.0],
            [0.0, 2.0 / (top - bottom), 0.0, 0.0],
            [0.0, 0.0, 0.5, 0.0],
            [
                (right + left) / (left - right),
                (top + bottom) / (bottom - top),
                0.5,
                1.0,
            ],
        ];

        unsafe {
            let mut mapped = D3D11_MAPPED_SUBRESOURCE::default();
            self.context
                .Map(
                    &self.constant_buffer,
                    0,
                    D3D11_MAP_WRITE_DISCARD,
                    0,
                    Some(&mut mapped),
                )
                .context("map constant buffer")?;
            std::ptr::copy_nonoverlapping(
                projection.as_ptr() as *const u8,
                mapped.pData as *mut u8,
                size_of_val(&projection),
            );
            self.context.Unmap(&self.constant_buffer, 0);
        }
        Ok(())
    }

    unsafe fn setup_render_state(&self, draw_data: &DrawData) {
        unsafe {
            let viewport = D3D11_VIEWPORT {
                TopLeftX: 0.0,
                TopLeftY: 0.0,
                Width: draw_data.display_size[0],
                Height: draw_data.display_size[1],
                MinDepth: 0.0,
                MaxDepth: 1.0,
            };
            self.context.RSSetViewports(Some(&[viewport]));

            self.context.IASetInputLayout(&self.input_layout);
            let stride = size_of::<DrawVert>() as u32;
            let offset = 0u32;
            self.context.IASetVertexBuffers(
                0,
                1,
                Some(&self.vertex_buffer.clone()),
                Some(&stride),
                Some(&offset),
            );
            self.context.IASetIndexBuffer(
                self.index_buffer.as_ref(),
                DXGI_FORMAT_R16_UINT,
                0,
            );
            self.context
                .IASetPrimitiveTopology(D3D_PRIMITIVE_TOPOLOGY_TRIANGLELIST);

            self.context.VSSetShader(&self.vertex_shader, None);
            self.context
                .VSSetConstantBuffers(0, Some(&[Some(self.constant_buffer.clone())]));
            self.context.PSSetShader(&self.pixel_shader, None);
            self.context
                .PSSetSamplers(0, Some(&[Some(self.sampler.clone())]));

            let blend_factor = [0.0f32; 4];
            self.context
                .OMSetBlendState(&self.blend_state, Some(&blend_factor), 0xffff_ffff);
            self.context.RSSetState(&self.rasterizer_state);
        }
    }
}

fn create_dynamic_buffer(
    device: &ID3D11Device,
    byte_width: usize,
    bind_flags: u32,
) -> anyhow::Result<ID3D11Buffer> {
    let desc = D3D11_BUFFER_DESC {
        ByteWidth: byte_width as u32,
        Usage: D3D11_USAGE_DYNAMIC,
        BindFlags: bind_flags,
        CPUAccessFlags: D3D11_CPU_ACCESS_WRITE.0 as u32,
        MiscFlags: 0,
        StructureByteStride: 0,
    };
    let mut buffer = None;
    unsafe {
        device
            .CreateBuffer(&desc, None, Some(&mut buffer))
            .context("dynamic buffer")?;
    }
    buffer.ok_or_else(|| anyhow!("dynamic buffer is null"))
}

fn upload_font_atlas(
    device: &ID3D11Device,
    ctx: &mut imgui::Context,
) -> anyhow::Result<ID3D11ShaderResourceView> {
    let fonts = ctx.fonts();
    let atlas = fonts.build_rgba32_texture();

    let desc = D3D11_TEXTURE2D_DESC {
        Width: atlas.width,
        Height: atlas.height,
        MipLevels: 1,
        ArraySize: 1,
        Format: DXGI_FORMAT_R8G8B8A8_UNORM,
        SampleDesc: DXGI_SAMPLE_DESC {
            Count: 1,
            Quality: 0,
        },
        Usage: D3D11_USAGE_DEFAULT,
        BindFlags: D3D11_BIND_SHADER_RESOURCE.0 as u32,
        CPUAccessFlags: 0,
        MiscFlags: 0,
    };
    let init = D3D11_SUBRESOURCE_DATA {
        pSysMem: atlas.data.as_ptr() as *const _,
        SysMemPitch: atlas.width * 4,
        SysMemSlicePitch: 0,
    };

    let mut texture: Option<ID3D11Texture2D> = None;
    let mut view = None;
    unsafe {
        device
            .CreateTexture2D(&desc, Some(&init), Some(&mut texture))
            .context("font atlas texture")?;
        let texture = texture.ok_or_else(|| anyhow!("font atlas texture is null"))?;
        device
            .CreateShaderResourceView(&texture, None, Some(&mut view))
            .context("font atlas view")?;
    }

    fonts.tex_id = TextureId::new(FONT_TEXTURE_ID);
    view.ok_or_else(|| anyhow!("font atlas view is null"))
}

fn compile_shader(source: &str, entry_point: PCSTR, target: PCSTR) -> anyhow::Result<ID3DBlob> {
    let mut blob: Option<ID3DBlob> = None;
    let mut errors: Option<ID3DBlob> = None;

    let result = unsafe {
        D3DCompile(
            source.as_ptr() as *const _,
            source.len(),
            None,
            None,
            None,
            entry_point,
            target,
            D3DCOMPILE_ENABLE_STRICTNESS,
            0,
            &mut blob,
            Some(&mut errors),
        )
    };

    if result.is_err() {
        if let Some(errors) = errors {
            let message = unsafe {
                let bytes = std::slice::from_raw_parts(
                    errors.GetBufferPointer() as *const u8,
                    errors.GetBufferSize(),
                );
                String::from_utf8_lossy(bytes).into_owned()
            };
            bail!("shader compilation failed: {message}");
        }
        bail!("shader compilation failed");
    }

    blob.ok_or_else(|| anyhow!("shader blob is null"))
}

fn blob_bytes(blob: &ID3DBlob) -> &[u8] {
    unsafe { std::slice::from_raw_parts(blob.GetBufferPointer() as *const u8, blob.GetBufferSize()) }
}
