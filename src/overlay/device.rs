use log::{debug, info};
use windows::Win32::Foundation::HMODULE;
use windows::Win32::Graphics::Direct3D::{
    D3D_DRIVER_TYPE, D3D_DRIVER_TYPE_HARDWARE, D3D_DRIVER_TYPE_WARP, D3D_FEATURE_LEVEL,
    D3D_FEATURE_LEVEL_10_0, D3D_FEATURE_LEVEL_11_0,
};
use windows::Win32::Graphics::Direct3D11::{
    D3D11_CREATE_DEVICE_FLAG, D3D11_SDK_VERSION, D3D11CreateDeviceAndSwapChain, ID3D11Device,
    ID3D11DeviceContext, ID3D11RenderTargetView, ID3D11Texture2D,
};
use windows::Win32::Graphics::Dxgi::Common::{
    DXGI_FORMAT_R8G8B8A8_UNORM, DXGI_MODE_DESC, DXGI_RATIONAL, DXGI_SAMPLE_DESC,
};
use windows::Win32::Graphics::Dxgi::{
    DXGI_ERROR_UNSUPPORTED, DXGI_PRESENT, DXGI_SWAP_CHAIN_DESC, DXGI_SWAP_CHAIN_FLAG_ALLOW_MODE_SWITCH,
    DXGI_SWAP_EFFECT_DISCARD, DXGI_USAGE_RENDER_TARGET_OUTPUT, IDXGISwapChain,
};

use crate::overlay::fallback::{AdapterKind, DeviceError, create_with_fallback};
use crate::overlay::surface::Surface;

const FEATURE_LEVELS: [D3D_FEATURE_LEVEL; 2] = [D3D_FEATURE_LEVEL_11_0, D3D_FEATURE_LEVEL_10_0];

/// The GPU half of the surface: device, swap chain and the render target
/// view over the back buffer. Created after the [`Surface`], destroyed
/// before it.
pub struct PresentationTarget {
    device: ID3D11Device,
    context: ID3D11DeviceContext,
    swap_chain: IDXGISwapChain,
    render_target: ID3D11RenderTargetView,
    clear_color: [f32; 4],
}

impl PresentationTarget {
    /// Build the double-buffered swap chain and derive the render target
    /// view. Hardware rendering is attempted first; a rejection of the
    /// configuration as unsupported retries once on the WARP software
    /// rasteriser, any other failure is final.
    pub fn create(
        surface: &Surface,
        refresh_hz: f32,
        clear_color: [f32; 4],
    ) -> Result<Self, DeviceError> {
        let desc = DXGI_SWAP_CHAIN_DESC {
            BufferDesc: DXGI_MODE_DESC {
                // Zero width/height sizes the buffers to the window.
                Width: 0,
                Height: 0,
                RefreshRate: DXGI_RATIONAL {
                    Numerator: refresh_hz as u32,
                    Denominator: 1,
                },
                Format: DXGI_FORMAT_R8G8B8A8_UNORM,
                ..Default::default()
            },
            SampleDesc: DXGI_SAMPLE_DESC {
                Count: 1,
                Quality: 0,
            },
            BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
            BufferCount: 2,
            OutputWindow: surface.hwnd(),
            Windowed: true.into(),
            SwapEffect: DXGI_SWAP_EFFECT_DISCARD,
            Flags: DXGI_SWAP_CHAIN_FLAG_ALLOW_MODE_SWITCH.0 as u32,
        };

        let (device, context, swap_chain, level) =
            create_with_fallback(|kind| create_device_and_swap_chain(kind, &desc))?;
        info!("d3d11 device created at feature level {:#x}", level.0);

        // The view holds everything it needs; the buffer reference itself
        // is released as soon as the view exists.
        let back_buffer: ID3D11Texture2D = unsafe { swap_chain.GetBuffer(0) }
            .map_err(|e| DeviceError::Creation(format!("back buffer unavailable: {e}")))?;
        let mut render_target = None;
        unsafe { device.CreateRenderTargetView(&back_buffer, None, Some(&mut render_target)) }
            .map_err(|e| DeviceError::Creation(format!("render target view: {e}")))?;
        drop(back_buffer);

        let render_target = render_target
            .ok_or_else(|| DeviceError::Creation("render target view is null".into()))?;

        Ok(Self {
            device,
            context,
            swap_chain,
            render_target,
            clear_color,
        })
    }

    pub fn device(&self) -> &ID3D11Device {
        &self.device
    }

    pub fn context(&self) -> &ID3D11DeviceContext {
        &self.context
    }

    /// Bind the render target and wipe it to the transparent clear color.
    pub fn bind_and_clear(&self) {
        unsafe {
            self.context
                .OMSetRenderTargets(Some(&[Some(self.render_target.clone())]), None);
            self.context
                .ClearRenderTargetView(&self.render_target, &self.clear_color);
        }
    }

    /// Present the frame, paced to one vertical sync interval. The queried
    /// refresh rate only seeded the swap-chain descriptor; cadence comes
    /// from this wait.
    pub fn present(&self) -> anyhow::Result<()> {
        unsafe {
            self.swap_chain
                .Present(1, DXGI_PRESENT(0))
                .ok()
                .map_err(|e| anyhow::anyhow!("present failed: {e}"))
        }
    }
}

impl Drop for PresentationTarget {
    fn drop(&mut self) {
        // COM references release themselves; this is just the teardown
        // diagnostic the lifecycle log expects.
        debug!("releasing render target view, swap chain, context and device");
    }
}

fn create_device_and_swap_chain(
    kind: AdapterKind,
    desc: &DXGI_SWAP_CHAIN_DESC,
) -> Result<
    (
        ID3D11Device,
        ID3D11DeviceContext,
        IDXGISwapChain,
        D3D_FEATURE_LEVEL,
    ),
    DeviceError,
> {
    let driver: D3D_DRIVER_TYPE = match kind {
        AdapterKind::Hardware => D3D_DRIVER_TYPE_HARDWARE,
        AdapterKind::Software => D3D_DRIVER_TYPE_WARP,
    };

    let mut swap_chain: Option<IDXGISwapChain> = None;
    let mut device: Option<ID3D11Device> = None;
    let mut context: Option<ID3D11DeviceContext> = None;
    let mut level = D3D_FEATURE_LEVEL::default();

    let result = unsafe {
        D3D11CreateDeviceAndSwapChain(
            None,
            driver,
            HMODULE::default(),
            D3D11_CREATE_DEVICE_FLAG(0),
            Some(&FEATURE_LEVELS),
            D3D11_SDK_VERSION,
            Some(desc),
            Some(&mut swap_chain),
            Some(&mut device),
            Some(&mut level),
            Some(&mut context),
        )
    };

    match result {
        Ok(()) => match (device, context, swap_chain) {
            (Some(device), Some(context), Some(swap_chain)) => {
                Ok((device, context, swap_chain, level))
            }
            _ => Err(DeviceError::Creation(
                "device creation returned incomplete objects".into(),
            )),
        },
        Err(e) if e.code() == DXGI_ERROR_UNSUPPORTED => Err(DeviceError::Unsupported),
        Err(e) => Err(DeviceError::Creation(e.message())),
    }
}
