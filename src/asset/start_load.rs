use log::debug;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;

use crate::error::ViewerError;
use crate::model::Model;

use super::loader::{decode_hdr, decode_rgba8, fetch};
use super::manager::{AssetLoadResult, AssetManager, AssetPayload, AssetSlot, AssetStatus};

fn decode(slot: AssetSlot, reference: &str, bytes: &[u8]) -> Result<AssetPayload, ViewerError> {
    Ok(match slot {
        AssetSlot::Mesh => AssetPayload::Mesh(Model::from_glb(reference, bytes)?),
        AssetSlot::Environment => AssetPayload::Environment(decode_hdr(bytes)?),
        AssetSlot::BaseColor | AssetSlot::Normal | AssetSlot::Roughness | AssetSlot::Metalness => {
            AssetPayload::Texture(decode_rgba8(bytes)?)
        }
    })
}

async fn load(slot: AssetSlot, reference: String) -> Result<AssetPayload, ViewerError> {
    let bytes = fetch(&reference).await?;
    tokio::task::spawn_blocking(move || decode(slot, &reference, &bytes)).await?
}

impl AssetManager {
    /// Fetches and decodes `slot` on `runtime`; the outcome arrives on `sender`.
    pub fn start_load(
        &mut self,
        slot: AssetSlot,
        runtime: &Handle,
        sender: UnboundedSender<AssetLoadResult>,
    ) {
        let Some(info) = self.get_mut(slot) else {
            return;
        };
        if info.is_loading() {
            return;
        }
        info.status = AssetStatus::Loading;
        let reference = info.reference.clone();

        runtime.spawn(async move {
            debug!("Loading {slot}: {reference}");
            let result = match load(slot, reference).await {
                Ok(payload) => AssetLoadResult::Success { slot, payload },
                Err(e) => AssetLoadResult::Error {
                    slot,
                    error: e.to_string(),
                },
            };
            let _ = sender.send(result);
        });
    }

    pub fn start_all(&mut self, runtime: &Handle, sender: &UnboundedSender<AssetLoadResult>) {
        for slot in AssetSlot::ALL {
            self.start_load(slot, runtime, sender.clone());
        }
    }

    /// Restarts every slot whose last attempt failed. Returns how many.
    pub fn retry_failed(
        &mut self,
        runtime: &Handle,
        sender: &UnboundedSender<AssetLoadResult>,
    ) -> usize {
        let failed: Vec<AssetSlot> = self
            .assets
            .iter()
            .filter(|a| a.has_error())
            .map(|a| a.slot)
            .collect();
        for &slot in &failed {
            self.start_load(slot, runtime, sender.clone());
        }
        failed.len()
    }
}
