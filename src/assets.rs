use crate::constants::{MODEL_A_PATH, MODEL_B_PATH};
use crate::core::assets::{ModelId, ModelSource};
use crate::core::scene::SceneNode;
use crate::core::{glb, AssetError};
use crate::dom;

/// Fetches the bundled GLB files and converts them into scene fragments.
#[derive(Clone, Copy, Default)]
pub struct GltfModelSource;

impl GltfModelSource {
    pub fn path(id: ModelId) -> &'static str {
        match id {
            ModelId::A => MODEL_A_PATH,
            ModelId::B => MODEL_B_PATH,
        }
    }
}

impl ModelSource for GltfModelSource {
    async fn fetch(&self, id: ModelId) -> Result<SceneNode, AssetError> {
        let path = Self::path(id);
        let buf = dom::fetch_array_buffer(path).await?;
        let bytes = js_sys::Uint8Array::new(&buf).to_vec();
        log::debug!("[assets] {} ({} bytes)", path, bytes.len());
        glb::parse(path, &bytes)
    }
}
