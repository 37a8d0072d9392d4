//! Delivery of exported files.
//!
//! Native builds offer a save dialog and write the file to the chosen path.
//! Browser builds hand the bytes to a temporary object URL and click a hidden
//! download link.

use crate::error::DeliveryError;
use crate::export::{DownloadSink, ExportArtifact};
use futures::future::BoxFuture;

/// Download sink for the platform the app is running on.
pub struct PlatformDownload;

impl DownloadSink for PlatformDownload {
    #[cfg(not(target_arch = "wasm32"))]
    fn deliver(&self, artifact: ExportArtifact) -> BoxFuture<'_, Result<(), DeliveryError>> {
        Box::pin(async move {
            let handle = rfd::AsyncFileDialog::new()
                .add_filter(artifact.kind.filter_name(), &[artifact.kind.extension()])
                .set_file_name(artifact.file_name.as_str())
                .save_file()
                .await
                .ok_or(DeliveryError::Cancelled)?;

            let path = handle.path();
            std::fs::write(path, &artifact.bytes).map_err(|e| DeliveryError::Write {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            log::info!("Saved {}", path.display());
            Ok(())
        })
    }

    #[cfg(target_arch = "wasm32")]
    fn deliver(&self, artifact: ExportArtifact) -> BoxFuture<'_, Result<(), DeliveryError>> {
        let result = trigger_download(&artifact).map_err(DeliveryError::Unavailable);
        Box::pin(futures::future::ready(result))
    }
}

/// Object URL that is revoked when dropped, whichever way the download goes.
#[cfg(target_arch = "wasm32")]
struct ObjectUrl(String);

#[cfg(target_arch = "wasm32")]
impl ObjectUrl {
    fn for_blob(blob: &web_sys::Blob) -> Result<Self, String> {
        web_sys::Url::create_object_url_with_blob(blob)
            .map(ObjectUrl)
            .map_err(|_| "Failed to create object URL".to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl Drop for ObjectUrl {
    fn drop(&mut self) {
        if web_sys::Url::revoke_object_url(&self.0).is_err() {
            log::warn!("Failed to revoke object URL");
        }
    }
}

/// Triggers a file download in the browser.
///
/// Creates a temporary anchor element pointing at a blob URL and clicks it.
#[cfg(target_arch = "wasm32")]
fn trigger_download(artifact: &ExportArtifact) -> Result<(), String> {
    use wasm_bindgen::JsCast;

    let window = web_sys::window().ok_or("No window found")?;
    let document = window.document().ok_or("No document found")?;
    let body = document.body().ok_or("No body found")?;

    let blob_parts = js_sys::Array::new();
    blob_parts.push(&js_sys::Uint8Array::from(artifact.bytes.as_slice()));

    let blob_options = web_sys::BlobPropertyBag::new();
    blob_options.set_type(artifact.kind.mime_type());

    let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&blob_parts, &blob_options)
        .map_err(|_| "Failed to create blob")?;

    let url = ObjectUrl::for_blob(&blob)?;

    let anchor = document
        .create_element("a")
        .map_err(|_| "Failed to create anchor element")?
        .dyn_into::<web_sys::HtmlAnchorElement>()
        .map_err(|_| "Failed to cast to anchor element")?;

    anchor.set_href(&url.0);
    anchor.set_download(&artifact.file_name);
    anchor.style().set_property("display", "none").ok();

    body.append_child(&anchor)
        .map_err(|_| "Failed to append anchor")?;
    anchor.click();
    body.remove_child(&anchor)
        .map_err(|_| "Failed to remove anchor")?;

    log::info!("Started download of {}", artifact.file_name);
    Ok(())
}
