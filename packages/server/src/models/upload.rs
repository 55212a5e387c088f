use serde::Serialize;

/// Where an uploaded file can be fetched from.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UploadResponse {
    #[serde(rename = "filePath")]
    #[schema(example = "/uploads/3f2b8c1d9e0a4b5c8d7e6f5a4b3c2d1e.pdf")]
    pub file_path: String,
}
