use std::path::PathBuf;

use serde::Deserialize;

/// Media relay configuration, selected by the `backend` key.
#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum MediaConfig {
    Filesystem(FilesystemMediaConfig),
    Cloudinary(CloudinaryConfig),
    S3(S3MediaConfig),
}

impl Default for MediaConfig {
    fn default() -> Self {
        MediaConfig::Filesystem(FilesystemMediaConfig::default())
    }
}

impl MediaConfig {
    /// Directory to expose as static files, when assets live on local disk.
    pub fn served_root(&self) -> Option<&PathBuf> {
        match self {
            MediaConfig::Filesystem(cfg) => Some(&cfg.root),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct FilesystemMediaConfig {
    /// Directory assets are written to. Default: "./media".
    #[serde(default = "default_media_root")]
    pub root: PathBuf,
    /// URL prefix under which `root` is served. Default: "http://127.0.0.1:8000/media".
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

fn default_media_root() -> PathBuf {
    PathBuf::from("./media")
}
fn default_public_base_url() -> String {
    "http://127.0.0.1:8000/media".into()
}

impl Default for FilesystemMediaConfig {
    fn default() -> Self {
        Self {
            root: default_media_root(),
            public_base_url: default_public_base_url(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// Optional folder all uploads are placed in.
    #[serde(default)]
    pub folder: Option<String>,
    /// Override for the API base URL. Default: "https://api.cloudinary.com/v1_1".
    #[serde(default)]
    pub api_base_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct S3MediaConfig {
    pub bucket: String,
    pub region: String,
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    /// Public URL prefix objects are reachable under.
    pub public_base_url: String,
    /// Use path-style addressing (required by MinIO). Default: true.
    #[serde(default = "default_path_style")]
    pub path_style: bool,
}

fn default_path_style() -> bool {
    true
}
