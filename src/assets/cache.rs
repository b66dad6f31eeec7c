// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Disk cache for remote assets, with SHA256-based filenames.

use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::PathBuf;

/// Cache of downloaded asset bodies
#[derive(Debug, Clone)]
pub struct DiskCache {
    cache_dir: PathBuf,
}

impl DiskCache {
    pub fn new(cache_dir: PathBuf) -> io::Result<Self> {
        fs::create_dir_all(&cache_dir)?;
        Ok(Self { cache_dir })
    }

    /// Cache under the platform cache directory
    pub fn in_user_cache() -> io::Result<Self> {
        let dir = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from(".cache"))
            .join("envatlas-desktop")
            .join("assets");
        Self::new(dir)
    }

    /// Get cache file path for a given URL
    fn cache_path(&self, url: &str) -> PathBuf {
        // Use SHA256 hash of URL as filename to avoid filesystem issues
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        self.cache_dir.join(format!("{:x}", hasher.finalize()))
    }

    /// Get cached bytes
    pub fn get(&self, url: &str) -> Option<Vec<u8>> {
        fs::read(self.cache_path(url)).ok()
    }

    pub fn put(&self, url: &str, bytes: &[u8]) -> io::Result<()> {
        fs::write(self.cache_path(url), bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_cache(name: &str) -> DiskCache {
        let dir = std::env::temp_dir().join(format!("envatlas-cache-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        DiskCache::new(dir).unwrap()
    }

    #[test]
    fn test_put_then_get() {
        let cache = temp_cache("put");
        let url = "https://data.example.org/Data/AspekLingkungan/DEM";
        assert!(cache.get(url).is_none());

        cache.put(url, b"tiff bytes").unwrap();
        assert_eq!(cache.get(url).as_deref(), Some(&b"tiff bytes"[..]));
        assert!(cache.get("https://data.example.org/other").is_none());
    }

    #[test]
    fn test_filename_is_sha256_hex() {
        let cache = temp_cache("name");
        let path = cache.cache_path("https://example.org/a");
        let name = path.file_name().and_then(|n| n.to_str()).unwrap();
        assert_eq!(name.len(), 64);
        assert!(name.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
