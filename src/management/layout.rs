use std::fmt;

/// Pipeline stage, also used as a path segment and log field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Artists,
    Albums,
    Songs,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Artists => "artists",
            Stage::Albums => "albums",
            Stage::Songs => "songs",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Object keys for one page of the listeners ranking.
///
/// ```text
/// raw-json-data/artists_page{n}_kworb/
/// ├── seed.json
/// ├── artists.json
/// ├── failures/{stage}.json
/// └── {spotify_id}_{artist_name}/
///     ├── albums.json
///     └── {album_id}/songs.json
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobLayout {
    prefix: String,
}

impl BlobLayout {
    pub const ROOT: &'static str = "raw-json-data";

    pub fn for_page(page_number: u32) -> Self {
        Self {
            prefix: format!("{}/artists_page{}_kworb", Self::ROOT, page_number),
        }
    }

    pub fn seed(&self) -> String {
        format!("{}/seed.json", self.prefix)
    }

    pub fn artists(&self) -> String {
        format!("{}/artists.json", self.prefix)
    }

    pub fn artist_dir(&self, spotify_id: &str, artist_name: &str) -> String {
        format!("{}/{}_{}", self.prefix, spotify_id, artist_name)
    }

    pub fn albums(&self, spotify_id: &str, artist_name: &str) -> String {
        format!("{}/albums.json", self.artist_dir(spotify_id, artist_name))
    }

    pub fn songs(&self, spotify_id: &str, artist_name: &str, album_id: &str) -> String {
        format!(
            "{}/{}/songs.json",
            self.artist_dir(spotify_id, artist_name),
            album_id
        )
    }

    pub fn failures(&self, stage: Stage) -> String {
        format!("{}/failures/{}.json", self.prefix, stage)
    }
}
